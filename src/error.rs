//! Typed errors surfaced to upward callers.
//!
//! Mapping misses inside event handlers are absorbed locally (best-effort
//! fallback or no-op) and never reach this enum; these variants exist for
//! the explicit upward operations (close, move, detach, attach) where the
//! immediate caller owns user-visible reporting.

use crate::panel::PanelId;
use crate::split::{PaneId, TabId};
use thiserror::Error;

/// Failure modes of upward workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No live panel with this id exists in the registry.
    #[error("unknown panel {0}")]
    UnknownPanel(PanelId),

    /// No mapping exists for this external tab id.
    #[error("unknown tab {0}")]
    UnknownTab(TabId),

    /// The destination pane is not part of the current layout tree.
    #[error("unknown pane {0}")]
    UnknownPane(PaneId),

    /// An attach was attempted for a panel id that already lives in this
    /// workspace's registry.
    #[error("panel {0} is already attached to this workspace")]
    DuplicatePanel(PanelId),

    /// The split-tree controller refused a command. Any speculatively
    /// created registry/mapping state has been rolled back.
    #[error("split-tree controller rejected {0}")]
    OperationRejected(&'static str),
}
