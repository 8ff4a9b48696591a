//! Serializable snapshot of a workspace's surface arrangement.
//!
//! Captures layout shape and per-surface metadata for session persistence
//! and socket-driven inspection. Live engine internals (PTY buffers, page
//! state) are out of scope; a restore respawns engines from this metadata.

use super::{Workspace, WorkspaceId};
use crate::panel::{PanelId, PanelKind};
use crate::split::SplitTree;
use serde::{Deserialize, Serialize};

/// One surface within a pane snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub panel: PanelId,
    pub kind: PanelKind,
    pub title: String,
    pub custom_title: Option<String>,
    pub directory: Option<String>,
    pub url: Option<String>,
    pub pinned: bool,
    pub manual_unread: bool,
    pub selected: bool,
}

/// One pane's ordered surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub pane: u64,
    pub focused: bool,
    pub surfaces: Vec<SurfaceSnapshot>,
}

/// A full workspace snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub workspace: WorkspaceId,
    pub panes: Vec<PaneSnapshot>,
}

impl<T: SplitTree> Workspace<T> {
    /// Capture the current arrangement.
    pub fn capture_snapshot(&self) -> WorkspaceSnapshot {
        let focused_pane = self.tree.focused_pane();
        let panes = self
            .tree
            .panes()
            .into_iter()
            .map(|pane| {
                let selected = self.tree.selected_tab(pane);
                let surfaces = self
                    .tree
                    .tabs_in_pane(pane)
                    .into_iter()
                    .filter_map(|tab| {
                        let panel = self.mapping.panel_of(tab)?;
                        let entry = self.registry.get(panel)?;
                        Some(SurfaceSnapshot {
                            panel,
                            kind: entry.panel.kind(),
                            title: entry.resolved_title(),
                            custom_title: entry.meta.custom_title.clone(),
                            directory: entry.meta.directory.clone(),
                            url: entry.panel.content.current_url(),
                            pinned: entry.meta.pinned,
                            manual_unread: self.unread.is_marked(panel),
                            selected: selected == Some(tab),
                        })
                    })
                    .collect();
                PaneSnapshot {
                    pane: pane.raw(),
                    focused: focused_pane == Some(pane),
                    surfaces,
                }
            })
            .collect();

        WorkspaceSnapshot {
            workspace: self.id,
            panes,
        }
    }
}
