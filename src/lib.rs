//! Workspace surface management for a split terminal/browser multiplexer.
//!
//! A workspace owns a collection of panels (terminal and browser sessions)
//! arranged by an external split-tree controller into panes and tabs. This
//! crate is the coordination core between the two: it keeps a strict
//! tab↔panel bijection, derives input focus from the controller's ground
//! truth, runs the two-phase close/confirmation protocol, transfers panel
//! ownership across workspaces on detach, maintains pinned-tab ordering and
//! unread badges, and resolves font-size inheritance for new terminals.
//!
//! The crate is engine-agnostic: content engines implement [`PanelContent`],
//! layout controllers implement [`SplitTree`]. [`MemorySplitTree`] and the
//! headless engines in [`panel`] back the test suite and headless hosts.

pub mod error;
pub mod panel;
pub mod split;
pub mod workspace;

pub use error::WorkspaceError;
pub use panel::{
    Panel, PanelContent, PanelFactory, PanelId, PanelKind, PanelMeta, PanelRegistry,
    TerminalSpawn,
};
pub use split::{
    MemorySplitTree, NewTabKind, PaneId, SplitDirection, SplitTree, TabContextAction, TabDisplay,
    TabId, TreeEvent,
};
pub use workspace::{
    AttachRejected, CloseConfirmRequest, DetachedPanel, FocusChange, FocusTrigger, InputKind,
    PaneSnapshot,
    SurfaceSnapshot, Workspace, WorkspaceId, WorkspaceSnapshot,
};

/// Crate version, for host about-dialogs and socket handshakes.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
