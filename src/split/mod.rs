//! Boundary types and trait for the external split-tree controller.
//!
//! The layout tree is owned and mutated by an external controller; this
//! module defines the command surface the core issues against it, the
//! callback events it emits back, and the opaque identifiers it mints. The
//! core never constructs tab/pane identifiers itself, only compares and
//! stores ones handed to it.

mod memory;

pub use memory::MemorySplitTree;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a tab, minted and owned by the split-tree controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(u64);

impl TabId {
    /// Wrap a raw controller-minted value. Only controller implementations
    /// should call this.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Identifier for a pane (leaf container of tabs), minted and owned by the
/// split-tree controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaneId(u64);

impl PaneId {
    /// Wrap a raw controller-minted value. Only controller implementations
    /// should call this.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane#{}", self.0)
    }
}

/// Direction of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitDirection {
    /// Panes are stacked vertically (split creates top/bottom panes).
    Horizontal,
    /// Panes are side by side (split creates left/right panes).
    Vertical,
}

/// Display metadata pushed to the controller for a tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabDisplay {
    /// Title string shown on the tab.
    pub title: String,
    /// Icon identifier, if any.
    pub icon: Option<String>,
    /// Whether the unread indicator is shown.
    pub indicator: bool,
    /// Whether a loading spinner is shown.
    pub loading: bool,
}

/// Kind of surface requested through the controller's new-tab affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewTabKind {
    Terminal,
    Browser,
}

/// Context-menu action on a tab, forwarded by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum TabContextAction {
    /// Set (or clear, with `None`) the user-assigned title.
    Rename(Option<String>),
    Pin,
    Unpin,
    Close,
    CloseOthers,
    CloseToTheRight,
    /// Move the tab into another pane.
    MoveToPane {
        dest: PaneId,
        index: Option<usize>,
    },
}

/// Callback emitted by the split-tree controller.
///
/// Callbacks are drained as values rather than delivered as reentrant calls;
/// the core dispatches them in a bounded queue-and-drain loop so a burst of
/// nested mutations settles without unbounded recursion.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    /// The controller asks whether a tab may close (two-phase protocol).
    ShouldCloseTab { tab: TabId, pane: PaneId },
    /// A tab close was committed.
    DidCloseTab { tab: TabId, pane: PaneId },
    /// A tab became selected within its pane.
    DidSelectTab { tab: TabId, pane: PaneId },
    /// A pane became the focused pane.
    DidFocusPane { pane: PaneId },
    /// A tab moved between panes.
    DidMoveTab {
        tab: TabId,
        from_pane: PaneId,
        to_pane: PaneId,
    },
    /// A pane was split, creating a new pane.
    DidSplitPane {
        original: PaneId,
        created: PaneId,
        direction: SplitDirection,
    },
    /// The controller asks whether a whole pane may close.
    ShouldClosePane { pane: PaneId },
    /// A pane close was committed. No per-tab detail follows; the core must
    /// have snapshotted the pane's contents at approval time.
    DidClosePane { pane: PaneId },
    /// The user asked for a new tab in a pane.
    DidRequestNewTab { kind: NewTabKind, pane: PaneId },
    /// The user invoked a tab context-menu action.
    DidRequestTabContextAction {
        action: TabContextAction,
        tab: TabId,
        pane: PaneId,
    },
    /// Pane geometry changed (resize, divider drag).
    DidChangeGeometry,
}

/// Command and query surface of the external split-tree controller.
///
/// Accessors report ground truth and must not be cached beyond one
/// synchronous pass. Commands may enqueue [`TreeEvent`]s; callers are
/// expected to drain them via [`SplitTree::take_events`] promptly.
pub trait SplitTree {
    // --- ground-truth accessors ---

    /// All pane ids currently in the layout, in layout order.
    fn panes(&self) -> Vec<PaneId>;

    /// Ordered tab ids within a pane. Empty for unknown panes.
    fn tabs_in_pane(&self, pane: PaneId) -> Vec<TabId>;

    /// The pane containing a tab, if the tab is live.
    fn pane_of_tab(&self, tab: TabId) -> Option<PaneId>;

    /// The selected tab of a pane, if any.
    fn selected_tab(&self, pane: PaneId) -> Option<TabId>;

    /// The pane the controller currently calls focused.
    fn focused_pane(&self) -> Option<PaneId>;

    // --- commands ---

    /// Create a tab in a pane at an optional index (clamped). Returns the
    /// minted tab id, or `None` if the controller refuses.
    fn create_tab(&mut self, pane: PaneId, display: TabDisplay, index: Option<usize>)
    -> Option<TabId>;

    /// Begin the two-phase close of a tab: the controller will emit
    /// [`TreeEvent::ShouldCloseTab`] for the core's policy to answer.
    fn request_close_tab(&mut self, tab: TabId) -> bool;

    /// Commit a tab close after policy approval.
    fn confirm_close_tab(&mut self, tab: TabId) -> bool;

    /// Select a tab within its pane.
    fn select_tab(&mut self, tab: TabId) -> bool;

    /// Focus a pane.
    fn focus_pane(&mut self, pane: PaneId) -> bool;

    /// Reorder a tab within its pane to the given index (clamped).
    fn reorder_tab(&mut self, tab: TabId, index: usize) -> bool;

    /// Move a tab to another pane at an optional index (clamped).
    fn move_tab(&mut self, tab: TabId, dest: PaneId, index: Option<usize>) -> bool;

    /// Split a pane, optionally seeding the new pane with an existing tab.
    /// Returns the new pane id, or `None` if the controller refuses.
    fn split_pane(
        &mut self,
        pane: PaneId,
        direction: SplitDirection,
        with_tab: Option<TabId>,
        insert_first: bool,
    ) -> Option<PaneId>;

    /// Push updated display metadata for a tab.
    fn update_tab(&mut self, tab: TabId, display: TabDisplay) -> bool;

    /// Begin the two-phase close of a whole pane.
    fn request_close_pane(&mut self, pane: PaneId) -> bool;

    /// Commit a pane close after policy approval.
    fn confirm_close_pane(&mut self, pane: PaneId) -> bool;

    // --- event queue ---

    /// Take all callbacks queued since the last drain.
    fn take_events(&mut self) -> Vec<TreeEvent>;
}
