//! In-memory split-tree controller.
//!
//! A complete [`SplitTree`] implementation with a flat pane list, used by
//! headless hosts and the test suite. Geometry is out of scope; only the
//! ordering, selection, and focus bookkeeping of a real layout controller is
//! modeled, including its callback quirks (selection-repair echoes after a
//! close, ghost-tab degradation when a drag-to-split empties its source
//! pane).

use super::{
    NewTabKind, PaneId, SplitDirection, SplitTree, TabContextAction, TabDisplay, TabId, TreeEvent,
};

struct MemoryTab {
    id: TabId,
    display: TabDisplay,
}

struct MemoryPane {
    id: PaneId,
    tabs: Vec<MemoryTab>,
    selected: Option<TabId>,
}

impl MemoryPane {
    fn position(&self, tab: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab)
    }

    /// Remove a tab, repairing selection. Returns the new selection if it
    /// changed to another live tab.
    fn remove_tab(&mut self, tab: TabId) -> Option<TabId> {
        let idx = self.position(tab)?;
        self.tabs.remove(idx);
        if self.selected == Some(tab) {
            self.selected = if self.tabs.is_empty() {
                None
            } else {
                // Prefer the tab at the same index (or previous if at end)
                let new_idx = idx.min(self.tabs.len().saturating_sub(1));
                Some(self.tabs[new_idx].id)
            };
            return self.selected;
        }
        None
    }
}

/// Flat-layout in-process split-tree controller.
pub struct MemorySplitTree {
    panes: Vec<MemoryPane>,
    focused: Option<PaneId>,
    next_tab: u64,
    next_pane: u64,
    events: Vec<TreeEvent>,
    mutations: usize,
}

impl MemorySplitTree {
    /// Create a tree with a single empty root pane, focused.
    pub fn new() -> Self {
        let root = PaneId::from_raw(1);
        Self {
            panes: vec![MemoryPane {
                id: root,
                tabs: Vec::new(),
                selected: None,
            }],
            focused: Some(root),
            next_tab: 1,
            next_pane: 2,
            events: Vec::new(),
            mutations: 0,
        }
    }

    /// Number of mutating commands issued so far. Lets tests assert that a
    /// converged reconcile pass issues no further commands.
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Display metadata last pushed for a tab.
    pub fn tab_display(&self, tab: TabId) -> Option<&TabDisplay> {
        self.panes
            .iter()
            .flat_map(|p| p.tabs.iter())
            .find(|t| t.id == tab)
            .map(|t| &t.display)
    }

    /// Inject an arbitrary event, as a real controller would after a delayed
    /// internal mutation (e.g. an unwanted focus change a turn after a
    /// split).
    pub fn push_event(&mut self, event: TreeEvent) {
        self.events.push(event);
    }

    // --- user-gesture simulators ---

    /// User clicks a tab.
    pub fn user_select_tab(&mut self, tab: TabId) {
        let Some(pane) = self.pane_of_tab(tab) else {
            return;
        };
        let changed = match self.pane_mut(pane) {
            Some(p) if p.selected != Some(tab) => {
                p.selected = Some(tab);
                true
            }
            _ => false,
        };
        if changed {
            self.events.push(TreeEvent::DidSelectTab { tab, pane });
        }
        if self.focused != Some(pane) {
            self.focused = Some(pane);
            self.events.push(TreeEvent::DidFocusPane { pane });
        }
    }

    /// User clicks into a pane.
    pub fn user_focus_pane(&mut self, pane: PaneId) {
        if self.pane_mut(pane).is_some() && self.focused != Some(pane) {
            self.focused = Some(pane);
            self.events.push(TreeEvent::DidFocusPane { pane });
        }
    }

    /// User hits the close affordance on a tab.
    pub fn user_close_tab(&mut self, tab: TabId) {
        if let Some(pane) = self.pane_of_tab(tab) {
            self.events.push(TreeEvent::ShouldCloseTab { tab, pane });
        }
    }

    /// User closes a whole pane.
    pub fn user_close_pane(&mut self, pane: PaneId) {
        if self.pane_mut(pane).is_some() {
            self.events.push(TreeEvent::ShouldClosePane { pane });
        }
    }

    /// User drags a tab into another pane.
    pub fn user_move_tab(&mut self, tab: TabId, dest: PaneId, index: Option<usize>) {
        self.move_tab(tab, dest, index);
    }

    /// User drags a tab to a pane edge, splitting it. If the drag empties
    /// the source pane, the controller degrades it to a single unmapped
    /// ghost tab instead of collapsing it.
    pub fn user_split_drag(&mut self, tab: TabId, direction: SplitDirection) -> Option<PaneId> {
        let source = self.pane_of_tab(tab)?;
        let created = self.mint_pane_after(source, false);

        let entry = {
            let src = self.pane_mut(source)?;
            let idx = src.position(tab)?;
            let entry = src.tabs.remove(idx);
            if src.selected == Some(tab) {
                src.selected = src.tabs.first().map(|t| t.id);
            }
            entry
        };

        // Seed the new pane with the dragged tab
        let dst = self.pane_mut(created).expect("created pane exists");
        dst.tabs.push(entry);
        dst.selected = Some(tab);

        // Ghost degradation of the emptied source pane
        let needs_ghost = self.pane_ref(source).is_some_and(|p| p.tabs.is_empty());
        if needs_ghost {
            let ghost = self.mint_tab();
            let src = self.pane_mut(source).expect("source pane exists");
            src.tabs.push(MemoryTab {
                id: ghost,
                display: TabDisplay::default(),
            });
            src.selected = Some(ghost);
        }

        self.events.push(TreeEvent::DidSplitPane {
            original: source,
            created,
            direction,
        });
        Some(created)
    }

    /// User hits the new-tab affordance of a pane.
    pub fn user_request_new_tab(&mut self, kind: NewTabKind, pane: PaneId) {
        self.events.push(TreeEvent::DidRequestNewTab { kind, pane });
    }

    /// User invokes a context-menu action on a tab.
    pub fn user_context_action(&mut self, action: TabContextAction, tab: TabId) {
        if let Some(pane) = self.pane_of_tab(tab) {
            self.events
                .push(TreeEvent::DidRequestTabContextAction { action, tab, pane });
        }
    }

    // --- internals ---

    fn pane_mut(&mut self, pane: PaneId) -> Option<&mut MemoryPane> {
        self.panes.iter_mut().find(|p| p.id == pane)
    }

    fn pane_ref(&self, pane: PaneId) -> Option<&MemoryPane> {
        self.panes.iter().find(|p| p.id == pane)
    }

    fn mint_tab(&mut self) -> TabId {
        let id = self.next_tab;
        self.next_tab += 1;
        TabId::from_raw(id)
    }

    fn mint_pane_after(&mut self, original: PaneId, insert_first: bool) -> PaneId {
        let id = PaneId::from_raw(self.next_pane);
        self.next_pane += 1;
        let pos = self
            .panes
            .iter()
            .position(|p| p.id == original)
            .map(|i| if insert_first { i } else { i + 1 })
            .unwrap_or(self.panes.len());
        self.panes.insert(
            pos,
            MemoryPane {
                id,
                tabs: Vec::new(),
                selected: None,
            },
        );
        id
    }
}

impl Default for MemorySplitTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitTree for MemorySplitTree {
    fn panes(&self) -> Vec<PaneId> {
        self.panes.iter().map(|p| p.id).collect()
    }

    fn tabs_in_pane(&self, pane: PaneId) -> Vec<TabId> {
        self.pane_ref(pane)
            .map(|p| p.tabs.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    fn pane_of_tab(&self, tab: TabId) -> Option<PaneId> {
        self.panes
            .iter()
            .find(|p| p.position(tab).is_some())
            .map(|p| p.id)
    }

    fn selected_tab(&self, pane: PaneId) -> Option<TabId> {
        self.pane_ref(pane).and_then(|p| p.selected)
    }

    fn focused_pane(&self) -> Option<PaneId> {
        self.focused
    }

    fn create_tab(
        &mut self,
        pane: PaneId,
        display: TabDisplay,
        index: Option<usize>,
    ) -> Option<TabId> {
        self.mutations += 1;
        if self.pane_ref(pane).is_none() {
            return None;
        }
        let id = self.mint_tab();
        let p = self.pane_mut(pane).expect("pane exists");
        let idx = index.unwrap_or(p.tabs.len()).min(p.tabs.len());
        p.tabs.insert(idx, MemoryTab { id, display });
        if p.selected.is_none() {
            p.selected = Some(id);
        }
        Some(id)
    }

    fn request_close_tab(&mut self, tab: TabId) -> bool {
        let Some(pane) = self.pane_of_tab(tab) else {
            return false;
        };
        self.events.push(TreeEvent::ShouldCloseTab { tab, pane });
        true
    }

    fn confirm_close_tab(&mut self, tab: TabId) -> bool {
        self.mutations += 1;
        let Some(pane) = self.pane_of_tab(tab) else {
            return false;
        };
        let reselected = self.pane_mut(pane).and_then(|p| p.remove_tab(tab));
        self.events.push(TreeEvent::DidCloseTab { tab, pane });
        // Selection-repair echo, as real controllers emit after a close
        if let Some(next) = reselected {
            self.events.push(TreeEvent::DidSelectTab { tab: next, pane });
        }
        true
    }

    fn select_tab(&mut self, tab: TabId) -> bool {
        self.mutations += 1;
        let Some(pane) = self.pane_of_tab(tab) else {
            return false;
        };
        let changed = match self.pane_mut(pane) {
            Some(p) if p.selected != Some(tab) => {
                p.selected = Some(tab);
                true
            }
            _ => false,
        };
        if changed {
            self.events.push(TreeEvent::DidSelectTab { tab, pane });
        }
        true
    }

    fn focus_pane(&mut self, pane: PaneId) -> bool {
        self.mutations += 1;
        if self.pane_ref(pane).is_none() {
            return false;
        }
        if self.focused != Some(pane) {
            self.focused = Some(pane);
            self.events.push(TreeEvent::DidFocusPane { pane });
        }
        true
    }

    fn reorder_tab(&mut self, tab: TabId, index: usize) -> bool {
        self.mutations += 1;
        let Some(pane) = self.pane_of_tab(tab) else {
            return false;
        };
        let p = self.pane_mut(pane).expect("pane exists");
        let Some(current) = p.position(tab) else {
            return false;
        };
        let clamped = index.min(p.tabs.len().saturating_sub(1));
        if clamped != current {
            let entry = p.tabs.remove(current);
            p.tabs.insert(clamped, entry);
        }
        true
    }

    fn move_tab(&mut self, tab: TabId, dest: PaneId, index: Option<usize>) -> bool {
        self.mutations += 1;
        let Some(from) = self.pane_of_tab(tab) else {
            return false;
        };
        if self.pane_ref(dest).is_none() || from == dest {
            return false;
        }

        let (entry, reselected) = {
            let src = self.pane_mut(from).expect("source pane exists");
            let idx = src.position(tab).expect("tab position");
            let entry = src.tabs.remove(idx);
            let mut reselected = None;
            if src.selected == Some(tab) {
                src.selected = src.tabs.first().map(|t| t.id);
                reselected = src.selected;
            }
            (entry, reselected)
        };

        let dst = self.pane_mut(dest).expect("dest pane exists");
        let idx = index.unwrap_or(dst.tabs.len()).min(dst.tabs.len());
        dst.tabs.insert(idx, entry);
        dst.selected = Some(tab);

        self.events.push(TreeEvent::DidMoveTab {
            tab,
            from_pane: from,
            to_pane: dest,
        });
        if let Some(next) = reselected {
            self.events
                .push(TreeEvent::DidSelectTab { tab: next, pane: from });
        }
        self.events.push(TreeEvent::DidSelectTab { tab, pane: dest });
        true
    }

    fn split_pane(
        &mut self,
        pane: PaneId,
        direction: SplitDirection,
        with_tab: Option<TabId>,
        insert_first: bool,
    ) -> Option<PaneId> {
        self.mutations += 1;
        if self.pane_ref(pane).is_none() {
            return None;
        }
        if let Some(tab) = with_tab
            && self.pane_of_tab(tab).is_none()
        {
            return None;
        }

        let created = self.mint_pane_after(pane, insert_first);
        if let Some(tab) = with_tab {
            let source = self.pane_of_tab(tab).expect("checked above");
            let entry = {
                let src = self.pane_mut(source).expect("source pane exists");
                let idx = src.position(tab).expect("tab position");
                let entry = src.tabs.remove(idx);
                if src.selected == Some(tab) {
                    src.selected = src.tabs.first().map(|t| t.id);
                }
                entry
            };
            let dst = self.pane_mut(created).expect("created pane exists");
            dst.tabs.push(entry);
            dst.selected = Some(tab);
        }

        self.events.push(TreeEvent::DidSplitPane {
            original: pane,
            created,
            direction,
        });
        Some(created)
    }

    fn update_tab(&mut self, tab: TabId, display: TabDisplay) -> bool {
        let Some(pane) = self.pane_of_tab(tab) else {
            return false;
        };
        let p = self.pane_mut(pane).expect("pane exists");
        let idx = p.position(tab).expect("tab position");
        p.tabs[idx].display = display;
        true
    }

    fn request_close_pane(&mut self, pane: PaneId) -> bool {
        if self.pane_ref(pane).is_none() {
            return false;
        }
        self.events.push(TreeEvent::ShouldClosePane { pane });
        true
    }

    fn confirm_close_pane(&mut self, pane: PaneId) -> bool {
        self.mutations += 1;
        let Some(idx) = self.panes.iter().position(|p| p.id == pane) else {
            return false;
        };
        self.panes.remove(idx);
        self.events.push(TreeEvent::DidClosePane { pane });
        if self.focused == Some(pane) {
            self.focused = self.panes.first().map(|p| p.id);
            if let Some(next) = self.focused {
                self.events.push(TreeEvent::DidFocusPane { pane: next });
            }
        }
        true
    }

    fn take_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_tabs(count: usize) -> (MemorySplitTree, PaneId, Vec<TabId>) {
        let mut tree = MemorySplitTree::new();
        let pane = tree.panes()[0];
        let tabs = (0..count)
            .map(|_| {
                tree.create_tab(pane, TabDisplay::default(), None)
                    .expect("create tab")
            })
            .collect();
        tree.take_events();
        (tree, pane, tabs)
    }

    #[test]
    fn close_repairs_selection_to_neighbor() {
        let (mut tree, pane, tabs) = tree_with_tabs(3);
        tree.user_select_tab(tabs[1]);
        tree.take_events();

        tree.confirm_close_tab(tabs[1]);
        // Selection falls to the tab now occupying the same index
        assert_eq!(tree.selected_tab(pane), Some(tabs[2]));
        let events = tree.take_events();
        assert!(events.contains(&TreeEvent::DidCloseTab {
            tab: tabs[1],
            pane
        }));
        assert!(events.contains(&TreeEvent::DidSelectTab {
            tab: tabs[2],
            pane
        }));
    }

    #[test]
    fn create_tab_clamps_index() {
        let (mut tree, pane, tabs) = tree_with_tabs(2);
        let id = tree
            .create_tab(pane, TabDisplay::default(), Some(99))
            .expect("create");
        assert_eq!(tree.tabs_in_pane(pane), vec![tabs[0], tabs[1], id]);
    }

    #[test]
    fn split_with_tab_moves_it() {
        let (mut tree, pane, tabs) = tree_with_tabs(2);
        let created = tree
            .split_pane(pane, SplitDirection::Vertical, Some(tabs[0]), false)
            .expect("split");
        assert_eq!(tree.tabs_in_pane(pane), vec![tabs[1]]);
        assert_eq!(tree.tabs_in_pane(created), vec![tabs[0]]);
        assert_eq!(tree.selected_tab(created), Some(tabs[0]));
    }

    #[test]
    fn drag_split_of_last_tab_leaves_ghost() {
        let (mut tree, pane, tabs) = tree_with_tabs(1);
        let created = tree
            .user_split_drag(tabs[0], SplitDirection::Horizontal)
            .expect("split");
        let ghosts = tree.tabs_in_pane(pane);
        assert_eq!(ghosts.len(), 1);
        assert_ne!(ghosts[0], tabs[0]);
        assert_eq!(tree.tabs_in_pane(created), vec![tabs[0]]);
    }

    #[test]
    fn move_tab_selects_in_destination() {
        let (mut tree, pane, tabs) = tree_with_tabs(2);
        let other = tree
            .split_pane(pane, SplitDirection::Vertical, None, false)
            .expect("split");
        tree.take_events();

        assert!(tree.move_tab(tabs[0], other, None));
        assert_eq!(tree.selected_tab(other), Some(tabs[0]));
        assert_eq!(tree.pane_of_tab(tabs[0]), Some(other));
    }

    #[test]
    fn pane_close_emits_no_per_tab_events() {
        let (mut tree, pane, _tabs) = tree_with_tabs(3);
        let other = tree
            .split_pane(pane, SplitDirection::Vertical, None, false)
            .expect("split");
        tree.create_tab(other, TabDisplay::default(), None);
        tree.take_events();

        tree.confirm_close_pane(pane);
        let events = tree.take_events();
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, TreeEvent::DidCloseTab { .. }))
        );
        assert!(events.contains(&TreeEvent::DidClosePane { pane }));
    }
}
