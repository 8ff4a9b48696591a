//! Controller callback dispatch.
//!
//! Commands issued against the split tree enqueue [`TreeEvent`]s rather than
//! calling back synchronously. `pump_events` drains the queue in rounds —
//! handling one event may issue commands that enqueue more — until it is
//! empty or the round cap trips.

use super::Workspace;
use crate::split::{
    NewTabKind, PaneId, SplitTree, TabContextAction, TabId, TreeEvent,
};

impl<T: SplitTree> Workspace<T> {
    /// Drain and dispatch all pending controller callbacks.
    ///
    /// Safe to call redundantly; nested calls from within a dispatch are
    /// no-ops because the outer pump will pick up whatever they would have.
    pub fn pump_events(&mut self) {
        if self.pumping {
            return;
        }
        self.pumping = true;

        let cap = self.config.selection_drain_cap as usize;
        let mut rounds = 0usize;
        loop {
            let events = self.tree.take_events();
            if events.is_empty() {
                break;
            }
            rounds += 1;
            if rounds > cap {
                log::warn!(
                    "event pump exceeded {cap} rounds; dropping {} events",
                    events.len()
                );
                break;
            }
            for event in events {
                self.handle_tree_event(event);
            }
        }

        self.pumping = false;
    }

    fn handle_tree_event(&mut self, event: TreeEvent) {
        log::trace!("workspace {}: {event:?}", self.id);
        match event {
            TreeEvent::ShouldCloseTab { tab, pane } => {
                if self.should_close_tab(tab, pane) {
                    self.tree.confirm_close_tab(tab);
                }
            }
            TreeEvent::DidCloseTab { tab, pane } => self.did_close_tab(tab, pane),
            TreeEvent::DidSelectTab { tab, pane } => {
                // Echoes can be stale by the time the queue drains; converge
                // on ground truth, not the event payload.
                if self.tree.selected_tab(pane) == Some(tab) {
                    self.apply_selection(tab, pane, super::FocusTrigger::Standard);
                }
            }
            TreeEvent::DidFocusPane { pane } => {
                if self.tree.focused_pane() == Some(pane) {
                    match self.tree.selected_tab(pane) {
                        Some(tab) => {
                            self.apply_selection(tab, pane, super::FocusTrigger::Standard);
                        }
                        None => self.schedule_reconcile(),
                    }
                }
            }
            TreeEvent::DidMoveTab {
                tab,
                from_pane,
                to_pane,
            } => self.did_move_tab(tab, from_pane, to_pane),
            TreeEvent::DidSplitPane {
                original, created, ..
            } => self.did_split_pane(original, created),
            TreeEvent::ShouldClosePane { pane } => {
                if self.should_close_pane(pane) {
                    self.tree.confirm_close_pane(pane);
                }
            }
            TreeEvent::DidClosePane { pane } => self.did_close_pane(pane),
            TreeEvent::DidRequestNewTab { kind, pane } => match kind {
                NewTabKind::Terminal => {
                    self.spawn_terminal_in_pane(pane, None, true);
                }
                NewTabKind::Browser => {
                    self.spawn_browser_in_pane(pane, None, true);
                }
            },
            TreeEvent::DidRequestTabContextAction { action, tab, pane } => {
                self.handle_context_action(action, tab, pane);
            }
            TreeEvent::DidChangeGeometry => self.schedule_reconcile(),
        }
    }

    /// A tab close committed: tear down (or hand off) the panel and repair
    /// selection.
    fn did_close_tab(&mut self, tab: TabId, pane: PaneId) {
        self.clear_tab_close_state(tab);
        let selection_hint = self.take_post_close_selection(tab);
        let detaching = self.is_detaching(tab);

        if let Some(panel_id) = self.mapping.remove_tab(tab) {
            if detaching {
                self.package_detached(tab, panel_id);
            } else if let Some(mut entry) = self.registry.remove(panel_id) {
                self.unread.take_mark(panel_id);
                entry.panel.content.close();
                log::info!("panel {panel_id} closed with {tab}");
            }
            if self.focus.last_focused == Some(panel_id) {
                self.focus.last_focused = None;
            }
        }

        match selection_hint.filter(|hint| self.tree.pane_of_tab(*hint).is_some()) {
            Some(hint) => self.apply_selection(hint, pane, super::FocusTrigger::Standard),
            None => self.schedule_reconcile(),
        }

        self.ensure_not_empty(pane);
    }

    /// A pane close committed. No per-tab events followed, so tear down the
    /// panels snapshotted at approval time.
    fn did_close_pane(&mut self, pane: PaneId) {
        let panels = self.take_pane_close_snapshot(pane);
        for panel_id in panels {
            if let Some(tab) = self.mapping.tab_of(panel_id) {
                self.mapping.remove_tab(tab);
            }
            if let Some(mut entry) = self.registry.remove(panel_id) {
                self.unread.take_mark(panel_id);
                entry.panel.content.close();
            }
            if self.focus.last_focused == Some(panel_id) {
                self.focus.last_focused = None;
            }
        }
        log::info!("{pane} closed");
        self.schedule_reconcile();
        let preferred = self.tree.focused_pane();
        if let Some(pane) = preferred.or_else(|| self.tree.panes().first().copied()) {
            self.ensure_not_empty(pane);
        }
    }

    /// Never-empty replacement: if the workspace has no panels left, spawn
    /// a fresh terminal. Suppressed mid-detach, when emptiness is a
    /// legitimate transient.
    pub(crate) fn ensure_not_empty(&mut self, preferred: PaneId) {
        if !self.registry.is_empty() || self.close.active_detach > 0 {
            return;
        }
        let pane = if self.tree.panes().contains(&preferred) {
            Some(preferred)
        } else {
            self.tree.panes().first().copied()
        };
        let Some(pane) = pane else {
            log::warn!("workspace {} is empty and the layout has no panes", self.id);
            return;
        };
        log::info!("workspace {}: spawning replacement terminal in {pane}", self.id);
        self.spawn_terminal_in_pane(pane, None, true);
    }

    fn did_move_tab(&mut self, tab: TabId, from_pane: PaneId, to_pane: PaneId) {
        self.normalize_pinned(to_pane);
        if self.tree.panes().contains(&from_pane) {
            self.normalize_pinned(from_pane);
        }
        // A moved tab lands selected in its destination; re-apply so panel
        // focus follows it.
        if self.tree.selected_tab(to_pane) == Some(tab) {
            self.apply_selection(tab, to_pane, super::FocusTrigger::Standard);
        }
    }

    /// A pane was split. Three cases: a split the core itself requested
    /// (the creation path fills it), a drag-split that moved a tab into the
    /// new pane, and an empty split from the controller's own affordance.
    fn did_split_pane(&mut self, original: PaneId, created: PaneId) {
        if self.suppress_split_autofill {
            self.suppress_split_autofill = false;
            return;
        }

        let created_tabs = self.tree.tabs_in_pane(created);
        if created_tabs.is_empty() {
            self.autofill_split_pane(original, created);
            return;
        }

        // Drag-split: a tab left `original` for `created`. The controller
        // may have backfilled the drained source with placeholder tabs that
        // map to no panel; give the first one a real terminal.
        let source_tabs = self.tree.tabs_in_pane(original);
        let source_all_ghosts = !source_tabs.is_empty()
            && source_tabs
                .iter()
                .all(|t| self.mapping.panel_of(*t).is_none());
        if source_all_ghosts {
            self.repair_ghost_pane(original);
        }

        self.normalize_pinned(original);
        self.normalize_pinned(created);
        if let Some(tab) = self.tree.selected_tab(created) {
            self.apply_selection(tab, created, super::FocusTrigger::Standard);
        }
    }

    fn handle_context_action(&mut self, action: TabContextAction, tab: TabId, pane: PaneId) {
        let panel = self.mapping.panel_of(tab);
        match action {
            TabContextAction::Rename(title) => {
                if let Some(panel) = panel {
                    self.rename_panel(panel, title);
                }
            }
            TabContextAction::Pin => {
                if let Some(panel) = panel {
                    self.pin_panel(panel);
                }
            }
            TabContextAction::Unpin => {
                if let Some(panel) = panel {
                    self.unpin_panel(panel);
                }
            }
            TabContextAction::Close => {
                self.tree.request_close_tab(tab);
            }
            TabContextAction::CloseOthers => {
                for other in self.tree.tabs_in_pane(pane) {
                    if other != tab {
                        self.tree.request_close_tab(other);
                    }
                }
            }
            TabContextAction::CloseToTheRight => {
                let tabs = self.tree.tabs_in_pane(pane);
                if let Some(index) = tabs.iter().position(|t| *t == tab) {
                    for other in tabs.into_iter().skip(index + 1) {
                        self.tree.request_close_tab(other);
                    }
                }
            }
            TabContextAction::MoveToPane { dest, index } => {
                if !self.tree.move_tab(tab, dest, index) {
                    log::warn!("controller rejected move of {tab} to {dest}");
                }
            }
        }
    }
}
