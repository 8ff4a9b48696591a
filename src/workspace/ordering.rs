//! Tab ordering and unread badges.
//!
//! Pinned panels form a contiguous prefix of their pane's tab order, in
//! stored relative order; normalization issues the minimal reorder commands
//! to restore that shape. Manual-unread marks are timestamped so a badge a
//! flash just drew attention to is not instantly wiped by refocusing the
//! same panel.

use super::Workspace;
use crate::error::WorkspaceError;
use crate::panel::PanelId;
use crate::split::{PaneId, SplitTree, TabId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
pub(crate) struct OrderingState {
    normalizing: bool,
}

/// Manual-unread marks: panel id → marked-at timestamp.
#[derive(Default)]
pub(crate) struct UnreadState {
    marked: HashMap<PanelId, Instant>,
}

impl UnreadState {
    pub(crate) fn is_marked(&self, panel: PanelId) -> bool {
        self.marked.contains_key(&panel)
    }

    pub(crate) fn take_mark(&mut self, panel: PanelId) -> Option<Instant> {
        self.marked.remove(&panel)
    }

    pub(crate) fn restore_mark(&mut self, panel: PanelId, at: Instant) {
        self.marked.insert(panel, at);
    }
}

impl<T: SplitTree> Workspace<T> {
    /// Restore the pinned-before-unpinned invariant within a pane.
    ///
    /// Idempotent; guarded against the reorder callbacks its own commands
    /// may provoke.
    pub fn normalize_pinned(&mut self, pane: PaneId) {
        if self.ordering.normalizing {
            return;
        }
        self.ordering.normalizing = true;

        let tabs = self.tree.tabs_in_pane(pane);
        let mut pinned: Vec<TabId> = Vec::new();
        let mut unpinned: Vec<TabId> = Vec::new();
        for tab in tabs {
            let is_pinned = self
                .mapping
                .panel_of(tab)
                .and_then(|p| self.registry.meta(p))
                .is_some_and(|m| m.pinned);
            if is_pinned {
                pinned.push(tab);
            } else {
                unpinned.push(tab);
            }
        }

        let desired: Vec<TabId> = pinned.into_iter().chain(unpinned).collect();
        for (index, tab) in desired.iter().enumerate() {
            // Re-read each step: earlier reorders shift positions
            let current = self.tree.tabs_in_pane(pane);
            if current.get(index) != Some(tab) && !self.tree.reorder_tab(*tab, index) {
                log::warn!("controller rejected reorder of {tab} to {index}");
            }
        }

        self.ordering.normalizing = false;
    }

    /// Pin a panel: it sorts before unpinned siblings and resists ordinary
    /// close gestures.
    pub fn pin_panel(&mut self, panel: PanelId) {
        if let Some(meta) = self.registry.meta_mut(panel) {
            meta.pinned = true;
        } else {
            return;
        }
        log::info!("panel {panel} pinned");
        if let Some(tab) = self.mapping.tab_of(panel)
            && let Some(pane) = self.tree.pane_of_tab(tab)
        {
            self.normalize_pinned(pane);
        }
        self.pump_events();
    }

    pub fn unpin_panel(&mut self, panel: PanelId) {
        if let Some(meta) = self.registry.meta_mut(panel) {
            meta.pinned = false;
        } else {
            return;
        }
        log::info!("panel {panel} unpinned");
        if let Some(tab) = self.mapping.tab_of(panel)
            && let Some(pane) = self.tree.pane_of_tab(tab)
        {
            self.normalize_pinned(pane);
        }
        self.pump_events();
    }

    /// Whether a panel shows an unread indicator (external notification
    /// signal OR manual mark).
    pub fn is_unread(&self, panel: PanelId) -> bool {
        self.unread.is_marked(panel)
            || self
                .registry
                .meta(panel)
                .is_some_and(|m| m.external_unread)
    }

    /// Set the manual-unread mark on a panel.
    pub fn mark_unread(&mut self, panel: PanelId) {
        self.mark_unread_at(panel, Instant::now());
    }

    /// Set the manual-unread mark with an explicit timestamp.
    #[doc(hidden)]
    pub fn mark_unread_at(&mut self, panel: PanelId, at: Instant) {
        if !self.registry.contains(panel) {
            return;
        }
        self.unread.marked.insert(panel, at);
        self.push_tab_display(panel);
    }

    /// Clear the manual-unread mark on a panel.
    pub fn mark_read(&mut self, panel: PanelId) {
        if self.unread.marked.remove(&panel).is_some() {
            self.push_tab_display(panel);
        }
    }

    /// Unread handling when focus lands on a panel.
    ///
    /// A different panel gaining focus clears its mark immediately. The
    /// same panel refocusing clears only after the grace window, and then
    /// the flash animation fires first with the badge clear deferred to the
    /// next scheduled pass.
    pub(crate) fn clear_unread_on_focus(&mut self, previous: Option<PanelId>, focused: PanelId) {
        let Some(marked_at) = self.unread.marked.get(&focused).copied() else {
            return;
        };
        if previous == Some(focused) {
            let grace = Duration::from_millis(self.config.unread_clear_grace_ms);
            if marked_at.elapsed() < grace {
                return;
            }
            if let Some(entry) = self.registry.get_mut(focused) {
                entry.panel.content.trigger_flash();
            }
            self.focus.pending_unread_clear = Some(focused);
        } else {
            self.unread.marked.remove(&focused);
            self.push_tab_display(focused);
        }
    }

    /// Deferred badge clear, run from the scheduled pass.
    pub(crate) fn finish_unread_clear(&mut self, panel: PanelId) {
        if self.unread.marked.remove(&panel).is_some() {
            self.push_tab_display(panel);
        }
    }

    /// Reorder a surface within its pane, then restore the pinned prefix.
    pub fn reorder_surface(&mut self, panel: PanelId, index: usize) -> Result<(), WorkspaceError> {
        let tab = self
            .mapping
            .tab_of(panel)
            .ok_or(WorkspaceError::UnknownPanel(panel))?;
        let pane = self
            .tree
            .pane_of_tab(tab)
            .ok_or(WorkspaceError::UnknownTab(tab))?;
        if !self.tree.reorder_tab(tab, index) {
            return Err(WorkspaceError::OperationRejected("reorder-tab"));
        }
        self.normalize_pinned(pane);
        self.pump_events();
        Ok(())
    }

    /// Move a surface to another pane. Moving within its current pane
    /// degrades to a reorder (or nothing, without an index).
    pub fn move_surface(
        &mut self,
        panel: PanelId,
        dest: PaneId,
        index: Option<usize>,
    ) -> Result<(), WorkspaceError> {
        let tab = self
            .mapping
            .tab_of(panel)
            .ok_or(WorkspaceError::UnknownPanel(panel))?;
        if !self.tree.panes().contains(&dest) {
            return Err(WorkspaceError::UnknownPane(dest));
        }
        if self.tree.pane_of_tab(tab) == Some(dest) {
            return match index {
                Some(index) => self.reorder_surface(panel, index),
                None => Ok(()),
            };
        }
        if !self.tree.move_tab(tab, dest, index) {
            return Err(WorkspaceError::OperationRejected("move-tab"));
        }
        // The move callback re-normalizes both panes and re-applies the
        // destination selection.
        self.pump_events();
        Ok(())
    }
}
