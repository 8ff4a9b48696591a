//! Close policy, confirmation protocol, and detach/attach transactions.
//!
//! Closing is a two-phase protocol with the controller: it asks
//! (`ShouldCloseTab`), policy answers, and only an approved close is
//! committed. Confirmation suspends the close without blocking anything
//! else; the resumed continuation revalidates that its target still exists.
//! Detach is a close that transfers ownership instead of destroying the
//! panel.

use super::Workspace;
use crate::error::WorkspaceError;
use crate::panel::registry::PanelEntry;
use crate::panel::{Panel, PanelId, PanelMeta};
use crate::split::{PaneId, SplitTree, TabDisplay, TabId};
use crate::workspace::FocusTrigger;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Close/detach transaction state.
#[derive(Default)]
pub(crate) struct CloseState {
    /// Tabs whose next close request is approved unconditionally. Each
    /// entry is consumed by one approval.
    pub(crate) force_close: HashSet<TabId>,
    /// Tabs with a confirmation dialog in flight; repeated close gestures
    /// for these are rejected so one gesture burst yields one dialog.
    pending_confirm: HashSet<TabId>,
    /// Panes with a confirmation dialog in flight.
    pending_confirm_panes: HashSet<PaneId>,
    /// Panes whose next close request is approved unconditionally.
    force_close_panes: HashSet<PaneId>,
    /// Closing tab → the tab that should become selected afterwards,
    /// computed at approval time.
    post_close_selection: HashMap<TabId, TabId>,
    /// Pane → its panel ids, snapshotted at pane-close approval because no
    /// per-tab close events will follow.
    pending_pane_close: HashMap<PaneId, Vec<PanelId>>,
    /// Tabs closing as part of a detach, mapped to their panel.
    detaching: HashMap<TabId, PanelId>,
    /// Descriptor handed from the close callback to the detach initiator.
    detached_out: Option<DetachedPanel>,
    /// Number of in-flight detach transactions. While positive, the
    /// never-empty replacement and reconcile focus side effects are
    /// suppressed.
    pub(crate) active_detach: u32,
}

/// A pending close confirmation the host must present and answer.
#[derive(Debug, Clone)]
pub enum CloseConfirmRequest {
    Tab {
        tab: TabId,
        pane: PaneId,
        panel: PanelId,
        title: String,
    },
    Pane {
        pane: PaneId,
        panels: Vec<PanelId>,
    },
}

/// Snapshot of a panel removed from one layout location, pending
/// reinsertion elsewhere (possibly another workspace or window).
///
/// Ownership of the panel entity transfers with this value. It must be
/// consumed by exactly one attach, or explicitly discarded.
#[must_use = "a detached panel must be attached or discarded, or its session leaks"]
pub struct DetachedPanel {
    pub(crate) panel: Panel,
    pub(crate) meta: PanelMeta,
    pub(crate) title: String,
    pub(crate) icon: Option<String>,
    pub(crate) dirty: bool,
    pub(crate) loading: bool,
    pub(crate) manual_unread: Option<Instant>,
}

impl std::fmt::Debug for DetachedPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetachedPanel")
            .field("panel", &self.panel.id)
            .field("title", &self.title)
            .finish()
    }
}

impl DetachedPanel {
    pub fn panel_id(&self) -> PanelId {
        self.panel.id
    }

    /// Resolved title at detach time.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn custom_title(&self) -> Option<&str> {
        self.meta.custom_title.as_deref()
    }

    pub fn directory(&self) -> Option<&str> {
        self.meta.directory.as_deref()
    }

    pub fn is_pinned(&self) -> bool {
        self.meta.pinned
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_manual_unread(&self) -> bool {
        self.manual_unread.is_some()
    }

    /// Give up on reattaching: tear the session down.
    pub fn discard(mut self) {
        log::info!("discarding detached panel {}", self.panel.id);
        self.panel.content.close();
    }
}

/// An attach the destination workspace refused. Carries the descriptor
/// back so the caller can retry elsewhere or discard it.
pub struct AttachRejected {
    pub detached: DetachedPanel,
    pub error: WorkspaceError,
}

impl std::fmt::Debug for AttachRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachRejected")
            .field("panel", &self.detached.panel.id)
            .field("error", &self.error)
            .finish()
    }
}

impl<T: SplitTree> Workspace<T> {
    /// Close policy for a single tab.
    ///
    /// Force overrides win, pinned panels refuse, confirmation-needing
    /// panels defer (once), everything else approves. Approval also records
    /// which neighbor should inherit selection.
    pub fn should_close_tab(&mut self, tab: TabId, pane: PaneId) -> bool {
        if self.close.force_close.remove(&tab) {
            self.note_post_close_selection(tab, pane);
            return true;
        }

        let Some(panel) = self.mapping.panel_of(tab) else {
            // Unmapped ghost tab: nothing to protect
            return true;
        };

        if self.registry.meta(panel).is_some_and(|m| m.pinned) {
            log::warn!("close of {tab} rejected: panel {panel} is pinned");
            return false;
        }

        let needs_confirm = self.config.confirm_close_running
            && self
                .registry
                .get(panel)
                .is_some_and(|e| e.panel.content.needs_confirm_close());
        if needs_confirm {
            if self.close.pending_confirm.contains(&tab) {
                // A dialog is already up for this tab
                return false;
            }
            self.close.pending_confirm.insert(tab);
            let title = self.registry.resolved_title(panel);
            self.prompts.push(CloseConfirmRequest::Tab {
                tab,
                pane,
                panel,
                title,
            });
            log::info!("close of {tab} deferred pending confirmation");
            return false;
        }

        self.note_post_close_selection(tab, pane);
        true
    }

    /// Close policy for a whole pane. Approval snapshots the pane's panel
    /// ids: the commit will report no per-tab detail.
    ///
    /// The last pane always refuses: panes are minted by the controller, so
    /// approving would leave the workspace with nowhere to put the
    /// replacement panel.
    pub fn should_close_pane(&mut self, pane: PaneId) -> bool {
        if self.tree.panes().len() <= 1 {
            self.close.force_close_panes.remove(&pane);
            log::warn!("close of {pane} rejected: it is the last pane in the layout");
            return false;
        }
        let panels: Vec<PanelId> = self
            .tree
            .tabs_in_pane(pane)
            .into_iter()
            .filter_map(|t| self.mapping.panel_of(t))
            .collect();

        if self.close.force_close_panes.remove(&pane) {
            self.close.pending_pane_close.insert(pane, panels);
            return true;
        }

        if panels
            .iter()
            .any(|p| self.registry.meta(*p).is_some_and(|m| m.pinned))
        {
            log::warn!("close of {pane} rejected: it holds a pinned panel");
            return false;
        }

        let needs_confirm = self.config.confirm_close_running
            && panels.iter().any(|p| {
                self.registry
                    .get(*p)
                    .is_some_and(|e| e.panel.content.needs_confirm_close())
            });
        if needs_confirm {
            if self.close.pending_confirm_panes.contains(&pane) {
                return false;
            }
            self.close.pending_confirm_panes.insert(pane);
            self.prompts
                .push(CloseConfirmRequest::Pane { pane, panels });
            log::info!("close of {pane} deferred pending confirmation");
            return false;
        }

        self.close.pending_pane_close.insert(pane, panels);
        true
    }

    /// Drain pending confirmation prompts for the host to present.
    pub fn take_close_prompts(&mut self) -> Vec<CloseConfirmRequest> {
        std::mem::take(&mut self.prompts)
    }

    /// Resume a suspended tab close with the user's answer.
    ///
    /// Cancellation-safe: if the tab was closed or detached while the
    /// dialog was up, this is a no-op.
    pub fn resolve_close_confirmation(&mut self, tab: TabId, confirmed: bool) {
        if !self.close.pending_confirm.remove(&tab) {
            return;
        }
        if !confirmed {
            log::info!("close of {tab} cancelled by user");
            return;
        }
        if self.tree.pane_of_tab(tab).is_none() {
            log::debug!("confirmed close of {tab}, but it is already gone");
            return;
        }
        self.close.force_close.insert(tab);
        self.tree.request_close_tab(tab);
        self.pump_events();
    }

    /// Resume a suspended pane close with the user's answer.
    pub fn resolve_pane_close_confirmation(&mut self, pane: PaneId, confirmed: bool) {
        if !self.close.pending_confirm_panes.remove(&pane) {
            return;
        }
        if !confirmed {
            log::info!("close of {pane} cancelled by user");
            return;
        }
        if !self.tree.panes().contains(&pane) {
            log::debug!("confirmed close of {pane}, but it is already gone");
            return;
        }
        self.close.force_close_panes.insert(pane);
        self.tree.request_close_pane(pane);
        self.pump_events();
    }

    /// Close a panel through the normal policy, or unconditionally with
    /// `force`.
    pub fn close_panel(&mut self, panel: PanelId, force: bool) -> Result<(), WorkspaceError> {
        let tab = self
            .mapping
            .tab_of(panel)
            .ok_or(WorkspaceError::UnknownPanel(panel))?;
        if force {
            self.close.force_close.insert(tab);
        }
        if !self.tree.request_close_tab(tab) {
            self.close.force_close.remove(&tab);
            return Err(WorkspaceError::OperationRejected("close-tab"));
        }
        self.pump_events();
        Ok(())
    }

    /// Remove a panel from this workspace, returning its snapshot for
    /// reinsertion elsewhere.
    ///
    /// While the transaction is in flight the workspace may legitimately be
    /// empty; the caller must attach the descriptor, discard it, or
    /// repopulate the workspace.
    pub fn detach_panel(&mut self, panel: PanelId) -> Result<DetachedPanel, WorkspaceError> {
        let tab = self
            .mapping
            .tab_of(panel)
            .ok_or(WorkspaceError::UnknownPanel(panel))?;

        self.close.force_close.insert(tab);
        self.close.detaching.insert(tab, panel);
        self.close.active_detach += 1;

        if self.tree.request_close_tab(tab) {
            self.pump_events();
        }

        match self.close.detached_out.take() {
            Some(detached) => {
                self.close.active_detach -= 1;
                log::info!("panel {panel} detached from workspace {}", self.id);
                Ok(detached)
            }
            None => {
                // Roll back the force/detach markers; nothing closed.
                self.close.force_close.remove(&tab);
                self.close.detaching.remove(&tab);
                self.close.active_detach -= 1;
                log::warn!("detach of panel {panel} failed: controller refused the close");
                Err(WorkspaceError::OperationRejected("detach-close"))
            }
        }
    }

    /// Reinsert a detached panel into this workspace.
    pub fn attach_detached_panel(
        &mut self,
        detached: DetachedPanel,
        dest: PaneId,
        index: Option<usize>,
        focus: bool,
    ) -> Result<PanelId, AttachRejected> {
        if !self.tree.panes().contains(&dest) {
            return Err(AttachRejected {
                error: WorkspaceError::UnknownPane(dest),
                detached,
            });
        }
        let panel_id = detached.panel.id;
        if self.registry.contains(panel_id) {
            return Err(AttachRejected {
                error: WorkspaceError::DuplicatePanel(panel_id),
                detached,
            });
        }

        let display = TabDisplay {
            title: detached.title.clone(),
            icon: detached.icon.clone(),
            indicator: detached.manual_unread.is_some() || detached.meta.external_unread,
            loading: detached.loading,
        };
        let Some(tab) = self.tree.create_tab(dest, display, index) else {
            return Err(AttachRejected {
                error: WorkspaceError::OperationRejected("create-tab"),
                detached,
            });
        };

        // Mapping first, then registry, then further controller commands,
        // so reentrant callbacks observe a consistent bijection.
        self.mapping.insert(tab, panel_id);
        let DetachedPanel {
            panel,
            meta,
            manual_unread,
            ..
        } = detached;
        self.registry.insert(panel, meta);
        if let Some(at) = manual_unread {
            self.unread.restore_mark(panel_id, at);
        }

        self.normalize_pinned(dest);
        if focus {
            self.apply_selection(tab, dest, FocusTrigger::Standard);
        } else {
            self.schedule_reconcile();
        }
        self.pump_events();
        log::info!("panel {panel_id} attached to {dest} in workspace {}", self.id);
        Ok(panel_id)
    }

    /// Record which neighbor should be selected once `tab` closes: the tab
    /// immediately after it, else the one before.
    pub(crate) fn note_post_close_selection(&mut self, tab: TabId, pane: PaneId) {
        let tabs = self.tree.tabs_in_pane(pane);
        let Some(index) = tabs.iter().position(|t| *t == tab) else {
            return;
        };
        let hint = tabs
            .get(index + 1)
            .or_else(|| index.checked_sub(1).and_then(|i| tabs.get(i)))
            .copied();
        if let Some(hint) = hint {
            self.close.post_close_selection.insert(tab, hint);
        }
    }

    pub(crate) fn take_post_close_selection(&mut self, tab: TabId) -> Option<TabId> {
        self.close.post_close_selection.remove(&tab)
    }

    pub(crate) fn is_detaching(&self, tab: TabId) -> bool {
        self.close.detaching.contains_key(&tab)
    }

    /// Snapshot a closing panel into the pending detach descriptor instead
    /// of destroying it.
    pub(crate) fn package_detached(&mut self, tab: TabId, panel_id: PanelId) {
        self.close.detaching.remove(&tab);
        let Some(entry) = self.registry.remove(panel_id) else {
            log::warn!("detach of {panel_id} found no registry entry");
            return;
        };
        let manual_unread = self.unread.take_mark(panel_id);
        let title = entry.resolved_title();
        let icon = entry.panel.content.display_icon();
        let dirty = entry.panel.content.is_dirty();
        let loading = entry.panel.content.is_loading();
        let PanelEntry { panel, meta } = entry;
        self.close.detached_out = Some(DetachedPanel {
            panel,
            meta,
            title,
            icon,
            dirty,
            loading,
            manual_unread,
        });
    }

    pub(crate) fn take_pane_close_snapshot(&mut self, pane: PaneId) -> Vec<PanelId> {
        self.close.pending_pane_close.remove(&pane).unwrap_or_default()
    }

    pub(crate) fn clear_tab_close_state(&mut self, tab: TabId) {
        self.close.pending_confirm.remove(&tab);
        self.close.force_close.remove(&tab);
    }
}
