//! Focus coordination: keeps the controller's selection, the registry's
//! focused panel, and host-level input focus converged.
//!
//! The focused panel is derived, never stored: it is "the panel mapped to
//! the controller's selected tab in its focused pane". What is stored is
//! scheduling state — a reentrancy guard with a bounded request queue, a
//! coalesced reconcile flag, and a generation-stamped reassertion token for
//! non-focusing splits.

use super::Workspace;
use crate::panel::PanelId;
use crate::split::{PaneId, SplitTree, TabId};
use std::collections::VecDeque;

/// What provoked a focus request.
///
/// `EngineFirstResponder` marks requests that are themselves the product of
/// host-level focus having already converged (the engine's view became
/// first responder and echoed the focus back up). Re-requesting host focus
/// for those would loop: focus → event → refocus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTrigger {
    Standard,
    EngineFirstResponder,
}

/// Classification of a raw host input event, used to detect explicit user
/// intent that supersedes scheduled focus reassertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pointer,
    Key,
    Gesture,
    Other,
}

impl InputKind {
    fn is_explicit_intent(self) -> bool {
        matches!(self, Self::Pointer | Self::Key | Self::Gesture)
    }
}

#[derive(Debug, Clone, Copy)]
struct SelectionRequest {
    tab: TabId,
    pane: PaneId,
    trigger: FocusTrigger,
}

#[derive(Debug, Clone, Copy)]
struct Reassert {
    panel: PanelId,
    remaining: u8,
    generation: u64,
}

/// Scheduling state of the focus coordinator.
#[derive(Default)]
pub(crate) struct FocusState {
    applying: bool,
    queued: VecDeque<SelectionRequest>,
    reconcile_scheduled: bool,
    pub(crate) last_focused: Option<PanelId>,
    generation: u64,
    reassert: Option<Reassert>,
    pub(crate) pending_unread_clear: Option<PanelId>,
}

impl<T: SplitTree> Workspace<T> {
    /// The panel the workspace currently calls focused, derived from the
    /// controller's ground truth.
    pub fn focused_panel(&self) -> Option<PanelId> {
        let pane = self.tree.focused_pane()?;
        let tab = self.tree.selected_tab(pane)?;
        self.mapping.panel_of(tab)
    }

    /// Focus a panel explicitly. Supersedes any pending reassertion.
    pub fn focus_panel(&mut self, panel: PanelId, trigger: FocusTrigger) -> bool {
        let Some(tab) = self.mapping.tab_of(panel) else {
            return false;
        };
        let Some(pane) = self.tree.pane_of_tab(tab) else {
            return false;
        };
        self.focus.generation = self.focus.generation.wrapping_add(1);
        self.focus.reassert = None;
        self.apply_selection(tab, pane, trigger);
        self.pump_events();
        true
    }

    /// Record a classified host input event. Pointer/key/gesture events
    /// count as explicit focus intent and invalidate scheduled reassertion.
    pub fn note_user_input(&mut self, kind: InputKind) {
        if !kind.is_explicit_intent() {
            return;
        }
        self.focus.generation = self.focus.generation.wrapping_add(1);
        if self.focus.reassert.take().is_some() {
            log::debug!("focus reassertion superseded by user input");
        }
    }

    /// Schedule a coalesced reconcile pass for the next scheduler turn.
    pub fn schedule_reconcile(&mut self) {
        self.focus.reconcile_scheduled = true;
    }

    /// Run one scheduler turn: reassertion, reconcile, deferred badge
    /// clears. The host calls this once per turn of its event loop.
    pub fn run_scheduled_pass(&mut self) {
        if let Some(mut reassert) = self.focus.reassert.take() {
            if reassert.generation != self.focus.generation {
                log::debug!("dropping stale focus reassertion");
            } else if let Some(tab) = self.mapping.tab_of(reassert.panel)
                && let Some(pane) = self.tree.pane_of_tab(tab)
            {
                self.apply_selection(tab, pane, FocusTrigger::Standard);
                reassert.remaining = reassert.remaining.saturating_sub(1);
                if reassert.remaining > 0 && reassert.generation == self.focus.generation {
                    self.focus.reassert = Some(reassert);
                }
            }
        }

        if std::mem::take(&mut self.focus.reconcile_scheduled) {
            self.reconcile_focus();
        }

        if let Some(panel) = self.focus.pending_unread_clear.take() {
            self.finish_unread_clear(panel);
        }

        self.pump_events();
    }

    /// Re-assert focus onto `panel` across the next few scheduler turns.
    /// Used after a split that must not transfer focus: the controller may
    /// emit a delayed, unwanted focus change to the new pane.
    pub(crate) fn begin_focus_reassert(&mut self, panel: PanelId) {
        self.focus.reassert = Some(Reassert {
            panel,
            remaining: self.config.focus_reassert_turns,
            generation: self.focus.generation,
        });
    }

    /// Apply a selection/focus request synchronously.
    ///
    /// Reentrant requests (a mutation inside the pass triggering another
    /// selection event) are queued and drained afterwards, capped; exceeding
    /// the cap is an anomaly, not an expected steady state.
    pub(crate) fn apply_selection(&mut self, tab: TabId, pane: PaneId, trigger: FocusTrigger) {
        if self.focus.applying {
            self.focus.queued.push_back(SelectionRequest { tab, pane, trigger });
            return;
        }
        self.focus.applying = true;
        self.apply_selection_inner(tab, pane, trigger);

        let cap = self.config.selection_drain_cap as usize;
        let mut drained = 0usize;
        while let Some(request) = self.focus.queued.pop_front() {
            drained += 1;
            if drained > cap {
                log::warn!(
                    "selection drain exceeded cap {cap}; dropping {} queued requests",
                    self.focus.queued.len() + 1
                );
                self.focus.queued.clear();
                break;
            }
            self.apply_selection_inner(request.tab, request.pane, request.trigger);
        }
        self.focus.applying = false;
    }

    fn apply_selection_inner(&mut self, tab: TabId, pane: PaneId, trigger: FocusTrigger) {
        // 1. Converge the controller on the requested (tab, pane) pair,
        //    touching it only where it disagrees.
        let Some(actual_pane) = self.tree.pane_of_tab(tab) else {
            log::debug!("selection target {tab} is gone; leaving prior focus state");
            return;
        };
        if actual_pane != pane {
            log::debug!("selection of {tab} redirected from {pane} to {actual_pane}");
        }
        let pane = actual_pane;

        let already_converged =
            self.tree.selected_tab(pane) == Some(tab) && self.tree.focused_pane() == Some(pane);
        if self.tree.selected_tab(pane) != Some(tab) && !self.tree.select_tab(tab) {
            log::warn!("controller rejected select of {tab}");
            return;
        }
        if self.tree.focused_pane() != Some(pane) && !self.tree.focus_pane(pane) {
            log::warn!("controller rejected focus of {pane}");
        }

        // 2. Resolve the panel; a mapping miss leaves prior state.
        let Some(panel_id) = self.mapping.panel_of(tab) else {
            log::debug!("{tab} has no mapped panel; focus left unchanged");
            return;
        };

        // 3. Single source of truth: exactly one focused panel.
        for other in self.registry.ids() {
            if other != panel_id
                && let Some(entry) = self.registry.get_mut(other)
            {
                entry.panel.content.unfocus();
            }
        }

        // 4. Host-level focus, unless this request is the echo of host
        //    focus having already converged.
        let suppress = trigger == FocusTrigger::EngineFirstResponder && already_converged;
        if suppress {
            log::debug!("skipping host refocus of {panel_id}: first responder already converged");
        } else if let Some(entry) = self.registry.get_mut(panel_id) {
            entry.panel.content.focus();
        }

        // 5. Unread bookkeeping and observer notification.
        let previous = self.focus.last_focused;
        self.focus.last_focused = Some(panel_id);
        self.clear_unread_on_focus(previous, panel_id);
        if previous != Some(panel_id) {
            self.emit_focus_changed(panel_id);
        }
    }

    /// Idempotent fallback pass: re-derive the focused panel from the
    /// controller's current state; on structural inconsistency fall back to
    /// the first live panel in sorted-id order.
    pub(crate) fn reconcile_focus(&mut self) {
        // Mid-detach, focus side effects would flash; the caller finishes
        // the transaction first.
        if self.close.active_detach > 0 {
            return;
        }
        if let Some(pane) = self.tree.focused_pane()
            && let Some(tab) = self.tree.selected_tab(pane)
            && self.mapping.panel_of(tab).is_some()
        {
            self.apply_selection(tab, pane, FocusTrigger::Standard);
            return;
        }
        for panel in self.registry.ids() {
            if let Some(tab) = self.mapping.tab_of(panel)
                && let Some(pane) = self.tree.pane_of_tab(tab)
            {
                self.apply_selection(tab, pane, FocusTrigger::Standard);
                return;
            }
        }
        log::debug!("reconcile: no panel resolvable from the layout tree");
    }
}
