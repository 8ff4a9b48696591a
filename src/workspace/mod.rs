//! Workspace aggregate: one split layout tree, its panels, and the state
//! that keeps them converged.
//!
//! `Workspace` owns the panel registry, the tab↔panel bijection, and the
//! external controller handle; the per-concern algorithms live in sibling
//! files as `impl` blocks (adapter callbacks, focus coordination,
//! close/detach transactions, ordering/unread, panel creation). Everything
//! runs on one logical main task; there are no locks because no concurrent
//! mutation is possible by construction.

mod adapter;
mod close;
mod creation;
mod focus;
mod ordering;
mod snapshot;

pub use close::{AttachRejected, CloseConfirmRequest, DetachedPanel};
pub use focus::{FocusTrigger, InputKind};
pub use snapshot::{PaneSnapshot, SurfaceSnapshot, WorkspaceSnapshot};

use crate::panel::{PanelFactory, PanelId, PanelRegistry};
use crate::split::{SplitTree, TabDisplay, TabId};
use close::CloseState;
use creation::FontLineage;
use focus::FocusState;
use muxspace_config::Config;
use ordering::{OrderingState, UnreadState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Focus-changed broadcast payload for UI observers (sidebar, notification
/// center).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub workspace: WorkspaceId,
    pub panel: PanelId,
}

/// Bijection between external tab ids and panel ids.
///
/// Entries are created before the controller's mutation commits (so no
/// observable frame sees an unmapped live tab) and removed exactly once, on
/// confirmed close or detach.
#[derive(Default)]
pub(crate) struct TabPanelMap {
    by_tab: HashMap<TabId, PanelId>,
    by_panel: HashMap<PanelId, TabId>,
}

impl TabPanelMap {
    pub(crate) fn insert(&mut self, tab: TabId, panel: PanelId) {
        debug_assert!(
            !self.by_tab.contains_key(&tab) && !self.by_panel.contains_key(&panel),
            "mapping already holds {tab} or {panel}"
        );
        self.by_tab.insert(tab, panel);
        self.by_panel.insert(panel, tab);
    }

    pub(crate) fn remove_tab(&mut self, tab: TabId) -> Option<PanelId> {
        let panel = self.by_tab.remove(&tab)?;
        self.by_panel.remove(&panel);
        Some(panel)
    }

    pub(crate) fn panel_of(&self, tab: TabId) -> Option<PanelId> {
        self.by_tab.get(&tab).copied()
    }

    pub(crate) fn tab_of(&self, panel: PanelId) -> Option<TabId> {
        self.by_panel.get(&panel).copied()
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.by_tab.len(), self.by_panel.len());
        self.by_tab.len()
    }
}

/// A single workspace's surface collection.
pub struct Workspace<T: SplitTree> {
    pub(crate) id: WorkspaceId,
    pub(crate) config: Config,
    pub(crate) tree: T,
    pub(crate) factory: Box<dyn PanelFactory>,
    pub(crate) registry: PanelRegistry,
    pub(crate) mapping: TabPanelMap,
    pub(crate) focus: FocusState,
    pub(crate) close: CloseState,
    pub(crate) ordering: OrderingState,
    pub(crate) unread: UnreadState,
    pub(crate) font: FontLineage,
    pub(crate) prompts: Vec<CloseConfirmRequest>,
    pub(crate) focus_events: Vec<FocusChange>,
    pub(crate) pumping: bool,
    pub(crate) suppress_split_autofill: bool,
}

impl<T: SplitTree> Workspace<T> {
    /// Create a workspace over an external layout tree.
    ///
    /// Seeds the tree's first pane with one terminal panel, selected and
    /// focused — a workspace never renders with zero panels.
    pub fn new(config: Config, tree: T, factory: Box<dyn PanelFactory>) -> Self {
        let mut workspace = Self {
            id: WorkspaceId::new(),
            config,
            tree,
            factory,
            registry: PanelRegistry::new(),
            mapping: TabPanelMap::default(),
            focus: FocusState::default(),
            close: CloseState::default(),
            ordering: OrderingState::default(),
            unread: UnreadState::default(),
            font: FontLineage::default(),
            prompts: Vec::new(),
            focus_events: Vec::new(),
            pumping: false,
            suppress_split_autofill: false,
        };

        if let Some(pane) = workspace.tree.panes().first().copied() {
            workspace.spawn_terminal_in_pane(pane, None, true);
        } else {
            log::warn!("workspace {}: controller reports no panes", workspace.id);
        }
        workspace.pump_events();
        log::info!("workspace {} created", workspace.id);
        workspace
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The external layout controller. Hosts drive user gestures through
    /// this and then call [`Workspace::pump_events`].
    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    /// All live panel ids, sorted.
    pub fn panels(&self) -> Vec<PanelId> {
        self.registry.ids()
    }

    pub fn panel_count(&self) -> usize {
        self.registry.len()
    }

    /// The tab currently mapped to a panel, if it is in the layout.
    pub fn tab_of_panel(&self, panel: PanelId) -> Option<TabId> {
        self.mapping.tab_of(panel)
    }

    /// The panel mapped to an external tab id.
    pub fn panel_of_tab(&self, tab: TabId) -> Option<PanelId> {
        self.mapping.panel_of(tab)
    }

    /// Title shown for a panel (custom title overrides live title).
    pub fn resolved_title(&self, panel: PanelId) -> String {
        self.registry.resolved_title(panel)
    }

    /// Drain focus-changed notifications queued for UI observers.
    pub fn drain_focus_events(&mut self) -> Vec<FocusChange> {
        std::mem::take(&mut self.focus_events)
    }

    /// Set or clear the user-assigned title of a panel.
    pub fn rename_panel(&mut self, panel: PanelId, title: Option<String>) {
        let Some(meta) = self.registry.meta_mut(panel) else {
            return;
        };
        meta.custom_title = title.filter(|t| !t.is_empty());
        self.push_tab_display(panel);
    }

    /// Record a git-branch snapshot for sidebar display.
    pub fn set_git_branch(&mut self, panel: PanelId, branch: Option<String>) {
        if let Some(meta) = self.registry.meta_mut(panel) {
            meta.git_branch = branch;
        }
    }

    /// Unread signal owned by the external notification store; OR'd with
    /// the manual-unread mark for the tab indicator.
    pub fn set_external_unread(&mut self, panel: PanelId, unread: bool) {
        if let Some(meta) = self.registry.meta_mut(panel) {
            meta.external_unread = unread;
        }
        self.push_tab_display(panel);
    }

    /// Apply a font size to a terminal panel's engine (host zoom command).
    ///
    /// The stored lineage root is deliberately left alone: a zoom beyond the
    /// configured tolerance re-roots the lineage the next time a sibling
    /// resolves its font.
    pub fn set_panel_font_size(&mut self, panel: PanelId, size: f32) {
        if let Some(entry) = self.registry.get_mut(panel) {
            entry.panel.content.set_font_size(size);
        }
    }

    /// Pull live title/directory/dirty/loading state from a panel's engine
    /// into registry metadata and the controller's tab display.
    pub fn refresh_panel_display(&mut self, panel: PanelId) {
        let Some(entry) = self.registry.get_mut(panel) else {
            return;
        };
        let live_title = entry.panel.content.display_title();
        if !live_title.is_empty() {
            entry.meta.title = live_title;
        }
        if let Some(dir) = entry.panel.content.current_directory() {
            entry.meta.directory = Some(dir);
        }
        self.push_tab_display(panel);
    }

    /// Push current display metadata for a panel to the controller.
    pub(crate) fn push_tab_display(&mut self, panel: PanelId) {
        let Some(tab) = self.mapping.tab_of(panel) else {
            return;
        };
        let Some(entry) = self.registry.get(panel) else {
            return;
        };
        let display = TabDisplay {
            title: self.registry.resolved_title(panel),
            icon: entry.panel.content.display_icon(),
            indicator: entry.meta.external_unread || self.unread.is_marked(panel),
            loading: entry.panel.content.is_loading(),
        };
        if !self.tree.update_tab(tab, display) {
            log::warn!("controller rejected tab display update for {tab}");
        }
    }

    /// Queue a focus-changed broadcast.
    pub(crate) fn emit_focus_changed(&mut self, panel: PanelId) {
        let change = FocusChange {
            workspace: self.id,
            panel,
        };
        self.focus_events.push(change);
        log::debug!("workspace {}: focus -> panel {panel}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_bijective() {
        let mut map = TabPanelMap::default();
        let tab_a = TabId::from_raw(1);
        let tab_b = TabId::from_raw(2);
        let panel_a = PanelId::new();
        let panel_b = PanelId::new();

        map.insert(tab_a, panel_a);
        map.insert(tab_b, panel_b);
        assert_eq!(map.len(), 2);
        assert_eq!(map.panel_of(tab_a), Some(panel_a));
        assert_eq!(map.tab_of(panel_b), Some(tab_b));

        assert_eq!(map.remove_tab(tab_a), Some(panel_a));
        assert_eq!(map.tab_of(panel_a), None);
        assert_eq!(map.remove_tab(tab_a), None);
        assert_eq!(map.len(), 1);
    }
}
