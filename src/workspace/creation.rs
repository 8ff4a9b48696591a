//! Surface creation: spawning panels into panes, split requests, and
//! font-size inheritance.
//!
//! New terminals inherit their font size from a lineage root rather than a
//! sibling's live size, so transient zoom adjustments do not propagate. The
//! lineage re-roots itself when a source's live size has drifted beyond the
//! configured tolerance, which is how a deliberate resize becomes the new
//! family default.

use super::Workspace;
use crate::panel::{Panel, PanelId, PanelKind, PanelMeta, TerminalSpawn};
use crate::split::{PaneId, SplitDirection, SplitTree, TabDisplay};
use muxspace_config::constants::FALLBACK_TAB_TITLE;

/// Workspace-local font inheritance lineage.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FontLineage {
    /// The panel the last resolution drew from.
    pub(crate) last_source: Option<PanelId>,
    /// The last resolved root size, used when no live source remains.
    pub(crate) last_root: Option<f32>,
}

impl<T: SplitTree> Workspace<T> {
    /// Open a new terminal surface, in the given pane or the focused one.
    pub fn new_terminal_surface(&mut self, pane: Option<PaneId>) -> Option<PanelId> {
        let pane = self.resolve_dest_pane(pane)?;
        let id = self.spawn_terminal_in_pane(pane, None, true);
        self.pump_events();
        id
    }

    /// Open a new browser surface, in the given pane or the focused one.
    pub fn new_browser_surface(
        &mut self,
        url: Option<&str>,
        pane: Option<PaneId>,
    ) -> Option<PanelId> {
        let pane = self.resolve_dest_pane(pane)?;
        let id = self.spawn_browser_in_pane(pane, url, true);
        self.pump_events();
        id
    }

    /// Split the focused pane and fill the new pane with a terminal.
    ///
    /// With `focus` false the original pane keeps focus; focus onto it is
    /// re-asserted over the next few scheduler turns because some
    /// controllers emit a delayed focus change toward the new pane.
    pub fn new_terminal_split(
        &mut self,
        direction: SplitDirection,
        focus: bool,
    ) -> Option<PanelId> {
        let created = self.split_focused_pane(direction)?;
        let previous = self.focused_panel();
        let id = self.spawn_terminal_in_pane(created, None, focus);
        if !focus && let Some(previous) = previous {
            self.begin_focus_reassert(previous);
        }
        self.pump_events();
        id
    }

    /// Split the focused pane and fill the new pane with a browser.
    pub fn new_browser_split(
        &mut self,
        direction: SplitDirection,
        url: Option<&str>,
        focus: bool,
    ) -> Option<PanelId> {
        let created = self.split_focused_pane(direction)?;
        let previous = self.focused_panel();
        let id = self.spawn_browser_in_pane(created, url, focus);
        if !focus && let Some(previous) = previous {
            self.begin_focus_reassert(previous);
        }
        self.pump_events();
        id
    }

    fn resolve_dest_pane(&self, pane: Option<PaneId>) -> Option<PaneId> {
        if let Some(pane) = pane {
            if self.tree.panes().contains(&pane) {
                return Some(pane);
            }
            log::warn!("destination {pane} is not in the layout");
            return None;
        }
        self.tree
            .focused_pane()
            .or_else(|| self.tree.panes().first().copied())
    }

    fn split_focused_pane(&mut self, direction: SplitDirection) -> Option<PaneId> {
        let current = self
            .tree
            .focused_pane()
            .or_else(|| self.tree.panes().first().copied())?;
        // The split callback must not autofill: this path fills the pane
        // itself before pumping.
        self.suppress_split_autofill = true;
        let created = self.tree.split_pane(current, direction, None, false);
        if created.is_none() {
            self.suppress_split_autofill = false;
            log::warn!("controller rejected split of {current}");
        }
        created
    }

    /// Spawn a terminal panel into a pane: engine first, then tab, then
    /// mapping, then registry, so no observable state sees a live tab
    /// without its panel.
    pub(crate) fn spawn_terminal_in_pane(
        &mut self,
        pane: PaneId,
        preferred: Option<PanelId>,
        select: bool,
    ) -> Option<PanelId> {
        if self.at_surface_limit() {
            return None;
        }
        let font_root = self.resolve_font_root(preferred, pane);
        let directory = self.inherit_directory(pane);
        let spawn = TerminalSpawn {
            directory: directory.clone(),
            font_size: Some(font_root),
        };
        let mut panel = Panel::new(self.factory.terminal(&spawn));
        let id = panel.id;
        let title = panel.content.display_title();

        let display = TabDisplay {
            title: if title.is_empty() {
                FALLBACK_TAB_TITLE.to_string()
            } else {
                title.clone()
            },
            icon: panel.content.display_icon(),
            indicator: false,
            loading: false,
        };
        let Some(tab) = self.tree.create_tab(pane, display, None) else {
            log::warn!("controller refused a tab in {pane}; dropping spawned terminal");
            panel.content.close();
            return None;
        };

        self.mapping.insert(tab, id);
        let meta = PanelMeta {
            title,
            directory,
            font_root: Some(font_root),
            ..Default::default()
        };
        self.registry.insert(panel, meta);

        if select {
            self.apply_selection(tab, pane, super::FocusTrigger::Standard);
        }
        log::info!("terminal panel {id} spawned into {pane} as {tab}");
        Some(id)
    }

    /// Spawn a browser panel into a pane. Same commit ordering as the
    /// terminal path.
    pub(crate) fn spawn_browser_in_pane(
        &mut self,
        pane: PaneId,
        url: Option<&str>,
        select: bool,
    ) -> Option<PanelId> {
        if self.at_surface_limit() {
            return None;
        }
        let mut panel = Panel::new(self.factory.browser(url));
        let id = panel.id;
        let title = panel.content.display_title();

        let display = TabDisplay {
            title: if title.is_empty() {
                FALLBACK_TAB_TITLE.to_string()
            } else {
                title.clone()
            },
            icon: panel.content.display_icon(),
            indicator: false,
            loading: panel.content.is_loading(),
        };
        let Some(tab) = self.tree.create_tab(pane, display, None) else {
            log::warn!("controller refused a tab in {pane}; dropping spawned browser");
            panel.content.close();
            return None;
        };

        self.mapping.insert(tab, id);
        let meta = PanelMeta {
            title,
            ..Default::default()
        };
        self.registry.insert(panel, meta);

        if select {
            self.apply_selection(tab, pane, super::FocusTrigger::Standard);
        }
        log::info!("browser panel {id} spawned into {pane} as {tab}");
        Some(id)
    }

    fn at_surface_limit(&self) -> bool {
        let max = self.config.max_surfaces;
        if max > 0 && self.registry.len() >= max {
            log::warn!("surface limit {max} reached; refusing to spawn");
            return true;
        }
        false
    }

    /// Resolve the font-size root for a new terminal.
    ///
    /// Candidates are tried in priority order: an explicitly preferred
    /// source panel, the destination pane's selected terminal, the focused
    /// panel, the last lineage source, any terminal in the destination
    /// pane, then any live terminal at all. The first live terminal
    /// candidate decides; if its live size has drifted from its stored root
    /// beyond the tolerance, the lineage re-roots at the live size.
    pub(crate) fn resolve_font_root(&mut self, preferred: Option<PanelId>, dest: PaneId) -> f32 {
        let mut candidates: Vec<PanelId> = Vec::new();
        candidates.extend(preferred);
        if let Some(panel) = self
            .tree
            .selected_tab(dest)
            .and_then(|t| self.mapping.panel_of(t))
        {
            candidates.push(panel);
        }
        if let Some(panel) = self.focused_panel() {
            candidates.push(panel);
        }
        if let Some(panel) = self.font.last_source {
            candidates.push(panel);
        }
        for tab in self.tree.tabs_in_pane(dest) {
            if let Some(panel) = self.mapping.panel_of(tab) {
                candidates.push(panel);
            }
        }
        candidates.extend(self.registry.ids());

        let tolerance = self.config.font_root_tolerance;
        let mut tried: Vec<PanelId> = Vec::new();
        for candidate in candidates {
            if tried.contains(&candidate) {
                continue;
            }
            tried.push(candidate);

            // Copy out before any mutation of the entry's metadata.
            let Some((kind, live_session, live, stored_root)) =
                self.registry.get(candidate).map(|e| {
                    (
                        e.panel.kind(),
                        e.panel.content.has_live_session(),
                        e.panel.content.font_size(),
                        e.meta.font_root,
                    )
                })
            else {
                continue;
            };
            if kind != PanelKind::Terminal || !live_session {
                continue;
            }
            let Some(live) = live else {
                continue;
            };

            let root = match stored_root {
                Some(root) if (root - live).abs() <= tolerance => root,
                _ => {
                    // Deliberate drift (or no lineage yet): the live size
                    // becomes the new root.
                    if let Some(meta) = self.registry.meta_mut(candidate) {
                        meta.font_root = Some(live);
                    }
                    live
                }
            };
            self.font.last_source = Some(candidate);
            self.font.last_root = Some(root);
            return root;
        }

        self.font
            .last_root
            .unwrap_or(self.config.default_font_size)
    }

    /// Fill a pane the controller split empty (its own split affordance).
    pub(crate) fn autofill_split_pane(&mut self, _original: PaneId, created: PaneId) {
        if self.spawn_terminal_in_pane(created, None, true).is_none() {
            log::warn!("could not fill split pane {created}");
        }
    }

    /// A drag-split drained a pane down to controller-minted placeholder
    /// tabs that map to no panel. Give the first placeholder a real
    /// terminal and close the rest.
    pub(crate) fn repair_ghost_pane(&mut self, pane: PaneId) {
        let tabs = self.tree.tabs_in_pane(pane);
        let Some(keep) = tabs.first().copied() else {
            return;
        };
        if self.at_surface_limit() {
            return;
        }

        let font_root = self.resolve_font_root(None, pane);
        let directory = self.inherit_directory(pane);
        let spawn = TerminalSpawn {
            directory: directory.clone(),
            font_size: Some(font_root),
        };
        let panel = Panel::new(self.factory.terminal(&spawn));
        let id = panel.id;
        let title = panel.content.display_title();

        self.mapping.insert(keep, id);
        let meta = PanelMeta {
            title,
            directory,
            font_root: Some(font_root),
            ..Default::default()
        };
        self.registry.insert(panel, meta);
        self.push_tab_display(id);

        for extra in tabs.into_iter().skip(1) {
            self.tree.request_close_tab(extra);
        }
        log::info!("{pane} repaired: {keep} now hosts terminal panel {id}");
    }

    /// Working directory for a new terminal: the destination pane's selected
    /// panel, else the focused panel.
    fn inherit_directory(&self, pane: PaneId) -> Option<String> {
        let source = self
            .tree
            .selected_tab(pane)
            .and_then(|t| self.mapping.panel_of(t))
            .or_else(|| self.focused_panel())?;
        self.registry
            .get(source)
            .and_then(|e| e.panel.content.current_directory())
    }
}

#[cfg(test)]
mod tests {
    use super::Workspace;
    use crate::panel::HeadlessFactory;
    use crate::split::{MemorySplitTree, SplitTree};
    use muxspace_config::Config;

    fn workspace() -> Workspace<MemorySplitTree> {
        Workspace::new(
            Config::default(),
            MemorySplitTree::new(),
            Box::new(HeadlessFactory::new()),
        )
    }

    #[test]
    fn preferred_source_outranks_the_focused_terminal() {
        let mut ws = workspace();
        let p1 = ws.focused_panel().expect("seed");
        let p2 = ws.new_terminal_surface(None).expect("second");
        assert_eq!(ws.focused_panel(), Some(p2));

        // Size p1 away from the family default, then ask for its lineage
        ws.set_panel_font_size(p1, 20.0);
        let pane = ws.tree().panes()[0];
        let p3 = ws
            .spawn_terminal_in_pane(pane, Some(p1), true)
            .expect("third");
        ws.pump_events();

        let entry = ws.registry().get(p3).expect("registered");
        assert_eq!(entry.panel.content.font_size(), Some(20.0));
        assert_eq!(entry.meta.font_root, Some(20.0));
        // The preferred source re-rooted at its drifted live size
        assert_eq!(ws.registry().meta(p1).expect("meta").font_root, Some(20.0));
    }

    #[test]
    fn a_dead_preferred_source_falls_through_the_chain() {
        let mut ws = workspace();
        let p1 = ws.focused_panel().expect("seed");
        let p2 = ws.new_terminal_surface(None).expect("second");
        ws.set_panel_font_size(p1, 20.0);
        if let Some(entry) = ws.registry.get_mut(p1) {
            entry.panel.content.close();
        }

        // p1 has no live session, so the selected/focused terminal decides
        let pane = ws.tree().panes()[0];
        let p3 = ws
            .spawn_terminal_in_pane(pane, Some(p1), true)
            .expect("third");
        ws.pump_events();

        let entry = ws.registry().get(p3).expect("registered");
        assert_eq!(entry.panel.content.font_size(), Some(13.0));
        assert_eq!(ws.registry().meta(p2).expect("meta").font_root, Some(13.0));
    }
}
