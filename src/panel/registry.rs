//! Registry of panel entities and their per-panel metadata.
//!
//! The registry has no knowledge of layout: pin state and unread marks are
//! stored here, but which pane a panel sits in is the split tree's business.

use super::{Panel, PanelId};
use muxspace_config::constants::FALLBACK_TAB_TITLE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-panel metadata owned by the registry.
///
/// `title` caches the last observed live title so it survives detach (when
/// the engine may briefly have no view) and feeds the resolved-title
/// fallback chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelMeta {
    /// Last observed live/base title.
    pub title: String,
    /// User-assigned title; overrides the live title when non-empty.
    pub custom_title: Option<String>,
    /// Last observed working directory.
    pub directory: Option<String>,
    /// Whether the panel is pinned (sorts first, resists ordinary close).
    pub pinned: bool,
    /// Unread signal owned by the external notification store.
    pub external_unread: bool,
    /// Git branch snapshot for sidebar display.
    pub git_branch: Option<String>,
    /// Font-size lineage root for configuration inheritance.
    pub font_root: Option<f32>,
}

/// A registry entry: the panel entity plus its metadata.
pub struct PanelEntry {
    pub panel: Panel,
    pub meta: PanelMeta,
}

impl PanelEntry {
    /// Resolved title of this entry (custom, live, cached, placeholder).
    pub fn resolved_title(&self) -> String {
        if let Some(custom) = &self.meta.custom_title
            && !custom.is_empty()
        {
            return custom.clone();
        }
        let live = self.panel.content.display_title();
        if !live.is_empty() {
            return live;
        }
        if !self.meta.title.is_empty() {
            return self.meta.title.clone();
        }
        FALLBACK_TAB_TITLE.to_string()
    }
}

/// Owns all live panels in a workspace, keyed by panel id.
///
/// A `BTreeMap` keeps iteration sorted by id so "any live panel" fallbacks
/// are deterministic.
#[derive(Default)]
pub struct PanelRegistry {
    entries: BTreeMap<PanelId, PanelEntry>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live panels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Insert a panel with its metadata. Replacing an existing entry is a
    /// caller bug; the attach path checks for duplicates before calling.
    pub fn insert(&mut self, panel: Panel, meta: PanelMeta) {
        let id = panel.id;
        debug_assert!(!self.entries.contains_key(&id), "duplicate panel {id}");
        self.entries.insert(id, PanelEntry { panel, meta });
        log::debug!("registry: inserted panel {id} (total {})", self.entries.len());
    }

    /// Remove a panel, returning the entry so the caller decides whether to
    /// destroy the engine or transfer ownership (detach).
    pub fn remove(&mut self, id: PanelId) -> Option<PanelEntry> {
        let entry = self.entries.remove(&id);
        if entry.is_some() {
            log::debug!("registry: removed panel {id} (total {})", self.entries.len());
        }
        entry
    }

    pub fn get(&self, id: PanelId) -> Option<&PanelEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut PanelEntry> {
        self.entries.get_mut(&id)
    }

    pub fn meta(&self, id: PanelId) -> Option<&PanelMeta> {
        self.entries.get(&id).map(|e| &e.meta)
    }

    pub fn meta_mut(&mut self, id: PanelId) -> Option<&mut PanelMeta> {
        self.entries.get_mut(&id).map(|e| &mut e.meta)
    }

    /// All live panel ids, sorted.
    pub fn ids(&self) -> Vec<PanelId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PanelId, &PanelEntry)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PanelId, &mut PanelEntry)> {
        self.entries.iter_mut()
    }

    /// Title shown for a panel: custom title, else live title, else the last
    /// cached base title, else a non-empty placeholder.
    pub fn resolved_title(&self, id: PanelId) -> String {
        match self.entries.get(&id) {
            Some(entry) => entry.resolved_title(),
            None => FALLBACK_TAB_TITLE.to_string(),
        }
    }
}
