//! Panel entities and the capability surface of their content engines.
//!
//! A panel is an application-level content unit (terminal session or browser
//! session) independent of any layout position. The workspace core owns
//! panels exclusively through the [`registry::PanelRegistry`] and refers to
//! them elsewhere only by [`PanelId`]. The actual engines (PTY handling,
//! page loading, rendering) are external collaborators behind the
//! [`PanelContent`] trait.

mod headless;
pub mod registry;

pub use headless::{HeadlessBrowser, HeadlessFactory, HeadlessTerminal, PanelProbe};
pub use registry::{PanelMeta, PanelRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a panel, minted by this core.
///
/// Ordered so deterministic "first live panel" fallbacks can sort by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelId(Uuid);

impl PanelId {
    /// Mint a fresh panel id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PanelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Panel content variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    Terminal,
    Browser,
}

/// Capability surface a content engine exposes to the workspace core.
///
/// Default impls cover capabilities a variant does not have (a terminal has
/// no URL, a browser has no working directory), so engine implementations
/// only override what applies to them.
pub trait PanelContent {
    /// Which variant this engine implements.
    fn kind(&self) -> PanelKind;

    /// Request host-level input focus for this panel's view.
    fn focus(&mut self);

    /// Relinquish host-level input focus.
    fn unfocus(&mut self);

    /// Tear down the underlying session. Called exactly once, on confirmed
    /// close; never called on detach (ownership transfers instead).
    fn close(&mut self);

    /// Play the attention flash animation on the panel's view.
    fn trigger_flash(&mut self);

    /// Live display title (e.g. shell title sequence, page title).
    fn display_title(&self) -> String;

    /// Live display icon identifier, if the engine provides one.
    fn display_icon(&self) -> Option<String> {
        None
    }

    /// Whether the panel has unsaved / running state.
    fn is_dirty(&self) -> bool {
        false
    }

    /// Whether the panel is mid-load (browser variant).
    fn is_loading(&self) -> bool {
        false
    }

    /// Whether closing this panel should prompt for confirmation.
    fn needs_confirm_close(&self) -> bool {
        false
    }

    /// Whether the underlying session is still alive. Dead sessions are
    /// skipped as configuration-inheritance sources.
    fn has_live_session(&self) -> bool {
        true
    }

    /// Current working directory (terminal variant).
    fn current_directory(&self) -> Option<String> {
        None
    }

    /// Current URL (browser variant).
    fn current_url(&self) -> Option<String> {
        None
    }

    /// Live runtime font size (terminal variant).
    fn font_size(&self) -> Option<f32> {
        None
    }

    /// Apply a font size to the engine (terminal variant).
    fn set_font_size(&mut self, _size: f32) {}
}

/// A panel entity: identity plus its content engine.
pub struct Panel {
    /// Unique identifier for this panel.
    pub id: PanelId,
    /// The content engine behind this panel.
    pub content: Box<dyn PanelContent>,
}

impl Panel {
    /// Wrap a content engine in a new panel entity with a fresh id.
    pub fn new(content: Box<dyn PanelContent>) -> Self {
        Self {
            id: PanelId::new(),
            content,
        }
    }

    /// Variant of the underlying engine.
    pub fn kind(&self) -> PanelKind {
        self.content.kind()
    }
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("kind", &self.content.kind())
            .finish()
    }
}

/// Spawn parameters for a new terminal engine.
#[derive(Debug, Clone, Default)]
pub struct TerminalSpawn {
    /// Working directory to start in, if inherited from a sibling.
    pub directory: Option<String>,
    /// Resolved font-size root for the inheritance lineage.
    pub font_size: Option<f32>,
}

/// Constructs content engines for new panels.
///
/// The real implementation spawns PTYs and web views; hosts running
/// headless (CI, socket-driven control) use [`HeadlessFactory`].
pub trait PanelFactory {
    /// Build a terminal engine.
    fn terminal(&mut self, spawn: &TerminalSpawn) -> Box<dyn PanelContent>;

    /// Build a browser engine.
    fn browser(&mut self, url: Option<&str>) -> Box<dyn PanelContent>;
}
