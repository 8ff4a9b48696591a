//! Headless content engines.
//!
//! In-process [`PanelContent`] implementations with no PTY or web view
//! behind them, used by the test suite and by hosts running without a
//! display (CI, socket-driven control). Each engine carries a [`PanelProbe`]
//! so observers can count focus/flash/close traffic.

use super::{PanelContent, PanelFactory, PanelKind, TerminalSpawn};
use muxspace_config::constants::DEFAULT_FONT_SIZE;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct ProbeState {
    focus: u32,
    unfocus: u32,
    close: u32,
    flash: u32,
    focused: bool,
}

/// Shared observation handle for a headless engine.
#[derive(Clone, Default)]
pub struct PanelProbe {
    inner: Rc<RefCell<ProbeState>>,
}

impl PanelProbe {
    /// How many times `focus()` was invoked.
    pub fn focus_count(&self) -> u32 {
        self.inner.borrow().focus
    }

    /// How many times `unfocus()` was invoked.
    pub fn unfocus_count(&self) -> u32 {
        self.inner.borrow().unfocus
    }

    /// How many times `close()` was invoked.
    pub fn close_count(&self) -> u32 {
        self.inner.borrow().close
    }

    /// How many times `trigger_flash()` was invoked.
    pub fn flash_count(&self) -> u32 {
        self.inner.borrow().flash
    }

    /// Whether the engine currently believes it holds input focus.
    pub fn is_focused(&self) -> bool {
        self.inner.borrow().focused
    }
}

/// Headless terminal engine.
pub struct HeadlessTerminal {
    probe: PanelProbe,
    title: String,
    directory: Option<String>,
    font_size: f32,
    dirty: bool,
    needs_confirm: bool,
    live: bool,
}

impl HeadlessTerminal {
    pub fn new() -> Self {
        Self {
            probe: PanelProbe::default(),
            title: String::new(),
            directory: None,
            font_size: DEFAULT_FONT_SIZE,
            dirty: false,
            needs_confirm: false,
            live: true,
        }
    }

    /// Observation handle for this engine.
    pub fn probe(&self) -> PanelProbe {
        self.probe.clone()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_directory(&mut self, directory: Option<String>) {
        self.directory = directory;
    }

    /// Simulate a running job that should gate close behind confirmation.
    pub fn set_needs_confirm(&mut self, needs_confirm: bool) {
        self.needs_confirm = needs_confirm;
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Simulate the underlying shell exiting.
    pub fn set_live(&mut self, live: bool) {
        self.live = live;
    }
}

impl Default for HeadlessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelContent for HeadlessTerminal {
    fn kind(&self) -> PanelKind {
        PanelKind::Terminal
    }

    fn focus(&mut self) {
        let mut state = self.probe.inner.borrow_mut();
        state.focus += 1;
        state.focused = true;
    }

    fn unfocus(&mut self) {
        let mut state = self.probe.inner.borrow_mut();
        state.unfocus += 1;
        state.focused = false;
    }

    fn close(&mut self) {
        self.live = false;
        self.probe.inner.borrow_mut().close += 1;
    }

    fn trigger_flash(&mut self) {
        self.probe.inner.borrow_mut().flash += 1;
    }

    fn display_title(&self) -> String {
        self.title.clone()
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn needs_confirm_close(&self) -> bool {
        self.needs_confirm
    }

    fn has_live_session(&self) -> bool {
        self.live
    }

    fn current_directory(&self) -> Option<String> {
        self.directory.clone()
    }

    fn font_size(&self) -> Option<f32> {
        Some(self.font_size)
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }
}

/// Headless browser engine.
pub struct HeadlessBrowser {
    probe: PanelProbe,
    title: String,
    url: Option<String>,
    loading: bool,
    needs_confirm: bool,
}

impl HeadlessBrowser {
    pub fn new(url: Option<&str>) -> Self {
        Self {
            probe: PanelProbe::default(),
            title: String::new(),
            url: url.map(str::to_string),
            loading: false,
            needs_confirm: false,
        }
    }

    /// Observation handle for this engine.
    pub fn probe(&self) -> PanelProbe {
        self.probe.clone()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_needs_confirm(&mut self, needs_confirm: bool) {
        self.needs_confirm = needs_confirm;
    }
}

impl PanelContent for HeadlessBrowser {
    fn kind(&self) -> PanelKind {
        PanelKind::Browser
    }

    fn focus(&mut self) {
        let mut state = self.probe.inner.borrow_mut();
        state.focus += 1;
        state.focused = true;
    }

    fn unfocus(&mut self) {
        let mut state = self.probe.inner.borrow_mut();
        state.unfocus += 1;
        state.focused = false;
    }

    fn close(&mut self) {
        self.probe.inner.borrow_mut().close += 1;
    }

    fn trigger_flash(&mut self) {
        self.probe.inner.borrow_mut().flash += 1;
    }

    fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        self.url.clone().unwrap_or_default()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn needs_confirm_close(&self) -> bool {
        self.needs_confirm
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }
}

/// Factory producing headless engines, recording a probe per spawn.
///
/// Clone the handle from [`HeadlessFactory::probes_handle`] before moving
/// the factory into a workspace; probes are appended in creation order.
#[derive(Default)]
pub struct HeadlessFactory {
    created: Rc<RefCell<Vec<PanelProbe>>>,
    confirm_new_terminals: bool,
    new_terminal_directory: Option<String>,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared list of probes for every engine this factory has built.
    pub fn probes_handle(&self) -> Rc<RefCell<Vec<PanelProbe>>> {
        Rc::clone(&self.created)
    }

    /// Make every future terminal report `needs_confirm_close`.
    pub fn set_confirm_new_terminals(&mut self, confirm: bool) {
        self.confirm_new_terminals = confirm;
    }

    /// Give future terminals without an inherited directory this working
    /// directory, as if their shells had reported one.
    pub fn set_new_terminal_directory(&mut self, directory: Option<&str>) {
        self.new_terminal_directory = directory.map(str::to_string);
    }
}

impl PanelFactory for HeadlessFactory {
    fn terminal(&mut self, spawn: &TerminalSpawn) -> Box<dyn PanelContent> {
        let mut term = HeadlessTerminal::new();
        term.set_directory(
            spawn
                .directory
                .clone()
                .or_else(|| self.new_terminal_directory.clone()),
        );
        if let Some(size) = spawn.font_size {
            term.set_font_size(size);
        }
        term.set_needs_confirm(self.confirm_new_terminals);
        self.created.borrow_mut().push(term.probe());
        Box::new(term)
    }

    fn browser(&mut self, url: Option<&str>) -> Box<dyn PanelContent> {
        let browser = HeadlessBrowser::new(url);
        self.created.borrow_mut().push(browser.probe());
        Box::new(browser)
    }
}
