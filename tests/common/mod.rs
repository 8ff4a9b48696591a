#![allow(dead_code)]

use muxspace::panel::{HeadlessFactory, PanelProbe};
use muxspace::{MemorySplitTree, PaneId, PanelId, SplitTree, TabId, Workspace};
use muxspace_config::Config;
use std::cell::RefCell;
use std::rc::Rc;

/// A workspace over an in-memory controller, with the probes of every
/// engine the factory built, in creation order.
pub struct Fixture {
    pub ws: Workspace<MemorySplitTree>,
    pub probes: Rc<RefCell<Vec<PanelProbe>>>,
}

impl Fixture {
    pub fn probe(&self, index: usize) -> PanelProbe {
        self.probes.borrow()[index].clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.borrow().len()
    }

    /// The seeded root pane.
    pub fn root_pane(&self) -> PaneId {
        self.ws.tree().panes()[0]
    }

    /// The single panel a freshly built fixture starts with.
    pub fn seed_panel(&self) -> PanelId {
        self.ws.focused_panel().expect("seed panel focused")
    }

    pub fn tab_of(&self, panel: PanelId) -> TabId {
        self.ws.tab_of_panel(panel).expect("panel has a tab")
    }
}

pub fn workspace() -> Fixture {
    workspace_with(Config::default())
}

pub fn workspace_with(config: Config) -> Fixture {
    let factory = HeadlessFactory::new();
    let probes = factory.probes_handle();
    let ws = Workspace::new(config, MemorySplitTree::new(), Box::new(factory));
    Fixture { ws, probes }
}

/// Fixture whose terminals all report `directory` as their working
/// directory, as if their shells had cd'd there.
pub fn workspace_in_directory(directory: &str) -> Fixture {
    let mut factory = HeadlessFactory::new();
    factory.set_new_terminal_directory(Some(directory));
    let probes = factory.probes_handle();
    let ws = Workspace::new(Config::default(), MemorySplitTree::new(), Box::new(factory));
    Fixture { ws, probes }
}

/// Fixture whose terminals all report `needs_confirm_close`, as if every
/// shell had a running job.
pub fn confirming_workspace() -> Fixture {
    let mut factory = HeadlessFactory::new();
    factory.set_confirm_new_terminals(true);
    let probes = factory.probes_handle();
    let ws = Workspace::new(Config::default(), MemorySplitTree::new(), Box::new(factory));
    Fixture { ws, probes }
}
