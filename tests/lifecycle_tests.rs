//! Workspace construction, the never-empty guarantee, and surface creation.

mod common;

use common::{workspace, workspace_with};
use muxspace::split::{NewTabKind, TabContextAction};
use muxspace::{PanelKind, SplitDirection, SplitTree};
use muxspace_config::Config;

#[test]
fn new_workspace_seeds_one_focused_terminal() {
    let f = workspace();

    assert_eq!(f.ws.panel_count(), 1);
    let panel = f.seed_panel();
    assert_eq!(f.ws.panel_of_tab(f.tab_of(panel)), Some(panel));

    let probe = f.probe(0);
    assert!(probe.is_focused());
    assert!(probe.focus_count() >= 1);
    assert_eq!(probe.close_count(), 0);
}

#[test]
fn closing_the_sole_surface_spawns_a_replacement() {
    let mut f = workspace();
    let original = f.seed_panel();
    let tab = f.tab_of(original);

    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();

    assert_eq!(f.ws.panel_count(), 1);
    let replacement = f.ws.focused_panel().expect("replacement focused");
    assert_ne!(replacement, original);
    assert_eq!(f.probe(0).close_count(), 1);
    assert_eq!(f.probe_count(), 2);
    assert!(f.probe(1).is_focused());
}

#[test]
fn surface_limit_refuses_further_spawns() {
    let mut f = workspace_with(Config {
        max_surfaces: 2,
        ..Default::default()
    });

    assert!(f.ws.new_terminal_surface(None).is_some());
    assert_eq!(f.ws.panel_count(), 2);
    assert!(f.ws.new_terminal_surface(None).is_none());
    assert_eq!(f.ws.panel_count(), 2);
}

#[test]
fn new_tab_affordance_spawns_the_requested_kind() {
    let mut f = workspace();
    let pane = f.root_pane();

    f.ws.tree_mut().user_request_new_tab(NewTabKind::Browser, pane);
    f.ws.pump_events();

    assert_eq!(f.ws.panel_count(), 2);
    let new_tab = f.ws.tree().tabs_in_pane(pane)[1];
    let panel = f.ws.panel_of_tab(new_tab).expect("mapped");
    let entry = f.ws.registry().get(panel).expect("registered");
    assert_eq!(entry.panel.kind(), PanelKind::Browser);
}

#[test]
fn rename_overrides_title_and_updates_the_tab() {
    let mut f = workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    f.ws.rename_panel(panel, Some("build watcher".into()));
    assert_eq!(f.ws.resolved_title(panel), "build watcher");
    let display = f.ws.tree().tab_display(tab).expect("display pushed");
    assert_eq!(display.title, "build watcher");

    // Clearing the custom title falls back to the placeholder: the
    // headless engine reports an empty live title.
    f.ws.rename_panel(panel, None);
    assert_eq!(f.ws.resolved_title(panel), "Tab");
}

#[test]
fn snapshot_captures_the_arrangement() {
    let mut f = workspace();
    let terminal = f.seed_panel();
    let browser =
        f.ws.new_browser_surface(Some("https://example.com"), None)
            .expect("browser spawned");

    let snapshot = f.ws.capture_snapshot();
    assert_eq!(snapshot.workspace, f.ws.id());
    assert_eq!(snapshot.panes.len(), 1);
    let pane = &snapshot.panes[0];
    assert!(pane.focused);
    assert_eq!(pane.surfaces.len(), 2);

    assert_eq!(pane.surfaces[0].panel, terminal);
    assert_eq!(pane.surfaces[0].kind, PanelKind::Terminal);
    assert_eq!(pane.surfaces[1].panel, browser);
    assert_eq!(pane.surfaces[1].kind, PanelKind::Browser);
    assert_eq!(
        pane.surfaces[1].url.as_deref(),
        Some("https://example.com")
    );
    // The browser was spawned selected
    assert!(pane.surfaces[1].selected);
    assert!(!pane.surfaces[0].selected);
}

#[test]
fn drag_splitting_the_only_tab_repairs_the_placeholder() {
    let mut f = workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    let created =
        f.ws.tree_mut()
            .user_split_drag(tab, SplitDirection::Horizontal)
            .expect("split");
    f.ws.pump_events();

    // The controller backfilled the drained source pane with a placeholder
    // tab; it now hosts a fresh terminal instead of rendering empty.
    let source = f.root_pane();
    let source_tabs = f.ws.tree().tabs_in_pane(source);
    assert_eq!(source_tabs.len(), 1);
    let repaired = f.ws.panel_of_tab(source_tabs[0]).expect("mapped");
    assert_ne!(repaired, panel);

    assert_eq!(f.ws.panel_count(), 2);
    assert_eq!(
        f.ws.panel_of_tab(f.ws.tree().tabs_in_pane(created)[0]),
        Some(panel)
    );
    // The dragged surface keeps focus in its new pane
    assert_eq!(f.ws.focused_panel(), Some(panel));
}

#[test]
fn context_menu_rename_and_close_to_the_right() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    let p2 = f.ws.new_terminal_surface(None).expect("second");
    let p3 = f.ws.new_terminal_surface(None).expect("third");
    let t1 = f.tab_of(p1);

    f.ws.tree_mut()
        .user_context_action(TabContextAction::Rename(Some("logs".into())), t1);
    f.ws.pump_events();
    assert_eq!(f.ws.resolved_title(p1), "logs");

    f.ws.tree_mut()
        .user_context_action(TabContextAction::CloseToTheRight, t1);
    f.ws.pump_events();

    assert_eq!(f.ws.panel_count(), 1);
    assert!(f.ws.tab_of_panel(p2).is_none());
    assert!(f.ws.tab_of_panel(p3).is_none());
    assert_eq!(f.ws.focused_panel(), Some(p1));
}

#[test]
fn new_terminals_inherit_the_lineage_root() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    assert_eq!(
        f.ws.registry().meta(p1).expect("meta").font_root,
        Some(13.0)
    );

    let p2 = f.ws.new_terminal_surface(None).expect("sibling");
    let entry = f.ws.registry().get(p2).expect("registered");
    assert_eq!(entry.panel.content.font_size(), Some(13.0));
    assert_eq!(entry.meta.font_root, Some(13.0));
}

#[test]
fn a_zoomed_terminal_re_roots_font_inheritance() {
    let mut f = workspace();
    let p1 = f.seed_panel();

    // Zoom well past the lineage tolerance, then spawn a sibling
    f.ws.set_panel_font_size(p1, 18.0);
    let p2 = f.ws.new_terminal_surface(None).expect("sibling");

    let entry = f.ws.registry().get(p2).expect("registered");
    assert_eq!(entry.panel.content.font_size(), Some(18.0));
    assert_eq!(entry.meta.font_root, Some(18.0));
    // The zoom became the new root for the source as well
    assert_eq!(
        f.ws.registry().meta(p1).expect("meta").font_root,
        Some(18.0)
    );
}

#[test]
fn snapshot_serializes_for_persistence() -> anyhow::Result<()> {
    let mut f = workspace();
    let panel = f.seed_panel();
    f.ws.rename_panel(panel, Some("deploy".into()));
    f.ws.pin_panel(panel);

    let value = serde_json::to_value(f.ws.capture_snapshot())?;
    let surface = &value["panes"][0]["surfaces"][0];
    assert_eq!(surface["title"], "deploy");
    assert_eq!(surface["custom_title"], "deploy");
    assert_eq!(surface["kind"], "Terminal");
    assert_eq!(surface["pinned"], true);
    assert_eq!(value["panes"][0]["focused"], true);
    Ok(())
}
