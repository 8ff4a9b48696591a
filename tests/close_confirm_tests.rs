//! Close policy and the confirmation protocol, for tabs and whole panes.

mod common;

use common::{confirming_workspace, workspace};
use muxspace::{CloseConfirmRequest, SplitDirection, SplitTree};

#[test]
fn a_gesture_burst_yields_one_prompt() {
    let mut f = confirming_workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    f.ws.tree_mut().user_close_tab(tab);
    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();

    let prompts = f.ws.take_close_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(matches!(
        prompts[0],
        CloseConfirmRequest::Tab { tab: t, panel: p, .. } if t == tab && p == panel
    ));
    // Nothing closed while the dialog is up
    assert_eq!(f.ws.panel_count(), 1);
    assert_eq!(f.probe(0).close_count(), 0);
}

#[test]
fn confirming_the_dialog_closes_the_surface() {
    let mut f = confirming_workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();
    assert_eq!(f.ws.take_close_prompts().len(), 1);

    f.ws.resolve_close_confirmation(tab, true);

    assert_eq!(f.probe(0).close_count(), 1);
    // Never-empty: a replacement took its place
    assert_eq!(f.ws.panel_count(), 1);
    assert_eq!(f.probe_count(), 2);
    assert_ne!(f.ws.focused_panel(), Some(panel));
}

#[test]
fn declining_the_dialog_keeps_the_surface() {
    let mut f = confirming_workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();
    f.ws.take_close_prompts();

    f.ws.resolve_close_confirmation(tab, false);
    assert_eq!(f.ws.panel_count(), 1);
    assert_eq!(f.probe(0).close_count(), 0);

    // The next gesture prompts again
    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();
    assert_eq!(f.ws.take_close_prompts().len(), 1);
}

#[test]
fn pinned_surfaces_resist_close_gestures() {
    let mut f = workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);
    f.ws.pin_panel(panel);

    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();

    assert_eq!(f.ws.panel_count(), 1);
    assert_eq!(f.ws.focused_panel(), Some(panel));
    assert!(f.ws.take_close_prompts().is_empty());
}

#[test]
fn confirmation_after_the_tab_is_gone_is_a_noop() {
    let mut f = confirming_workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    f.ws.tree_mut().user_close_tab(tab);
    f.ws.pump_events();
    f.ws.take_close_prompts();

    // The surface goes away through another path while the dialog is up
    f.ws.close_panel(panel, true).expect("forced close");
    assert_eq!(f.probe(0).close_count(), 1);
    assert_eq!(f.probe_count(), 2);

    f.ws.resolve_close_confirmation(tab, true);
    assert_eq!(f.probe(0).close_count(), 1);
    assert_eq!(f.ws.panel_count(), 1);
}

#[test]
fn pane_close_prompts_and_tears_down_the_snapshot() {
    let mut f = confirming_workspace();
    let seed = f.seed_panel();
    let second =
        f.ws.new_terminal_split(SplitDirection::Vertical, true)
            .expect("split filled");
    let second_pane = f.ws.tree().panes()[1];

    f.ws.tree_mut().user_close_pane(second_pane);
    f.ws.pump_events();

    let prompts = f.ws.take_close_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(matches!(
        &prompts[0],
        CloseConfirmRequest::Pane { pane, panels } if *pane == second_pane && panels == &vec![second]
    ));

    f.ws.resolve_pane_close_confirmation(second_pane, true);
    f.ws.run_scheduled_pass();

    assert_eq!(f.ws.tree().panes().len(), 1);
    assert_eq!(f.ws.panel_count(), 1);
    assert_eq!(f.probe(1).close_count(), 1);
    assert_eq!(f.ws.focused_panel(), Some(seed));
}

#[test]
fn the_last_pane_resists_close() {
    let mut f = workspace();
    let panel = f.seed_panel();
    let pane = f.root_pane();

    f.ws.tree_mut().user_close_pane(pane);
    f.ws.pump_events();
    f.ws.run_scheduled_pass();

    assert_eq!(f.ws.tree().panes().len(), 1);
    assert_eq!(f.ws.panel_count(), 1);
    assert_eq!(f.ws.focused_panel(), Some(panel));
    assert!(f.ws.take_close_prompts().is_empty());
}

#[test]
fn a_pane_holding_a_pinned_surface_resists_close() {
    let mut f = workspace();
    let second =
        f.ws.new_terminal_split(SplitDirection::Vertical, true)
            .expect("split filled");
    let second_pane = f.ws.tree().panes()[1];
    f.ws.pin_panel(second);

    f.ws.tree_mut().user_close_pane(second_pane);
    f.ws.pump_events();

    assert_eq!(f.ws.tree().panes().len(), 2);
    assert_eq!(f.ws.panel_count(), 2);
    assert!(f.ws.take_close_prompts().is_empty());
}
