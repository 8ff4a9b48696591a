//! Pinned-prefix ordering and the unread badge lifecycle.

mod common;

use common::workspace;
use muxspace::split::TabContextAction;
use muxspace::{FocusTrigger, SplitDirection, SplitTree};
use std::time::{Duration, Instant};

#[test]
fn pinning_moves_surfaces_to_the_front_in_pin_order() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    let p2 = f.ws.new_terminal_surface(None).expect("second");
    let p3 = f.ws.new_terminal_surface(None).expect("third");
    let (t1, t2, t3) = (f.tab_of(p1), f.tab_of(p2), f.tab_of(p3));
    let pane = f.root_pane();

    f.ws.pin_panel(p3);
    assert_eq!(f.ws.tree().tabs_in_pane(pane), vec![t3, t1, t2]);

    f.ws.pin_panel(p2);
    assert_eq!(f.ws.tree().tabs_in_pane(pane), vec![t3, t2, t1]);

    f.ws.unpin_panel(p3);
    assert_eq!(f.ws.tree().tabs_in_pane(pane), vec![t2, t3, t1]);
}

#[test]
fn reordering_cannot_break_the_pinned_prefix() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    let p2 = f.ws.new_terminal_surface(None).expect("second");
    let p3 = f.ws.new_terminal_surface(None).expect("third");
    let (t1, t2, t3) = (f.tab_of(p1), f.tab_of(p2), f.tab_of(p3));
    let pane = f.root_pane();
    f.ws.pin_panel(p1);

    f.ws.reorder_surface(p3, 0).expect("reorder");
    assert_eq!(f.ws.tree().tabs_in_pane(pane), vec![t1, t3, t2]);
}

#[test]
fn close_others_spares_pinned_surfaces() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    let p2 = f.ws.new_terminal_surface(None).expect("second");
    let p3 = f.ws.new_terminal_surface(None).expect("third");
    let t2 = f.tab_of(p2);
    f.ws.pin_panel(p1);

    f.ws.tree_mut().user_select_tab(t2);
    f.ws.pump_events();
    f.ws.tree_mut()
        .user_context_action(TabContextAction::CloseOthers, t2);
    f.ws.pump_events();

    assert_eq!(f.ws.panel_count(), 2);
    assert!(f.ws.tab_of_panel(p1).is_some());
    assert!(f.ws.tab_of_panel(p3).is_none());
    assert_eq!(f.probe(2).close_count(), 1);
    assert_eq!(f.ws.focused_panel(), Some(p2));
}

#[test]
fn moving_into_a_pane_renormalizes_it() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    let p2 =
        f.ws.new_terminal_split(SplitDirection::Vertical, true)
            .expect("split filled");
    let second_pane = f.ws.tree().panes()[1];
    f.ws.pin_panel(p2);

    f.ws.move_surface(p1, second_pane, Some(0)).expect("move");

    let tabs = f.ws.tree().tabs_in_pane(second_pane);
    assert_eq!(tabs[0], f.tab_of(p2));
    assert_eq!(tabs[1], f.tab_of(p1));
    // A moved surface lands selected in its destination
    assert_eq!(f.ws.focused_panel(), Some(p1));
}

#[test]
fn moving_within_the_same_pane_is_a_reorder() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    let p2 = f.ws.new_terminal_surface(None).expect("second");
    let p3 = f.ws.new_terminal_surface(None).expect("third");
    let (t1, t2, t3) = (f.tab_of(p1), f.tab_of(p2), f.tab_of(p3));
    let pane = f.root_pane();
    f.ws.pin_panel(p1);

    // No index: the surface is already where it was asked to go
    f.ws.move_surface(p3, pane, None).expect("same-pane move");
    assert_eq!(f.ws.tree().tabs_in_pane(pane), vec![t1, t2, t3]);

    // With an index it reorders, still behind the pinned prefix
    f.ws.move_surface(p3, pane, Some(0)).expect("same-pane move");
    assert_eq!(f.ws.tree().tabs_in_pane(pane), vec![t1, t3, t2]);
}

#[test]
fn refocusing_after_the_grace_window_flashes_then_clears() {
    let mut f = workspace();
    let panel = f.seed_panel();
    f.ws.mark_unread_at(panel, Instant::now() - Duration::from_millis(800));
    assert!(f.ws.is_unread(panel));

    f.ws.focus_panel(panel, FocusTrigger::Standard);
    // Flash first; the badge clear is deferred to the next pass
    assert_eq!(f.probe(0).flash_count(), 1);
    assert!(f.ws.is_unread(panel));

    f.ws.run_scheduled_pass();
    assert!(!f.ws.is_unread(panel));
    let tab = f.tab_of(panel);
    assert!(!f.ws.tree().tab_display(tab).expect("display").indicator);
}

#[test]
fn refocusing_within_the_grace_window_keeps_the_badge() {
    let mut f = workspace();
    let panel = f.seed_panel();
    f.ws.mark_unread(panel);

    f.ws.focus_panel(panel, FocusTrigger::Standard);
    f.ws.run_scheduled_pass();

    assert!(f.ws.is_unread(panel));
    assert_eq!(f.probe(0).flash_count(), 0);
}

#[test]
fn focusing_a_different_surface_clears_its_badge_immediately() {
    let mut f = workspace();
    let p1 = f.seed_panel();
    f.ws.new_terminal_surface(None).expect("second focused");
    f.ws.mark_unread(p1);

    f.ws.focus_panel(p1, FocusTrigger::Standard);

    assert!(!f.ws.is_unread(p1));
    assert_eq!(f.probe(0).flash_count(), 0);
    let tab = f.tab_of(p1);
    assert!(!f.ws.tree().tab_display(tab).expect("display").indicator);
}

#[test]
fn external_unread_signal_is_independent_of_manual_marks() {
    let mut f = workspace();
    let panel = f.seed_panel();
    let tab = f.tab_of(panel);

    f.ws.set_external_unread(panel, true);
    assert!(f.ws.is_unread(panel));
    assert!(f.ws.tree().tab_display(tab).expect("display").indicator);

    // A manual mark-read does not override the external store's signal
    f.ws.mark_read(panel);
    assert!(f.ws.is_unread(panel));

    f.ws.set_external_unread(panel, false);
    assert!(!f.ws.is_unread(panel));
    assert!(!f.ws.tree().tab_display(tab).expect("display").indicator);
}
