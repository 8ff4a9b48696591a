//! Tuning constants shared by the workspace core and hosts.
//!
//! These are the defaults baked into [`crate::Config`]; hosts override them
//! through the config file rather than editing this module.

/// Grace window, in milliseconds, before a manually-marked unread badge may
/// be cleared by refocusing the same panel. Keeps a fresh flash visible long
/// enough to catch the user's eye.
pub const DEFAULT_UNREAD_CLEAR_GRACE_MS: u64 = 750;

/// Number of scheduler turns across which focus is re-asserted onto the
/// previously focused panel after a non-focusing split. The external layout
/// controller may emit a delayed, unwanted focus change to the new pane for
/// a turn or two after the split commits.
pub const DEFAULT_FOCUS_REASSERT_TURNS: u8 = 3;

/// Iteration bound for the queue-and-drain loops that serialize rapid
/// repeated selection requests and controller event bursts. Exceeding the
/// cap is logged as an anomaly; no legitimate sequence is known to need
/// more than one or two iterations.
pub const DEFAULT_SELECTION_DRAIN_CAP: u8 = 8;

/// Tolerance, in points, between a panel's stored font-size lineage root and
/// its live runtime font size. A larger disagreement is treated as a manual
/// zoom that re-roots the lineage for descendant panels.
pub const DEFAULT_FONT_ROOT_TOLERANCE: f32 = 0.5;

/// Fallback terminal font size when no lineage, live value, or remembered
/// global value is available.
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

/// Placeholder title used when a panel has neither a custom title nor a
/// non-empty live title.
pub const FALLBACK_TAB_TITLE: &str = "Tab";
