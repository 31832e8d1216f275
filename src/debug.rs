//! Debug utilities: a readable snapshot of the boom operator's state.
//!
//! `boom_report` lists the follow mode, the tracked position and every
//! registered target in ascending priority order (dead targets included, since
//! the listing never sanitizes). `report_boom_state` logs that snapshot every
//! `BoomSettings::report_interval_secs` seconds.
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::boom::{BoomOperator, FollowMode};
use crate::settings::BoomSettings;

/// Render the state of `boom` as a multi-line report.
#[must_use]
pub fn boom_report(boom: &BoomOperator) -> String {
    let now: DateTime<Utc> = Utc::now();
    let mut out = String::new();
    let _ = writeln!(out, "boom operator @ {}", now.format("%Y-%m-%d %H:%M:%S%.3f UTC"));

    let mode = match boom.mode() {
        FollowMode::Following => "following".to_string(),
        FollowMode::Holding(at) => format!("holding at {at}"),
    };
    let _ = writeln!(out, "  mode: {mode}");
    let _ = writeln!(out, "  position: {}", boom.position());

    let mut priorities = Vec::new();
    let mut targets = Vec::new();
    boom.targets().collect_into(Some(&mut priorities), Some(&mut targets));
    if targets.is_empty() {
        out.push_str("  no targets\n");
    }
    for (priority, target) in priorities.iter().zip(&targets) {
        let _ = writeln!(out, "  [{priority:>4}] {target:?}");
    }
    out
}

/// Log `boom_report` on an interval. Disabled while the interval is zero.
#[allow(clippy::needless_pass_by_value)]
pub fn report_boom_state(
    booms: Query<&BoomOperator>,
    settings: Res<BoomSettings>,
    time: Res<Time>,
    mut since_last: Local<f32>,
) {
    if settings.report_interval_secs <= 0.0 {
        return;
    }
    *since_last += time.delta_seconds();
    if *since_last < settings.report_interval_secs {
        return;
    }
    *since_last = 0.0;

    for boom in &booms {
        info!("{}", boom_report(boom));
    }
}
