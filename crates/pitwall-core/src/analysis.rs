//! Final analysis assembly.
//!
//! Turns a [`Resolution`] into per-stint scalar summaries and session-level
//! totals. The raw laps are consumed here; nothing downstream ever sees them
//! again.

use serde::{Deserialize, Serialize};

use crate::degradation::degradation_rate;
use crate::record::{Driver, Lap};
use crate::resolve::{LapGroup, Resolution};
use crate::types::{DriverNumber, ResolutionTier, SessionKey};

/// Summary of one resolved stint.
///
/// Holds scalar statistics only. `lap_count`, `avg_lap_time` and
/// `total_time` cover valid laps exclusively; the lap range may be wider
/// when untimed laps belong to the stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStint {
    /// Compound name, synthetic "Stint k" label, or "Unknown".
    pub compound: String,
    pub start_lap: u32,
    pub end_lap: u32,
    /// Number of valid laps in the stint.
    pub lap_count: usize,
    /// Mean lap time over valid laps, in seconds.
    pub avg_lap_time: f64,
    /// Pace lost per lap over the stint, in seconds; negative when pace
    /// improved.
    pub degradation_per_lap: f64,
    /// Sum of valid lap times, in seconds.
    pub total_time: f64,
}

/// The complete tire-strategy analysis for one driver in one session.
///
/// Constructed fresh per request and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StintAnalysis {
    pub driver_name: String,
    pub driver_number: DriverNumber,
    pub session_key: SessionKey,
    /// Chronological stints, first stint first.
    pub stints: Vec<ResolvedStint>,
    /// Pit stops implied by the stint count.
    pub pit_stops: usize,
    /// Which resolution strategy produced the stints.
    pub tier: ResolutionTier,
    /// Confidence caveat for estimated or partial resolutions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Assemble the final analysis from a resolution.
///
/// Groups without a single valid lap are dropped rather than emitted as
/// empty stints; pit stops are one fewer than the stints that remain.
#[must_use]
pub fn build_analysis(
    driver: &Driver,
    session_key: SessionKey,
    driver_number: DriverNumber,
    resolution: Resolution,
) -> StintAnalysis {
    let note = resolution_note(resolution.tier, resolution.positional);
    let stints: Vec<ResolvedStint> = resolution
        .groups
        .into_iter()
        .filter_map(|group| summarize_group(&group))
        .collect();
    let pit_stops = stints.len().saturating_sub(1);

    StintAnalysis {
        driver_name: driver.display_name(),
        driver_number,
        session_key,
        stints,
        pit_stops,
        tier: resolution.tier,
        note,
    }
}

/// Summarize one lap group, or drop it when it holds no valid lap.
#[expect(
    clippy::cast_precision_loss,
    reason = "lap counts are far below 2^52"
)]
fn summarize_group(group: &LapGroup) -> Option<ResolvedStint> {
    let times: Vec<f64> = group.laps.iter().filter_map(Lap::valid_time).collect();
    if times.is_empty() {
        return None;
    }

    let total_time: f64 = times.iter().sum();
    let avg_lap_time = total_time / times.len() as f64;
    let degradation_per_lap = degradation_rate(&times);

    let observed_min = group.laps.iter().filter_map(|lap| lap.lap_number).min();
    let observed_max = group.laps.iter().filter_map(|lap| lap.lap_number).max();
    let start_lap = group.declared_start.or(observed_min).unwrap_or(1);
    let end_lap = group
        .declared_end
        .or(observed_max)
        .unwrap_or_else(|| u32::try_from(times.len()).unwrap_or(u32::MAX))
        .max(start_lap);

    Some(ResolvedStint {
        compound: group.label.to_string(),
        start_lap,
        end_lap,
        lap_count: times.len(),
        avg_lap_time,
        degradation_per_lap,
        total_time,
    })
}

/// Human-readable caveat describing how much trust the result deserves.
fn resolution_note(tier: ResolutionTier, positional: bool) -> Option<String> {
    match tier {
        ResolutionTier::Declared if positional => Some(
            "stint boundaries approximated by position in the lap list; \
             lap attribution near boundaries may be imprecise"
                .to_string(),
        ),
        ResolutionTier::Declared => None,
        ResolutionTier::Segmented => {
            Some("stints estimated from lap-time patterns; compounds unknown".to_string())
        }
        ResolutionTier::SingleStint => {
            Some("stint data unavailable; all valid laps analyzed as one stint".to_string())
        }
    }
}
