//! Stint boundary resolution.
//!
//! Reconstructs tire stints from raw laps using an ordered chain of
//! strategies of decreasing data fidelity:
//!
//! 1. Declared - group laps under source-declared stint records, matching by
//!    stint number, then by lap range, then by an even positional split
//! 2. Segmented - split the valid-lap sequence wherever one lap improves on
//!    the previous by more than a threshold, the pace gain that follows a
//!    tire change
//! 3. Single stint - all valid laps as one group
//!
//! The first strategy to produce at least one group wins; identical input
//! always selects the same strategy.

use std::fmt;

use thiserror::Error;

use crate::record::{Lap, StintRecord};
use crate::types::ResolutionTier;

/// Configuration for stint resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Lap-over-lap improvement, in seconds, treated as evidence of a tire
    /// change. Default: 3.0.
    pub improvement_threshold: f64,

    /// Whether to attempt pace-based segmentation before collapsing to a
    /// single stint when no stint records are usable.
    pub infer_segments: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            improvement_threshold: 3.0,
            infer_segments: true,
        }
    }
}

/// How a resolved group is labeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StintLabel {
    /// Authoritative compound name from a stint record.
    Compound(String),
    /// Synthetic 1-indexed label for a segment inferred from timing.
    Ordinal(u32),
    /// The grouping exists but nothing is known about the tires.
    Unknown,
}

impl fmt::Display for StintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compound(name) => f.write_str(name),
            Self::Ordinal(position) => write!(f, "Stint {position}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// One group of laps attributed to a single set of tires.
///
/// Declared groups may also hold invalid (untimed) laps; they widen the lap
/// range but never enter any statistic.
#[derive(Debug, Clone)]
pub struct LapGroup {
    pub label: StintLabel,
    /// Start of the declared lap range, when a stint record carried one.
    pub declared_start: Option<u32>,
    /// End of the declared lap range, when a stint record carried one.
    pub declared_end: Option<u32>,
    pub laps: Vec<Lap>,
}

/// The outcome of stint resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Which strategy produced the groups.
    pub tier: ResolutionTier,
    /// Chronological stint groups, each holding at least one valid lap.
    pub groups: Vec<LapGroup>,
    /// Set when the declared strategy fell back to the positional split,
    /// which can misattribute laps near stint boundaries.
    pub positional: bool,
}

/// Terminal resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Not a single lap carried a usable time.
    #[error("no valid lap data")]
    NoValidLaps,
}

/// Resolve laps into stint groups.
///
/// Tries each strategy in order and stops at the first one that yields
/// groups. Segmentation is skipped when `config.infer_segments` is false.
///
/// # Errors
///
/// Returns [`ResolveError::NoValidLaps`] when no lap has a positive duration.
/// Callers must treat that as terminal, not as an empty result.
pub fn resolve(
    laps: &[Lap],
    stints: &[StintRecord],
    config: &ResolverConfig,
) -> Result<Resolution, ResolveError> {
    if !laps.iter().any(Lap::is_valid) {
        return Err(ResolveError::NoValidLaps);
    }

    if let Some((groups, positional)) = declared_groups(laps, stints) {
        tracing::debug!(
            groups = groups.len(),
            positional,
            "resolved stints from declared records"
        );
        return Ok(Resolution {
            tier: ResolutionTier::Declared,
            groups,
            positional,
        });
    }

    let segmented = if config.infer_segments {
        segmented_groups(laps, config.improvement_threshold)
    } else {
        None
    };
    if let Some(groups) = segmented {
        tracing::debug!(groups = groups.len(), "estimated stints from lap-time pattern");
        return Ok(Resolution {
            tier: ResolutionTier::Segmented,
            groups,
            positional: false,
        });
    }

    tracing::debug!("collapsed to a single stint");
    Ok(Resolution {
        tier: ResolutionTier::SingleStint,
        groups: vec![single_group(laps)],
        positional: false,
    })
}

/// Strategy 1: group laps under source-declared stint records.
///
/// Each record is matched by stint number, then by declared lap range, then
/// by the positional split. A record yields a group only when it matched at
/// least one valid lap; records that match nothing usable are skipped rather
/// than emitted as empty stints. Returns `None` when no record yields a
/// group, and a flag telling whether the positional split was used.
fn declared_groups(laps: &[Lap], stints: &[StintRecord]) -> Option<(Vec<LapGroup>, bool)> {
    if stints.is_empty() {
        return None;
    }

    let mut groups = Vec::new();
    let mut positional = false;

    for (index, record) in stints.iter().enumerate() {
        let (matched, by_position) = if let Some(matched) = match_by_stint_number(laps, record) {
            (matched, false)
        } else if let Some(matched) = match_by_lap_range(laps, record) {
            (matched, false)
        } else {
            (positional_slice(laps, index, stints.len()), true)
        };

        if !matched.iter().any(Lap::is_valid) {
            continue;
        }
        positional |= by_position;

        let label = record
            .compound
            .clone()
            .map_or(StintLabel::Unknown, StintLabel::Compound);
        groups.push(LapGroup {
            label,
            declared_start: record.lap_start,
            declared_end: record.lap_end,
            laps: matched,
        });
    }

    if groups.is_empty() {
        None
    } else {
        Some((groups, positional))
    }
}

/// Laps carrying the record's stint number.
fn match_by_stint_number(laps: &[Lap], record: &StintRecord) -> Option<Vec<Lap>> {
    let number = record.stint_number?;
    let matched: Vec<Lap> = laps
        .iter()
        .filter(|lap| lap.stint_number == Some(number))
        .cloned()
        .collect();
    if matched.is_empty() { None } else { Some(matched) }
}

/// Laps whose numbers fall inside the record's declared range.
fn match_by_lap_range(laps: &[Lap], record: &StintRecord) -> Option<Vec<Lap>> {
    let start = record.lap_start?;
    let end = record.lap_end?;
    let matched: Vec<Lap> = laps
        .iter()
        .filter(|lap| lap.lap_number.is_some_and(|number| (start..=end).contains(&number)))
        .cloned()
        .collect();
    if matched.is_empty() { None } else { Some(matched) }
}

/// Last resort: an even split of the whole lap list across the declared
/// stint count. Coarse by construction, laps near boundaries can land in the
/// wrong stint. The final slice absorbs the division remainder so no lap is
/// dropped; with more declared stints than laps every slice is empty and the
/// caller falls through to the lower strategies.
fn positional_slice(laps: &[Lap], index: usize, total: usize) -> Vec<Lap> {
    let per_stint = laps.len() / total;
    if per_stint == 0 {
        return Vec::new();
    }
    let start = index * per_stint;
    let end = if index + 1 == total {
        laps.len()
    } else {
        start + per_stint
    };
    laps[start..end].to_vec()
}

/// Strategy 2: estimate boundaries from the lap times themselves.
///
/// A lap that improves on the previous one by more than `threshold` seconds
/// marks the first lap of a new stint: fresh tires gain several seconds at
/// once, while normal lap-to-lap variation stays well under the threshold.
/// Slowdowns of any size never split.
///
/// Yields nothing when fewer than three valid laps exist or when no boundary
/// is found, so the caller can fall through to the single-stint strategy.
fn segmented_groups(laps: &[Lap], threshold: f64) -> Option<Vec<LapGroup>> {
    let valid: Vec<Lap> = laps.iter().filter(|lap| lap.is_valid()).cloned().collect();
    if valid.len() < 3 {
        return None;
    }

    let mut segments: Vec<Vec<Lap>> = Vec::new();
    let mut current: Vec<Lap> = Vec::new();
    let mut previous_time: Option<f64> = None;

    for lap in valid {
        let Some(time) = lap.valid_time() else {
            continue;
        };
        if previous_time.is_some_and(|previous| previous - time > threshold) {
            segments.push(std::mem::take(&mut current));
        }
        current.push(lap);
        previous_time = Some(time);
    }
    if !current.is_empty() {
        segments.push(current);
    }

    if segments.len() < 2 {
        return None;
    }

    Some(
        (1u32..)
            .zip(segments)
            .map(|(position, laps)| LapGroup {
                label: StintLabel::Ordinal(position),
                declared_start: None,
                declared_end: None,
                laps,
            })
            .collect(),
    )
}

/// Strategy 3: every valid lap as one stint.
fn single_group(laps: &[Lap]) -> LapGroup {
    LapGroup {
        label: StintLabel::Unknown,
        declared_start: None,
        declared_end: None,
        laps: laps.iter().filter(|lap| lap.is_valid()).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(number: u32, duration: f64) -> Lap {
        Lap {
            lap_number: Some(number),
            lap_duration: Some(duration),
            stint_number: None,
        }
    }

    fn lap_in_stint(number: u32, duration: f64, stint: u32) -> Lap {
        Lap {
            lap_number: Some(number),
            lap_duration: Some(duration),
            stint_number: Some(stint),
        }
    }

    fn untimed_lap(number: u32) -> Lap {
        Lap {
            lap_number: Some(number),
            lap_duration: None,
            stint_number: None,
        }
    }

    fn record(compound: &str) -> StintRecord {
        StintRecord {
            stint_number: None,
            compound: Some(compound.to_string()),
            lap_start: None,
            lap_end: None,
        }
    }

    fn record_with_number(compound: &str, stint: u32) -> StintRecord {
        StintRecord {
            stint_number: Some(stint),
            ..record(compound)
        }
    }

    fn record_with_range(compound: &str, start: u32, end: u32) -> StintRecord {
        StintRecord {
            lap_start: Some(start),
            lap_end: Some(end),
            ..record(compound)
        }
    }

    fn valid_lap_count(resolution: &Resolution) -> usize {
        resolution
            .groups
            .iter()
            .map(|group| group.laps.iter().filter(|lap| lap.is_valid()).count())
            .sum()
    }

    #[test]
    fn no_valid_laps_is_terminal() {
        let laps = vec![
            untimed_lap(1),
            Lap {
                lap_number: Some(2),
                lap_duration: Some(0.0),
                stint_number: None,
            },
        ];
        let result = resolve(&laps, &[], &ResolverConfig::default());
        assert_eq!(result.unwrap_err(), ResolveError::NoValidLaps);
    }

    #[test]
    fn declared_stints_match_by_stint_number() {
        let laps = vec![
            lap_in_stint(1, 95.0, 1),
            lap_in_stint(2, 95.1, 1),
            lap_in_stint(3, 95.2, 1),
            lap_in_stint(4, 91.0, 2),
            lap_in_stint(5, 91.1, 2),
        ];
        let stints = vec![
            record_with_number("MEDIUM", 1),
            record_with_number("SOFT", 2),
        ];

        let resolution = resolve(&laps, &stints, &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::Declared);
        assert!(!resolution.positional);
        assert_eq!(resolution.groups.len(), 2);
        assert_eq!(
            resolution.groups[0].label,
            StintLabel::Compound("MEDIUM".to_string())
        );
        assert_eq!(resolution.groups[0].laps.len(), 3);
        assert_eq!(resolution.groups[1].laps.len(), 2);
        assert_eq!(valid_lap_count(&resolution), 5);
    }

    #[test]
    fn declared_stints_fall_back_to_lap_ranges() {
        // Laps carry no stint numbers, so range matching must kick in.
        let laps: Vec<Lap> = (1..=10).map(|number| lap(number, 94.0)).collect();
        let stints = vec![
            record_with_range("HARD", 1, 6),
            record_with_range("SOFT", 7, 10),
        ];

        let resolution = resolve(&laps, &stints, &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::Declared);
        assert!(!resolution.positional);
        assert_eq!(resolution.groups.len(), 2);
        assert_eq!(resolution.groups[0].laps.len(), 6);
        assert_eq!(resolution.groups[1].laps.len(), 4);
    }

    #[test]
    fn declared_stints_fall_back_to_positional_split() {
        // No stint numbers anywhere and no declared ranges: the even split is
        // all that is left, and it must be flagged.
        let laps: Vec<Lap> = (1..=7).map(|number| lap(number, 93.0)).collect();
        let stints = vec![record("MEDIUM"), record("HARD")];

        let resolution = resolve(&laps, &stints, &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::Declared);
        assert!(resolution.positional);
        assert_eq!(resolution.groups.len(), 2);
        // 7 laps over 2 stints: 3 + the remainder-absorbing 4.
        assert_eq!(resolution.groups[0].laps.len(), 3);
        assert_eq!(resolution.groups[1].laps.len(), 4);
        assert_eq!(valid_lap_count(&resolution), 7);
    }

    #[test]
    fn record_matching_no_valid_laps_is_skipped() {
        let mut laps = vec![
            lap_in_stint(1, 95.0, 1),
            lap_in_stint(2, 95.1, 1),
        ];
        // Stint 2 exists in the declarations but every one of its laps is
        // untimed, so it must not become an empty group.
        laps.push(Lap {
            lap_number: Some(3),
            lap_duration: None,
            stint_number: Some(2),
        });
        let stints = vec![
            record_with_number("MEDIUM", 1),
            record_with_number("SOFT", 2),
        ];

        let resolution = resolve(&laps, &stints, &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::Declared);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(
            resolution.groups[0].label,
            StintLabel::Compound("MEDIUM".to_string())
        );
    }

    #[test]
    fn more_declared_stints_than_laps_falls_through() {
        // Positional split has nothing to hand out, and two valid laps are
        // not enough to segment, so everything collapses to a single stint.
        let laps = vec![lap(1, 92.0), lap(2, 92.3)];
        let stints = vec![record("SOFT"), record("MEDIUM"), record("HARD")];

        let resolution = resolve(&laps, &stints, &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::SingleStint);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.groups[0].laps.len(), 2);
    }

    #[test]
    fn segmentation_splits_on_sharp_improvement() {
        // 20 valid laps with a single sharp gain between indices 9 and 10.
        let mut laps = Vec::new();
        for number in 1..=10 {
            laps.push(lap(number, 95.0 + 0.1 * f64::from(number)));
        }
        for number in 11..=20 {
            laps.push(lap(number, 91.5 + 0.1 * f64::from(number - 10)));
        }

        let resolution = resolve(&laps, &[], &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::Segmented);
        assert_eq!(resolution.groups.len(), 2);
        assert_eq!(resolution.groups[0].label, StintLabel::Ordinal(1));
        assert_eq!(resolution.groups[1].label, StintLabel::Ordinal(2));
        assert_eq!(resolution.groups[0].laps.len(), 10);
        assert_eq!(resolution.groups[1].laps.len(), 10);
        assert_eq!(resolution.groups[1].laps[0].lap_number, Some(11));
        assert_eq!(valid_lap_count(&resolution), 20);
    }

    #[test]
    fn segmentation_ignores_slowdowns() {
        // A 5s slowdown (pit entry, traffic) must not open a new stint; only
        // improvements do.
        let laps = vec![
            lap(1, 92.0),
            lap(2, 92.1),
            lap(3, 97.5),
            lap(4, 95.0),
            lap(5, 94.8),
        ];

        let resolution = resolve(&laps, &[], &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::SingleStint);
        assert_eq!(resolution.groups.len(), 1);
    }

    #[test]
    fn segmentation_collapses_without_a_boundary() {
        let laps: Vec<Lap> = (1..=20)
            .map(|number| lap(number, 94.0 + 0.05 * f64::from(number)))
            .collect();

        let resolution = resolve(&laps, &[], &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::SingleStint);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.groups[0].label, StintLabel::Unknown);
        assert_eq!(valid_lap_count(&resolution), 20);
    }

    #[test]
    fn segmentation_needs_three_valid_laps() {
        // Two valid laps with a large gap between them still form one stint.
        let laps = vec![lap(1, 99.0), lap(2, 90.0)];

        let resolution = resolve(&laps, &[], &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::SingleStint);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.groups[0].laps.len(), 2);
    }

    #[test]
    fn segmentation_skips_invalid_laps() {
        // Untimed laps sit between the stints; they are excluded and must
        // not break the boundary detection or the lap accounting.
        let laps = vec![
            lap(1, 95.0),
            lap(2, 95.2),
            lap(3, 95.4),
            untimed_lap(4),
            lap(5, 91.0),
            lap(6, 91.2),
            lap(7, 91.4),
        ];

        let resolution = resolve(&laps, &[], &ResolverConfig::default()).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::Segmented);
        assert_eq!(resolution.groups.len(), 2);
        assert_eq!(valid_lap_count(&resolution), 6);
    }

    #[test]
    fn infer_segments_false_collapses_directly() {
        let mut laps: Vec<Lap> = (1..=10).map(|number| lap(number, 95.0)).collect();
        laps.extend((11..=20).map(|number| lap(number, 90.0)));

        let config = ResolverConfig {
            infer_segments: false,
            ..ResolverConfig::default()
        };
        let resolution = resolve(&laps, &[], &config).unwrap();
        assert_eq!(resolution.tier, ResolutionTier::SingleStint);
        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.groups[0].laps.len(), 20);
    }

    #[test]
    fn tier_selection_is_deterministic() {
        let laps: Vec<Lap> = (1..=12).map(|number| lap(number, 93.0)).collect();
        let stints = vec![record_with_range("MEDIUM", 1, 12)];
        let config = ResolverConfig::default();

        let first = resolve(&laps, &stints, &config).unwrap();
        let second = resolve(&laps, &stints, &config).unwrap();
        assert_eq!(first.tier, second.tier);
        assert_eq!(first.groups.len(), second.groups.len());
    }

    #[test]
    fn custom_threshold_changes_the_boundary() {
        let laps = vec![
            lap(1, 94.0),
            lap(2, 94.1),
            lap(3, 92.0),
            lap(4, 92.1),
            lap(5, 92.2),
        ];

        // The 2.1s gain is below the default threshold...
        let default_resolution = resolve(&laps, &[], &ResolverConfig::default()).unwrap();
        assert_eq!(default_resolution.tier, ResolutionTier::SingleStint);

        // ...but splits once the threshold drops under it.
        let config = ResolverConfig {
            improvement_threshold: 2.0,
            ..ResolverConfig::default()
        };
        let tight = resolve(&laps, &[], &config).unwrap();
        assert_eq!(tight.tier, ResolutionTier::Segmented);
        assert_eq!(tight.groups.len(), 2);
    }
}
