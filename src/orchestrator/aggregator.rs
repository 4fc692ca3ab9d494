//! Reduce per-probe outcomes to one overall score and status.

use std::collections::BTreeMap;

use super::types::ScanStatus;
use crate::probes::scoring::clamp_score;
use crate::probes::{ProbeName, ProbeResult};

/// Unweighted rounded mean of completed scores.
///
/// Failed probes are left out of the denominator. With no completed probe
/// the scan has no score and is `Failed`; otherwise it is `Completed`, even
/// when some probes failed.
#[must_use]
pub fn aggregate(per_probe: &BTreeMap<ProbeName, ProbeResult>) -> (Option<u8>, ScanStatus) {
    let scores: Vec<u8> = per_probe.values().filter_map(ProbeResult::score).collect();
    if scores.is_empty() {
        return (None, ScanStatus::Failed);
    }

    let sum: u32 = scores.iter().map(|s| u32::from(*s)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(sum) / scores.len() as f64;
    (Some(clamp_score(mean)), ScanStatus::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeReport;
    use proptest::prelude::*;

    fn ok(score: u8) -> ProbeResult {
        ProbeResult::Completed(ProbeReport::new(score, Vec::new()))
    }

    #[test]
    fn test_failed_probes_are_excluded() {
        let per_probe = BTreeMap::from([
            (ProbeName::Performance, ok(80)),
            (ProbeName::Seo, ok(60)),
            (ProbeName::Security, ProbeResult::failed("inspection crashed")),
        ]);
        assert_eq!(aggregate(&per_probe), (Some(70), ScanStatus::Completed));
    }

    #[test]
    fn test_no_completed_probe_fails_scan() {
        let per_probe = BTreeMap::from([
            (ProbeName::Performance, ProbeResult::failed("timeout")),
            (ProbeName::Uptime, ProbeResult::failed("panic")),
        ]);
        assert_eq!(aggregate(&per_probe), (None, ScanStatus::Failed));
        assert_eq!(aggregate(&BTreeMap::new()), (None, ScanStatus::Failed));
    }

    #[test]
    fn test_mean_rounds_half_up() {
        let per_probe = BTreeMap::from([(ProbeName::Seo, ok(70)), (ProbeName::Uptime, ok(100))]);
        assert_eq!(aggregate(&per_probe), (Some(85), ScanStatus::Completed));

        let per_probe = BTreeMap::from([(ProbeName::Seo, ok(70)), (ProbeName::Uptime, ok(71))]);
        assert_eq!(aggregate(&per_probe), (Some(71), ScanStatus::Completed));
    }

    proptest! {
        #[test]
        fn aggregate_matches_rounded_mean(
            outcomes in proptest::collection::vec(proptest::option::of(0u8..=100), 6)
        ) {
            let per_probe: BTreeMap<_, _> = ProbeName::all()
                .into_iter()
                .zip(outcomes.iter())
                .map(|(name, outcome)| {
                    (name, outcome.map_or_else(|| ProbeResult::failed("err"), ok))
                })
                .collect();

            let completed: Vec<f64> = outcomes.iter().flatten().map(|s| f64::from(*s)).collect();
            let (score, status) = aggregate(&per_probe);
            if completed.is_empty() {
                prop_assert_eq!(score, None);
                prop_assert_eq!(status, ScanStatus::Failed);
            } else {
                let mean = completed.iter().sum::<f64>() / completed.len() as f64;
                prop_assert_eq!(score, Some(mean.round() as u8));
                prop_assert_eq!(status, ScanStatus::Completed);
            }
        }
    }
}
