//! Overall project status blended from three classifier tiers.

use crate::config::{Metric, ThresholdTable};
use crate::metrics::{CostAnalysis, PocVelocity};
use crate::scoring::{classify_tier, StatusTier};

/// Average the 1-4 scores of the CM2, committed-ratio and maturity-adjusted
/// velocity tiers and map the result back onto a tier.
pub fn blend_status(cm2: StatusTier, committed: StatusTier, velocity: StatusTier) -> StatusTier {
    let total = u32::from(cm2.score()) + u32::from(committed.score()) + u32::from(velocity.score());
    let average = f64::from(total) / 3.0;
    if average >= 3.5 {
        StatusTier::Excellent
    } else if average >= 2.5 {
        StatusTier::Good
    } else if average >= 1.5 {
        StatusTier::Warning
    } else {
        StatusTier::Critical
    }
}

/// Tiers that feed the blended status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInputs {
    pub cm2: StatusTier,
    pub committed: StatusTier,
    pub velocity: StatusTier,
}

impl StatusInputs {
    pub fn classify(costs: &CostAnalysis, velocity: &PocVelocity, thresholds: &ThresholdTable) -> Self {
        let tier = |metric: Metric, value: f64| classify_tier(value, thresholds.band(metric), metric.polarity());
        Self {
            cm2: tier(Metric::Cm2Margin, costs.current_cm2_pct()),
            committed: tier(Metric::CommittedVsBudget, costs.committed_ratio),
            velocity: velocity.adjusted_status,
        }
    }

    pub fn overall(&self) -> StatusTier {
        blend_status(self.cm2, self.committed, self.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::analyze_velocity;
    use crate::metrics::cost::{MarginFigures, MarginSnapshots};

    #[test]
    fn test_blend_thresholds() {
        use StatusTier::*;
        // 4 + 4 + 3 = 11 -> 3.67
        assert_eq!(blend_status(Excellent, Excellent, Good), Excellent);
        // 4 + 3 + 3 = 10 -> 3.33
        assert_eq!(blend_status(Excellent, Good, Good), Good);
        // 3 + 2 + 2 = 7 -> 2.33
        assert_eq!(blend_status(Good, Warning, Warning), Warning);
        // 2 + 1 + 1 = 4 -> 1.33
        assert_eq!(blend_status(Warning, Critical, Critical), Critical);
    }

    #[test]
    fn test_classify_uses_reverse_committed_and_adjusted_velocity() {
        let table = ThresholdTable::default();
        let costs = CostAnalysis {
            margins: MarginSnapshots {
                fct_n: MarginFigures {
                    cm2_pct: 16.0,
                    ..Default::default()
                },
                ..Default::default()
            },
            committed_ratio: 0.85,
            ..Default::default()
        };
        // late-stage project: raw Critical, adjusted Excellent
        let velocity = analyze_velocity(96.0, 94.5, &table);

        let inputs = StatusInputs::classify(&costs, &velocity, &table);
        assert_eq!(inputs.cm2, StatusTier::Excellent);
        assert_eq!(inputs.committed, StatusTier::Excellent);
        assert_eq!(inputs.velocity, StatusTier::Excellent);
        assert_eq!(inputs.overall(), StatusTier::Excellent);
    }
}
