//! Executive scorecard: one classified row per project, worst first.

use std::cmp::{Ordering, Reverse};

use serde::Serialize;

use crate::config::{Metric, ThresholdTable};
use crate::project::ProjectRecord;
use crate::risk::SeverityCounts;
use crate::scoring::{classify, project_health_score, Classification, StatusInputs, StatusTier};

/// A metric value next to its traffic-light classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rated {
    pub value: f64,
    pub status: Classification,
}

impl Rated {
    fn new(value: f64, metric: Metric, thresholds: &ThresholdTable) -> Self {
        Self {
            value,
            status: classify(value, thresholds.band(metric), metric.polarity()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectScorecard {
    pub project_id: String,
    pub name: String,
    pub contract_value: f64,
    pub poc: f64,
    pub cm1_pct: Rated,
    pub cm2_pct: Rated,
    pub committed_ratio: Rated,
    pub cost_variance_pct: Rated,
    pub cpi: Rated,
    pub spi: Rated,
    pub poc_velocity: Rated,
    pub adjusted_velocity: Classification,
    pub maturity_adjusted: bool,
    pub major_risks: usize,
    pub health_score: f64,
    pub overall_status: Classification,
}

impl ProjectScorecard {
    pub fn build(record: &ProjectRecord, thresholds: &ThresholdTable) -> Self {
        let metrics = &record.metrics;
        let costs = &metrics.cost_analysis;
        let ev = &metrics.earned_value;
        let velocity = &metrics.velocity;

        let health = project_health_score(
            ev.cost_performance_index,
            ev.schedule_performance_index,
            costs.current_cm2_pct(),
            Some(velocity.velocity),
        );
        let status = StatusInputs::classify(costs, velocity, thresholds).overall();

        Self {
            project_id: record.id().to_string(),
            name: record.name().to_string(),
            contract_value: record.contract_value(),
            poc: velocity.current_poc,
            cm1_pct: Rated::new(costs.current_cm1_pct(), Metric::Cm1Margin, thresholds),
            cm2_pct: Rated::new(costs.current_cm2_pct(), Metric::Cm2Margin, thresholds),
            committed_ratio: Rated::new(costs.committed_ratio, Metric::CommittedVsBudget, thresholds),
            cost_variance_pct: Rated::new(costs.cost_variance_pct, Metric::CostVariance, thresholds),
            cpi: Rated::new(ev.cost_performance_index, Metric::CostPerformanceIndex, thresholds),
            spi: Rated::new(
                ev.schedule_performance_index,
                Metric::SchedulePerformanceIndex,
                thresholds,
            ),
            poc_velocity: Rated::new(velocity.velocity, Metric::PocVelocity, thresholds),
            adjusted_velocity: velocity.adjusted_status.into(),
            maturity_adjusted: velocity.maturity_adjusted,
            major_risks: SeverityCounts::from_factors(&metrics.risk_factors).major(),
            health_score: health.total,
            overall_status: status.into(),
        }
    }

    pub fn status(&self) -> StatusTier {
        self.overall_status.tier
    }
}

/// Worst status first, then lowest health, then project id.
fn worst_first(a: &ProjectScorecard, b: &ProjectScorecard) -> Ordering {
    Reverse(a.status())
        .cmp(&Reverse(b.status()))
        .then_with(|| a.health_score.total_cmp(&b.health_score))
        .then_with(|| a.project_id.cmp(&b.project_id))
}

/// Scorecards of every valid project, ranked worst first.
pub fn build_scorecards(records: &[ProjectRecord], thresholds: &ThresholdTable) -> Vec<ProjectScorecard> {
    let mut cards: Vec<ProjectScorecard> = records
        .iter()
        .filter(|r| r.is_valid())
        .map(|r| ProjectScorecard::build(r, thresholds))
        .collect();
    cards.sort_by(worst_first);
    cards
}
