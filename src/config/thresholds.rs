use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::scoring::StatusTier;

/// Flat override mapping `{metric_name: {tier_name: cutoff}}`.
///
/// Partial maps are expected: only the named tiers of the named metrics are
/// replaced, everything else keeps its current value.
pub type ThresholdOverrides = BTreeMap<String, BTreeMap<String, f64>>;

/// Direction in which a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Classification cutoffs for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub excellent: f64,
    pub good: f64,
    /// Only meaningful for signed growth-style metrics (higher is better).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable: Option<f64>,
    pub warning: f64,
    pub critical: f64,
}

impl ThresholdBand {
    pub const fn new(excellent: f64, good: f64, warning: f64, critical: f64) -> Self {
        Self {
            excellent,
            good,
            stable: None,
            warning,
            critical,
        }
    }

    pub const fn with_stable(mut self, stable: f64) -> Self {
        self.stable = Some(stable);
        self
    }

    /// Cutoff for a tier, `None` for an absent stable tier.
    pub fn cutoff(&self, tier: StatusTier) -> Option<f64> {
        match tier {
            StatusTier::Excellent => Some(self.excellent),
            StatusTier::Good => Some(self.good),
            StatusTier::Stable => self.stable,
            StatusTier::Warning => Some(self.warning),
            StatusTier::Critical => Some(self.critical),
        }
    }

    fn set(&mut self, tier: StatusTier, value: f64) {
        match tier {
            StatusTier::Excellent => self.excellent = value,
            StatusTier::Good => self.good = value,
            StatusTier::Stable => self.stable = Some(value),
            StatusTier::Warning => self.warning = value,
            StatusTier::Critical => self.critical = value,
        }
    }

    /// Check that cutoffs are ordered in the direction implied by `polarity`.
    pub fn validate(&self, polarity: Polarity) -> std::result::Result<(), String> {
        let mut chain = vec![("excellent", self.excellent), ("good", self.good)];
        if let Some(stable) = self.stable {
            if polarity == Polarity::LowerIsBetter {
                return Err("stable tier is only valid for higher-is-better metrics".into());
            }
            chain.push(("stable", stable));
        }
        chain.push(("warning", self.warning));
        chain.push(("critical", self.critical));

        if let Some((name, _)) = chain.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{name} cutoff must be a finite number"));
        }

        for pair in chain.windows(2) {
            let (upper_name, upper) = pair[0];
            let (lower_name, lower) = pair[1];
            let ordered = match polarity {
                Polarity::HigherIsBetter => upper >= lower,
                Polarity::LowerIsBetter => upper <= lower,
            };
            if !ordered {
                let relation = match polarity {
                    Polarity::HigherIsBetter => ">=",
                    Polarity::LowerIsBetter => "<=",
                };
                return Err(format!(
                    "{upper_name} ({upper}) must be {relation} {lower_name} ({lower})"
                ));
            }
        }
        Ok(())
    }
}

/// Metrics that carry a classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cm2Margin,
    Cm1Margin,
    PocVelocity,
    CashFlowEfficiency,
    RevenueGrowth,
    CommittedVsBudget,
    CostVariance,
    SchedulePerformance,
    CostPerformanceIndex,
    SchedulePerformanceIndex,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Cm2Margin,
        Metric::Cm1Margin,
        Metric::PocVelocity,
        Metric::CashFlowEfficiency,
        Metric::RevenueGrowth,
        Metric::CommittedVsBudget,
        Metric::CostVariance,
        Metric::SchedulePerformance,
        Metric::CostPerformanceIndex,
        Metric::SchedulePerformanceIndex,
    ];

    /// Configuration key used in override maps and TOML sections.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Cm2Margin => "cm2_margin",
            Metric::Cm1Margin => "cm1_margin",
            Metric::PocVelocity => "poc_velocity",
            Metric::CashFlowEfficiency => "cash_flow_efficiency",
            Metric::RevenueGrowth => "revenue_growth",
            Metric::CommittedVsBudget => "committed_vs_budget",
            Metric::CostVariance => "cost_variance",
            Metric::SchedulePerformance => "schedule_performance",
            Metric::CostPerformanceIndex => "cost_performance_index",
            Metric::SchedulePerformanceIndex => "schedule_performance_index",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Metric::CommittedVsBudget | Metric::CostVariance => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The classification bands for every metric.
///
/// Passed by reference into every classifier call so that one analysis run
/// sees a single consistent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    pub cm2_margin: ThresholdBand,
    pub cm1_margin: ThresholdBand,
    pub poc_velocity: ThresholdBand,
    pub cash_flow_efficiency: ThresholdBand,
    pub revenue_growth: ThresholdBand,
    pub committed_vs_budget: ThresholdBand,
    pub cost_variance: ThresholdBand,
    pub schedule_performance: ThresholdBand,
    pub cost_performance_index: ThresholdBand,
    pub schedule_performance_index: ThresholdBand,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            cm2_margin: ThresholdBand::new(15.0, 10.0, 5.0, 0.0),
            cm1_margin: ThresholdBand::new(25.0, 20.0, 15.0, 10.0),
            poc_velocity: ThresholdBand::new(10.0, 5.0, 2.0, 0.0),
            cash_flow_efficiency: ThresholdBand::new(1.1, 0.95, 0.85, 0.75),
            revenue_growth: ThresholdBand::new(15.0, 5.0, -5.0, -15.0).with_stable(-2.0),
            committed_vs_budget: ThresholdBand::new(0.9, 1.0, 1.1, 1.2),
            cost_variance: ThresholdBand::new(-5.0, 5.0, 15.0, 25.0),
            schedule_performance: ThresholdBand::new(110.0, 95.0, 80.0, 70.0),
            cost_performance_index: ThresholdBand::new(1.1, 1.0, 0.9, 0.8),
            schedule_performance_index: ThresholdBand::new(1.1, 1.0, 0.9, 0.8),
        }
    }
}

impl ThresholdTable {
    pub fn band(&self, metric: Metric) -> &ThresholdBand {
        match metric {
            Metric::Cm2Margin => &self.cm2_margin,
            Metric::Cm1Margin => &self.cm1_margin,
            Metric::PocVelocity => &self.poc_velocity,
            Metric::CashFlowEfficiency => &self.cash_flow_efficiency,
            Metric::RevenueGrowth => &self.revenue_growth,
            Metric::CommittedVsBudget => &self.committed_vs_budget,
            Metric::CostVariance => &self.cost_variance,
            Metric::SchedulePerformance => &self.schedule_performance,
            Metric::CostPerformanceIndex => &self.cost_performance_index,
            Metric::SchedulePerformanceIndex => &self.schedule_performance_index,
        }
    }

    fn band_mut(&mut self, metric: Metric) -> &mut ThresholdBand {
        match metric {
            Metric::Cm2Margin => &mut self.cm2_margin,
            Metric::Cm1Margin => &mut self.cm1_margin,
            Metric::PocVelocity => &mut self.poc_velocity,
            Metric::CashFlowEfficiency => &mut self.cash_flow_efficiency,
            Metric::RevenueGrowth => &mut self.revenue_growth,
            Metric::CommittedVsBudget => &mut self.committed_vs_budget,
            Metric::CostVariance => &mut self.cost_variance,
            Metric::SchedulePerformance => &mut self.schedule_performance,
            Metric::CostPerformanceIndex => &mut self.cost_performance_index,
            Metric::SchedulePerformanceIndex => &mut self.schedule_performance_index,
        }
    }

    /// Replace the named cutoffs and re-validate the touched bands.
    ///
    /// The table is left unchanged when any override is rejected.
    pub fn apply_overrides(&mut self, overrides: &ThresholdOverrides) -> Result<()> {
        let mut updated = self.clone();

        for (metric_key, tiers) in overrides {
            let metric = Metric::parse(metric_key).ok_or_else(|| {
                log::warn!("Rejecting threshold override for unknown metric '{metric_key}'");
                Error::configuration(format!("unknown threshold metric '{metric_key}'"))
            })?;
            let band = updated.band_mut(metric);
            for (tier_key, value) in tiers {
                let tier = StatusTier::parse(tier_key).ok_or_else(|| {
                    log::warn!("Rejecting unknown tier '{tier_key}' for metric '{metric_key}'");
                    Error::configuration(format!(
                        "unknown tier '{tier_key}' for metric '{metric_key}'"
                    ))
                })?;
                band.set(tier, *value);
            }
            band.validate(metric.polarity())
                .map_err(|msg| Error::validation(format!("{metric}: {msg}")))?;
            log::debug!("Applied threshold overrides for {metric}: {tiers:?}");
        }

        *self = updated;
        Ok(())
    }

    /// Builder-style variant of [`ThresholdTable::apply_overrides`].
    pub fn with_overrides(mut self, overrides: &ThresholdOverrides) -> Result<Self> {
        self.apply_overrides(overrides)?;
        Ok(self)
    }

    /// Validate every band against its polarity.
    pub fn validate(&self) -> Result<()> {
        let errors: Vec<String> = Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                self.band(metric)
                    .validate(metric.polarity())
                    .err()
                    .map(|msg| format!("{metric}: {msg}"))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(errors.join("; ")))
        }
    }
}
