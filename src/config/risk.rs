//! Parameters of the risk rules that are not tied to a metric band.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Remaining contingency, as % of contract value, below which it is flagged
    pub contingency_low_remaining_pct: f64,
    /// Remaining contingency threshold used together with the consumption check
    pub contingency_depleting_remaining_pct: f64,
    /// Consumed share of contingency that marks it as depleting
    pub contingency_depleting_consumed_pct: f64,
    /// Remaining contingency threshold of the financial-buffer rule
    pub buffer_remaining_pct: f64,
    /// CM2 below which a thin buffer compounds into a critical finding
    pub buffer_cm2_pct: f64,
    /// Share of non-contingency packages whose overrun marks a systemic issue
    pub work_package_share_pct: f64,
    /// Per-package cost variance counted as an overrun
    pub work_package_variance_pct: f64,
    /// Share of negative quarterly cash-flow entries that is flagged
    pub cash_flow_negative_share_pct: f64,
    /// Completion level from which slow progress is no longer a schedule risk
    pub schedule_poc_ceiling: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            contingency_low_remaining_pct: 1.0,
            contingency_depleting_remaining_pct: 5.0,
            contingency_depleting_consumed_pct: 80.0,
            buffer_remaining_pct: 3.0,
            buffer_cm2_pct: 10.0,
            work_package_share_pct: 30.0,
            work_package_variance_pct: 15.0,
            cash_flow_negative_share_pct: 30.0,
            schedule_poc_ceiling: 90.0,
        }
    }
}

impl RiskSettings {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("contingency_low_remaining_pct", self.contingency_low_remaining_pct),
            ("contingency_depleting_remaining_pct", self.contingency_depleting_remaining_pct),
            ("contingency_depleting_consumed_pct", self.contingency_depleting_consumed_pct),
            ("buffer_remaining_pct", self.buffer_remaining_pct),
            ("buffer_cm2_pct", self.buffer_cm2_pct),
            ("work_package_share_pct", self.work_package_share_pct),
            ("work_package_variance_pct", self.work_package_variance_pct),
            ("cash_flow_negative_share_pct", self.cash_flow_negative_share_pct),
            ("schedule_poc_ceiling", self.schedule_poc_ceiling),
        ];
        let invalid: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, _)| *name)
            .collect();
        if !invalid.is_empty() {
            return Err(Error::validation(format!(
                "risk settings must be finite: {}",
                invalid.join(", ")
            )));
        }
        if self.contingency_low_remaining_pct > self.contingency_depleting_remaining_pct {
            return Err(Error::validation(
                "contingency_low_remaining_pct must not exceed contingency_depleting_remaining_pct",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RiskSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: RiskSettings = toml::from_str("buffer_cm2_pct = 12.5").unwrap();
        assert_eq!(settings.buffer_cm2_pct, 12.5);
        assert_eq!(settings.schedule_poc_ceiling, 90.0);
    }

    #[test]
    fn test_inverted_contingency_cutoffs_rejected() {
        let settings = RiskSettings {
            contingency_low_remaining_pct: 6.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Validation(_))));
    }
}
