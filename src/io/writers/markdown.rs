use std::io::Write;

use chrono::Utc;

use crate::io::output::{format_amount, format_delta, format_pct, OutputWriter};
use crate::portfolio::PortfolioReport;

/// Findings listed in the register section before it is cut off.
const REGISTER_LIMIT: usize = 25;

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let writers: Vec<fn(&mut Self, &PortfolioReport) -> anyhow::Result<()>> = vec![
            |w, r| w.write_header(r),
            |w, r| w.write_summary(r),
            |w, r| w.write_scorecards(r),
            |w, r| w.write_risk_register(r),
            |w, r| w.write_risk_categories(r),
            |w, r| w.write_recommendations(r),
            |w, r| w.write_margin_rollup(r),
            |w, r| w.write_work_packages(r),
            |w, r| w.write_revenue(r),
            |w, r| w.write_cash_flow(r),
        ];

        writers.iter().try_for_each(|writer| writer(self, report))?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Portfolio Performance Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            self.writer,
            "Projects: {} ({} with a contract value)",
            report.summary.project_count, report.summary.valid_projects
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let s = &report.summary;
        let contingency = s
            .contingency_efficiency
            .map(|e| format!("{e:.1}"))
            .unwrap_or_else(|| "n/a".to_string());
        let rows = [
            ("Contract value", format_amount(s.total_contract_value), format_pct(s.contract_variance)),
            ("Revenue", format_amount(s.total_revenue), format_pct(s.revenue_variance)),
            ("Net cash flow", format_amount(s.net_cash_flow), format_pct(s.net_cash_flow_variance)),
            ("CM1", format_amount(s.total_cm1_value), format_pct(s.cm1_pct)),
            ("CM2", format_amount(s.total_cm2_value), format_pct(s.cm2_pct)),
            ("Weighted POC", format_pct(s.weighted_poc), format_delta(s.poc_velocity)),
            ("Committed ratio", format!("{:.2}", s.committed_ratio), "-".to_string()),
            ("Average CPI / SPI", format!("{:.2} / {:.2}", s.average_cpi, s.average_spi), "-".to_string()),
            ("Average risk score", format!("{:.1}", s.average_risk_score), "-".to_string()),
            (
                "Contingency efficiency",
                contingency,
                format!("{} projects", s.projects_with_contingency),
            ),
        ];

        writeln!(self.writer, "## Executive Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value | Change / Share |")?;
        writeln!(self.writer, "|--------|-------|----------------|")?;
        for (metric, value, detail) in rows {
            writeln!(self.writer, "| {metric} | {value} | {detail} |")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_scorecards(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        if report.scorecards.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "## Project Scorecard")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "| Status | Project | Contract | CM2 | Committed | CPI | SPI | Velocity | Major Risks | Health |"
        )?;
        writeln!(
            self.writer,
            "|--------|---------|----------|-----|-----------|-----|-----|----------|-------------|--------|"
        )?;
        for card in &report.scorecards {
            writeln!(
                self.writer,
                "| {} {} | {} ({}) | {} | {} {} | {:.2} {} | {:.2} {} | {:.2} {} | {} {} | {} | {:.0} |",
                card.overall_status.icon,
                card.overall_status.label,
                card.name,
                card.project_id,
                format_amount(card.contract_value),
                card.cm2_pct.status.icon,
                format_pct(card.cm2_pct.value),
                card.committed_ratio.status.icon,
                card.committed_ratio.value,
                card.cpi.status.icon,
                card.cpi.value,
                card.spi.status.icon,
                card.spi.value,
                card.adjusted_velocity.icon,
                format_delta(card.poc_velocity.value),
                card.major_risks,
                card.health_score,
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_risk_register(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let risks = &report.risk_summary;
        writeln!(self.writer, "## Risk Register")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Projects by risk level: {} critical, {} high, {} medium, {} low",
            risks.buckets.critical, risks.buckets.high, risks.buckets.medium, risks.buckets.low
        )?;
        writeln!(
            self.writer,
            "Value at risk: {} ({})",
            format_amount(risks.value_at_risk),
            format_pct(risks.value_at_risk_pct)
        )?;
        writeln!(self.writer)?;

        if risks.register.is_empty() {
            writeln!(self.writer, "_No risk findings._")?;
            writeln!(self.writer)?;
            return Ok(());
        }

        writeln!(self.writer, "| Severity | Project | Type | Finding | Recommendation |")?;
        writeln!(self.writer, "|----------|---------|------|---------|----------------|")?;
        for entry in risks.register.iter().take(REGISTER_LIMIT) {
            writeln!(
                self.writer,
                "| {} {} | {} | {} | {} | {} |",
                entry.factor.severity.icon(),
                entry.factor.severity,
                entry.project_id,
                entry.factor.risk_type,
                entry.factor.description,
                entry.factor.recommendation
            )?;
        }
        if risks.register.len() > REGISTER_LIMIT {
            writeln!(
                self.writer,
                "\n_{} more findings omitted._",
                risks.register.len() - REGISTER_LIMIT
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_risk_categories(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let categories = &report.risk_summary.categories;
        if categories.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "### Risk Categories")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Type | Total | Critical | High | Medium | Low | Score |")?;
        writeln!(self.writer, "|------|-------|----------|------|--------|-----|-------|")?;
        for category in categories {
            let f = &category.findings;
            writeln!(
                self.writer,
                "| {} | {} | {} | {} | {} | {} | {} |",
                category.risk_type,
                f.total(),
                f.critical,
                f.high,
                f.medium,
                f.low,
                category.severity_score
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_recommendations(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let recommendations = &report.risk_summary.recommendations;
        if recommendations.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "### Portfolio Recommendations")?;
        writeln!(self.writer)?;
        for recommendation in recommendations {
            writeln!(
                self.writer,
                "- **{}:** {}",
                recommendation.title, recommendation.message
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_margin_rollup(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let m = &report.margin_rollup;
        if m.projects_with_data == 0 {
            return Ok(());
        }

        writeln!(self.writer, "## Margin Variability")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "- Projects with forecast history: {} of {}",
            m.projects_with_data, m.projects_analyzed
        )?;
        writeln!(self.writer, "- Severely declining: {}", m.severely_declining)?;
        writeln!(self.writer, "- High CM2 volatility: {}", m.high_volatility)?;
        writeln!(self.writer, "- Unreliable forecasts: {}", m.unreliable_forecasts)?;
        writeln!(self.writer, "- Margin risk (High/Critical): {}", m.margin_risk_projects)?;
        writeln!(
            self.writer,
            "- CM2 value impact: {}",
            format_amount(m.total_cm2_value_impact)
        )?;
        writeln!(
            self.writer,
            "- Average CM2 volatility: {:.2}",
            m.average_cm2_volatility
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_work_packages(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let wp = &report.work_packages;
        if wp.material_packages.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "## Work Packages")?;
        writeln!(self.writer)?;
        let d = &wp.distribution;
        writeln!(
            self.writer,
            "Variance distribution: {} below -5%, {} within ±5%, {} at 5-15%, {} at 15-25%, {} above 25%",
            d.cost_reduction, d.stable, d.moderate_increase, d.high_increase, d.critical_increase
        )?;
        writeln!(
            self.writer,
            "Coverage: {}, average increase {}",
            format_pct(wp.coverage_pct),
            format_pct(wp.average_cost_increase)
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Project | Package | As Sold | Forecast | Variance |")?;
        writeln!(self.writer, "|---------|---------|---------|----------|----------|")?;
        for package in wp.material_packages.iter().take(10) {
            writeln!(
                self.writer,
                "| {} | {} {} | {} | {} | {} |",
                package.project_id,
                package.code,
                package.description,
                format_amount(package.as_sold),
                format_amount(package.fct_n),
                format_pct(package.variance_pct)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_revenue(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let revenue = &report.revenue;
        if revenue.quarters.is_empty() {
            return Ok(());
        }
        let performance = |pct: Option<f64>| pct.map(format_pct).unwrap_or_else(|| "n/a".to_string());

        writeln!(self.writer, "## Quarterly Revenue")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Quarter | Actual | Budget | Performance | Status |")?;
        writeln!(self.writer, "|---------|--------|--------|-------------|--------|")?;
        for quarter in &revenue.quarters {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} | {} |",
                quarter.quarter,
                format_amount(quarter.actual),
                format_amount(quarter.budget),
                performance(quarter.performance_pct),
                quarter.status.map(|s| s.label()).unwrap_or("-")
            )?;
        }
        writeln!(
            self.writer,
            "| **Total** | {} | {} | {} | |",
            format_amount(revenue.total_actual),
            format_amount(revenue.total_budget),
            performance(revenue.performance_pct)
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_cash_flow(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let cf = &report.cash_flow;
        if cf.quarters.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "## Quarterly Cash Flow")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Period | As Sold | Forecast | vs Plan | Status |")?;
        writeln!(self.writer, "|--------|---------|----------|---------|--------|")?;
        for quarter in &cf.quarters {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} | {} |",
                quarter.period,
                format_amount(quarter.as_sold),
                format_amount(quarter.fct_n),
                format_pct(quarter.variance_vs_plan),
                quarter.status
            )?;
        }
        writeln!(
            self.writer,
            "| **Total** | {} | {} | {} | {} |",
            format_amount(cf.total_as_sold),
            format_amount(cf.total_fct_n),
            format_pct(cf.overall_variance),
            cf.overall_status
        )?;
        writeln!(self.writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::core::{CashFlowEntry, ProjectInput, QuarterlyRevenue, SnapshotAmounts};
    use crate::portfolio::analyze_portfolio;
    use crate::project::ProjectRecord;

    fn report() -> PortfolioReport {
        let config = AnalysisConfig::default();
        let mut input = ProjectInput {
            id: "P-1".into(),
            ..Default::default()
        };
        input.revenues.contract_price.n_ptd = 2_000_000.0;
        input.costs.selling_price = Some(SnapshotAmounts::uniform(2_000_000.0));
        input.costs.external_costs = SnapshotAmounts::uniform(1_500_000.0);
        input.cash_flow_quarterly.push(CashFlowEntry {
            period: "Q1".into(),
            as_sold: 100.0,
            fct_n1: 100.0,
            fct_n: 120.0,
            ..Default::default()
        });
        input.quarterly.insert(
            "Q1".into(),
            QuarterlyRevenue {
                actuals: 450.0,
                budget: 500.0,
                ..Default::default()
            },
        );
        let records = vec![ProjectRecord::derive(input.normalize(), &config)];
        analyze_portfolio(records, &config)
    }

    #[test]
    fn test_markdown_sections() {
        let mut buffer = Vec::new();
        MarkdownWriter::new(&mut buffer).write_report(&report()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("# Portfolio Performance Report"));
        assert!(text.contains("| Contract value | 2,000,000 |"));
        assert!(text.contains("## Project Scorecard"));
        assert!(text.contains("| P-1 | Contingency Risk |"));
        assert!(text.contains("| Q1 | 100 | 120 | 20.0% | Excellent |"));
        assert!(text.contains("| Q1 | 450 | 500 | 90.0% | Watch |"));
        assert!(text.contains("| Contingency Risk | 1 | 0 | 1 | 0 | 0 | 3 |"));
        assert!(text.contains("- **Portfolio Risk Alert:**"));
        assert!(text.contains("- **Enhanced Monitoring:**"));
        // no forecast movement, so no margin section
        assert!(!text.contains("## Margin Variability"));
    }
}
