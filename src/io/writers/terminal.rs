use std::io::Write;

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::io::output::{format_amount, format_delta, format_pct, OutputWriter};
use crate::portfolio::PortfolioReport;
use crate::risk::Severity;
use crate::scoring::StatusTier;

const RULE: &str = "───────────────────────────────────────────";
const REGISTER_LIMIT: usize = 10;

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn tier_color(tier: StatusTier) -> Color {
    match tier {
        StatusTier::Excellent | StatusTier::Good => Color::Green,
        StatusTier::Stable => Color::Cyan,
        StatusTier::Warning => Color::Yellow,
        StatusTier::Critical => Color::Red,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::Magenta,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
    }
}

fn colored_pct(value: f64, warning_below: f64) -> ColoredString {
    let text = format_pct(value);
    if value < warning_below {
        text.red()
    } else {
        text.green()
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let printers: Vec<fn(&mut Self, &PortfolioReport) -> anyhow::Result<()>> = vec![
            |w, _| w.print_header(),
            |w, r| w.print_summary(r),
            |w, r| w.print_scorecards(r),
            |w, r| w.print_risks(r),
            |w, r| w.print_recommendations(r),
            |w, r| w.print_margin_and_cash(r),
        ];

        printers.iter().try_for_each(|printer| printer(self, report))?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> TerminalWriter<W> {
    fn print_header(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", "═══════════════════════════════════════════".cyan())?;
        writeln!(self.writer, "{}", "        PORTFOLIO PERFORMANCE REPORT".bold().cyan())?;
        writeln!(self.writer, "{}", "═══════════════════════════════════════════".cyan())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_summary(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let s = &report.summary;
        let cm2_warning = report.config.thresholds.cm2_margin.warning;

        writeln!(self.writer, "📊 {} Summary", "PORTFOLIO".bold())?;
        writeln!(self.writer, "{RULE}")?;
        writeln!(
            self.writer,
            "  Projects:            {} ({} valid)",
            s.project_count, s.valid_projects
        )?;
        writeln!(
            self.writer,
            "  Contract value:      {}",
            format_amount(s.total_contract_value)
        )?;
        writeln!(
            self.writer,
            "  CM1 / CM2:           {} / {}",
            format_pct(s.cm1_pct),
            colored_pct(s.cm2_pct, cm2_warning)
        )?;
        writeln!(
            self.writer,
            "  Weighted POC:        {} ({} pts)",
            format_pct(s.weighted_poc),
            format_delta(s.poc_velocity)
        )?;
        writeln!(
            self.writer,
            "  CPI / SPI:           {:.2} / {:.2}",
            s.average_cpi, s.average_spi
        )?;
        writeln!(
            self.writer,
            "  Net cash flow:       {}",
            format_amount(s.net_cash_flow)
        )?;
        if let Some(efficiency) = s.contingency_efficiency {
            writeln!(self.writer, "  Contingency eff.:    {efficiency:.1}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_scorecards(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        if report.scorecards.is_empty() {
            writeln!(self.writer, "{}", "No projects with a contract value.".yellow())?;
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Project", "Contract", "CM2", "Committed", "CPI", "SPI", "Velocity", "Risks", "Health",
                "Status",
            ]);
        for card in &report.scorecards {
            table.add_row(vec![
                Cell::new(format!("{} ({})", card.name, card.project_id)),
                Cell::new(format_amount(card.contract_value)),
                Cell::new(format_pct(card.cm2_pct.value)).fg(tier_color(card.cm2_pct.status.tier)),
                Cell::new(format!("{:.2}", card.committed_ratio.value))
                    .fg(tier_color(card.committed_ratio.status.tier)),
                Cell::new(format!("{:.2}", card.cpi.value)).fg(tier_color(card.cpi.status.tier)),
                Cell::new(format!("{:.2}", card.spi.value)).fg(tier_color(card.spi.status.tier)),
                Cell::new(format_delta(card.poc_velocity.value))
                    .fg(tier_color(card.adjusted_velocity.tier)),
                Cell::new(card.major_risks),
                Cell::new(format!("{:.0}", card.health_score)),
                Cell::new(card.overall_status.label).fg(tier_color(card.status())),
            ]);
        }

        writeln!(self.writer, "🏗️  {}", "PROJECT SCORECARD".bold())?;
        writeln!(self.writer, "{table}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_risks(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let risks = &report.risk_summary;
        writeln!(self.writer, "⚠️  {}", "RISK REGISTER".bold())?;
        writeln!(self.writer, "{RULE}")?;
        writeln!(
            self.writer,
            "  Critical: {}  High: {}  Medium: {}  Low: {}",
            risks.buckets.critical.to_string().red(),
            risks.buckets.high.to_string().magenta(),
            risks.buckets.medium.to_string().yellow(),
            risks.buckets.low.to_string().green()
        )?;
        writeln!(
            self.writer,
            "  Value at risk: {} ({})",
            format_amount(risks.value_at_risk),
            format_pct(risks.value_at_risk_pct)
        )?;

        if risks.register.is_empty() {
            writeln!(self.writer, "  {}", "No risk findings.".green())?;
            writeln!(self.writer)?;
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Severity", "Project", "Type", "Finding"]);
        for entry in risks.register.iter().take(REGISTER_LIMIT) {
            let severity = entry.factor.severity;
            table.add_row(vec![
                Cell::new(severity.label()).fg(severity_color(severity)),
                Cell::new(&entry.project_id),
                Cell::new(entry.factor.risk_type.label()),
                Cell::new(&entry.factor.description),
            ]);
        }
        writeln!(self.writer, "{table}")?;
        if risks.register.len() > REGISTER_LIMIT {
            writeln!(
                self.writer,
                "  ... and {} more findings",
                risks.register.len() - REGISTER_LIMIT
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_recommendations(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let risks = &report.risk_summary;
        if risks.recommendations.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "💡 {}", "MITIGATION STRATEGY".bold())?;
        writeln!(self.writer, "{RULE}")?;
        for category in risks.categories.iter().take(5) {
            let f = &category.findings;
            writeln!(
                self.writer,
                "  {:<24} {} findings (score {})  C:{} H:{} M:{} L:{}",
                category.risk_type.label(),
                f.total(),
                category.severity_score,
                f.critical,
                f.high,
                f.medium,
                f.low
            )?;
        }
        for recommendation in &risks.recommendations {
            writeln!(
                self.writer,
                "  • {}: {}",
                recommendation.title.bold(),
                recommendation.message
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_margin_and_cash(&mut self, report: &PortfolioReport) -> anyhow::Result<()> {
        let m = &report.margin_rollup;
        if m.projects_with_data > 0 {
            writeln!(self.writer, "📉 {}", "MARGIN VARIABILITY".bold())?;
            writeln!(self.writer, "{RULE}")?;
            writeln!(
                self.writer,
                "  Severely declining: {}  High volatility: {}  Unreliable: {}",
                m.severely_declining, m.high_volatility, m.unreliable_forecasts
            )?;
            writeln!(
                self.writer,
                "  CM2 value impact: {}",
                format_amount(m.total_cm2_value_impact)
            )?;
            writeln!(self.writer)?;
        }

        let revenue = &report.revenue;
        if !revenue.quarters.is_empty() {
            writeln!(self.writer, "📊 {}", "QUARTERLY REVENUE".bold())?;
            writeln!(self.writer, "{RULE}")?;
            for quarter in &revenue.quarters {
                writeln!(
                    self.writer,
                    "  {:<8} {:>14} {:>14} {:>8}  {}",
                    quarter.quarter,
                    format_amount(quarter.actual),
                    format_amount(quarter.budget),
                    quarter.performance_pct.map(format_pct).unwrap_or_else(|| "n/a".to_string()),
                    quarter.status.map(|s| s.label()).unwrap_or("-")
                )?;
            }
            writeln!(self.writer)?;
        }

        let cf = &report.cash_flow;
        if !cf.quarters.is_empty() {
            writeln!(self.writer, "💶 {}", "QUARTERLY CASH FLOW".bold())?;
            writeln!(self.writer, "{RULE}")?;
            for quarter in &cf.quarters {
                writeln!(
                    self.writer,
                    "  {:<8} {:>14} {:>14} {:>8}  {}",
                    quarter.period,
                    format_amount(quarter.as_sold),
                    format_amount(quarter.fct_n),
                    format_pct(quarter.variance_vs_plan),
                    quarter.status
                )?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }
}
