//! Plain-text reports. Amounts are shown with two decimals and thousands
//! separators; the underlying values stay unrounded.

use std::fmt;

use rust_decimal::Decimal;
use tax_core::calculations::common::{format_amount, round_half_up};
use tax_core::{
    BracketDetail, CalculationRecord, CalculationResult, DeductionDetails, HistoryStatistics,
    ProfileSummary, RateTable,
};

const RULE: &str = "------------------------------------------------------------";

fn amount(value: Decimal) -> String {
    format_amount(value, 2)
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: Decimal,
) -> fmt::Result {
    writeln!(f, "  {:<38}{:>20}", label, amount(value))
}

fn write_percent(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: Decimal,
) -> fmt::Result {
    writeln!(f, "  {:<38}{:>20}", label, format!("{}%", round_half_up(value).normalize()))
}

fn write_deductions(
    f: &mut fmt::Formatter<'_>,
    details: &DeductionDetails,
) -> fmt::Result {
    for (line, allowed) in details.iter().filter(|(_, allowed)| !allowed.is_zero()) {
        write_row(f, line.label(), *allowed)?;
    }
    Ok(())
}

fn write_brackets(
    f: &mut fmt::Formatter<'_>,
    details: &[BracketDetail],
) -> fmt::Result {
    if details.is_empty() {
        return writeln!(f, "  (no taxable bracket)");
    }
    for detail in details {
        writeln!(
            f,
            "  {:<24}{:>4}%{:>16}{:>14}",
            detail.range,
            detail.rate.normalize(),
            amount(detail.taxable_amount),
            amount(detail.tax)
        )?;
    }
    Ok(())
}

/// Full breakdown of a calculation.
pub struct ResultReport<'a> {
    pub name: &'a str,
    pub rate_table: &'a RateTable,
    pub result: &'a CalculationResult,
}

impl fmt::Display for ResultReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.result;
        writeln!(
            f,
            "{}: personal income tax {} BE ({})",
            self.name,
            self.rate_table.buddhist_era_year(),
            self.rate_table.tax_year
        )?;
        writeln!(f, "{RULE}")?;

        writeln!(f, "Income")?;
        for (category, detail) in &r.income_details {
            writeln!(
                f,
                "  {:<30}{:>16}{:>14}",
                category.label(),
                amount(detail.income),
                amount(detail.expense)
            )?;
        }
        write_row(f, "Total income", r.total_income)?;
        write_row(f, "Total expenses", r.total_expenses)?;
        write_row(f, "Income after expenses", r.income_after_expenses)?;

        writeln!(f, "Deductions")?;
        write_deductions(f, &r.deduction_details)?;
        write_row(f, "Total deductions", r.total_deductions)?;

        writeln!(f, "Net income")?;
        write_row(f, "Before donations", r.net_income_before_donation)?;
        write_row(f, "Donations", r.total_donation)?;
        write_row(f, "Taxable", r.net_income)?;

        writeln!(f, "Tax by bracket")?;
        write_brackets(f, &r.tax_details)?;

        writeln!(f, "{RULE}")?;
        write_row(f, "Tax", r.tax)?;
        write_row(f, "Withholding tax", r.withholding_tax)?;
        if !r.tax_refund.is_zero() {
            write_row(f, "Refund", r.tax_refund)?;
        }
        if !r.tax_additional.is_zero() {
            write_row(f, "Additional payment", r.tax_additional)?;
        }
        write_percent(f, "Effective rate on income", r.tax_percent_of_income)?;
        write_percent(f, "Effective rate on net income", r.tax_percent_of_net)?;
        write_row(f, "Income after tax", r.net_income_after_tax)
    }
}

/// Saved profiles, one per line.
pub struct ProfileList<'a>(pub &'a [ProfileSummary]);

impl fmt::Display for ProfileList<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No saved profiles.");
        }
        writeln!(f, "{:<30}{:>20}", "Name", "Updated")?;
        for profile in self.0 {
            writeln!(
                f,
                "{:<30}{:>20}",
                profile.name,
                profile.updated_at.format("%Y-%m-%d %H:%M")
            )?;
        }
        Ok(())
    }
}

/// History records, newest first, one per line.
pub struct HistoryList<'a>(pub &'a [CalculationRecord]);

impl fmt::Display for HistoryList<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No recorded calculations.");
        }
        writeln!(
            f,
            "{:>5}  {:<16}  {:<20}{:>18}{:>16}",
            "Id", "Recorded", "Name", "Income", "Tax"
        )?;
        for record in self.0 {
            writeln!(
                f,
                "{:>5}  {:<16}  {:<20}{:>18}{:>16}",
                record.id,
                record.created_at.format("%Y-%m-%d %H:%M"),
                record.name,
                amount(record.income),
                amount(record.tax)
            )?;
        }
        Ok(())
    }
}

/// One history record with its breakdown.
pub struct RecordReport<'a>(pub &'a CalculationRecord);

impl fmt::Display for RecordReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let record = self.0;
        writeln!(
            f,
            "#{} {} ({})",
            record.id,
            record.name,
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "{RULE}")?;
        write_row(f, "Total income", record.income)?;
        writeln!(f, "Deductions")?;
        write_deductions(f, &record.deduction_details)?;
        write_row(f, "Total deductions", record.total_deductions)?;
        write_row(f, "Taxable income", record.net_income)?;
        writeln!(f, "Tax by bracket")?;
        write_brackets(f, &record.tax_details)?;
        writeln!(f, "{RULE}")?;
        write_row(f, "Tax", record.tax)
    }
}

pub struct StatisticsReport<'a>(pub &'a HistoryStatistics);

impl fmt::Display for StatisticsReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "  {:<38}{:>20}", "Calculations", stats.total_calculations)?;
        write_row(f, "Total tax", stats.total_tax)?;
        write_row(f, "Average tax", stats.average_tax)?;
        write_row(f, "Total income", stats.total_income)?;
        write_row(f, "Average income", stats.average_income)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::calculations::compute;
    use tax_core::{DeductionInput, DeductionLine, IncomeInput};

    use super::*;

    fn sample_result() -> CalculationResult {
        let income = IncomeInput {
            salary: dec!(600000),
            ..Default::default()
        };
        let deductions = DeductionInput {
            personal: dec!(60000),
            ..Default::default()
        };
        compute(&RateTable::thai_2025(), &income, &deductions, dec!(30000))
    }

    fn sample_record() -> CalculationRecord {
        let result = sample_result();
        CalculationRecord {
            id: 7,
            name: "Somchai".to_string(),
            income: result.total_income,
            total_deductions: result.total_deductions,
            net_income: result.net_income,
            tax: result.tax,
            deduction_details: result.deduction_details,
            tax_details: result.tax_details,
            created_at: Utc.with_ymd_and_hms(2025, 3, 31, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn result_report_shows_key_figures() {
        let table = RateTable::thai_2025();
        let result = sample_result();
        let text = ResultReport {
            name: "Somchai",
            rate_table: &table,
            result: &result,
        }
        .to_string();

        assert!(text.starts_with("Somchai: personal income tax 2568 BE (2025)\n"));
        assert!(text.contains("600,000.00"), "{text}");
        assert!(text.contains("440,000.00"), "{text}");
        assert!(text.contains("21,500.00"), "{text}");
        assert!(text.contains("Refund"), "{text}");
        assert!(!text.contains("Additional payment"), "{text}");
        assert!(text.contains("150,001 - 300,000"), "{text}");
    }

    #[test]
    fn effective_rates_are_rounded_percentages() {
        let table = RateTable::thai_2025();
        let result = sample_result();
        let text = ResultReport {
            name: "Somchai",
            rate_table: &table,
            result: &result,
        }
        .to_string();

        let row = |label: &str| {
            text.lines()
                .find(|line| line.trim_start().starts_with(label))
                .map(|line| line.trim_start_matches(|c: char| !c.is_ascii_digit()).to_string())
        };
        assert_eq!(row("Effective rate on income"), Some("3.58%".to_string()));
        assert_eq!(row("Effective rate on net income"), Some("4.89%".to_string()));
    }

    #[test]
    fn zero_deduction_lines_are_hidden() {
        let table = RateTable::thai_2025();
        let result = sample_result();
        let text = ResultReport {
            name: "Somchai",
            rate_table: &table,
            result: &result,
        }
        .to_string();

        assert!(text.contains(DeductionLine::Personal.label()));
        assert!(!text.contains(DeductionLine::LifeInsurance.label()));
    }

    #[test]
    fn bracket_rows_show_percent_rate() {
        let record = sample_record();
        let text = RecordReport(&record).to_string();

        let row = text
            .lines()
            .find(|line| line.contains("300,001 - 500,000"))
            .expect("third bracket row");
        assert!(row.contains("10%"), "{row}");
        assert!(row.contains("14,000.00"), "{row}");
    }

    #[test]
    fn untaxed_result_has_placeholder_bracket_row() {
        let table = RateTable::thai_2025();
        let result = compute(
            &table,
            &IncomeInput::default(),
            &DeductionInput::default(),
            Decimal::ZERO,
        );
        let text = ResultReport {
            name: "Nobody",
            rate_table: &table,
            result: &result,
        }
        .to_string();

        assert!(text.contains("(no taxable bracket)"));
    }

    #[test]
    fn record_report_header() {
        let record = sample_record();
        let text = RecordReport(&record).to_string();

        assert_eq!(
            text.lines().next(),
            Some("#7 Somchai (2025-03-31 09:30:00 UTC)")
        );
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(ProfileList(&[]).to_string(), "No saved profiles.\n");
        assert_eq!(HistoryList(&[]).to_string(), "No recorded calculations.\n");
    }

    #[test]
    fn history_list_has_one_line_per_record() {
        let records = vec![sample_record()];
        let text = HistoryList(&records).to_string();

        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Somchai"));
        assert!(text.contains("2025-03-31 09:30"));
    }

    #[test]
    fn statistics_report() {
        let stats = HistoryStatistics {
            total_calculations: 2,
            total_tax: dec!(26000),
            average_tax: dec!(13000),
            total_income: dec!(1000000),
            average_income: dec!(500000),
        };
        let text = StatisticsReport(&stats).to_string();

        assert!(text.contains("Calculations"));
        assert!(text.contains("13,000.00"));
        assert!(text.contains("1,000,000.00"));
    }
}
