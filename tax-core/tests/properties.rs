//! Property tests for the calculation pipeline against the 2025 rate table.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::calculations::{DeductionAggregator, ProgressiveTax, compute};
use tax_core::{DeductionInput, DeductionLine, IncomeInput, RateTable};

const TOLERANCE: Decimal = dec!(0.000001);

fn baht(max: u64) -> impl Strategy<Value = Decimal> {
    (0..=max).prop_map(Decimal::from)
}

proptest! {
    #[test]
    fn tax_is_monotonic_in_net_income(
        a in baht(8_000_000),
        b in baht(8_000_000),
    ) {
        let table = RateTable::thai_2025();
        let progressive = ProgressiveTax::new(&table.brackets);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(progressive.calculate(low).tax <= progressive.calculate(high).tax);
    }

    #[test]
    fn tax_never_exceeds_top_rate_share(net in baht(20_000_000)) {
        let table = RateTable::thai_2025();
        let result = ProgressiveTax::new(&table.brackets).calculate(net);

        prop_assert!(result.tax >= Decimal::ZERO);
        prop_assert!(result.tax <= net * dec!(0.35));
    }

    #[test]
    fn bracket_details_sum_to_tax(net in baht(20_000_000)) {
        let table = RateTable::thai_2025();
        let result = ProgressiveTax::new(&table.brackets).calculate(net);
        let detail_sum: Decimal = result.details.iter().map(|d| d.tax).sum();

        prop_assert_eq!(detail_sum, result.tax);
    }

    #[test]
    fn retirement_funds_never_exceed_joint_ceiling(
        income in baht(10_000_000),
        rmf in baht(600_000),
        ssf in baht(300_000),
        pvd in baht(600_000),
    ) {
        let table = RateTable::thai_2025();
        let input = DeductionInput { rmf, ssf, pvd, ..Default::default() };

        let result = DeductionAggregator::new(&table).aggregate(income, &input);
        let scaled_rmf = result.line(DeductionLine::Rmf);
        let scaled_ssf = result.line(DeductionLine::Ssf);
        let scaled_pvd = result.line(DeductionLine::Pvd);

        prop_assert!(scaled_rmf + scaled_ssf + scaled_pvd <= dec!(500000) + TOLERANCE);

        // Proportions of the individually capped amounts survive scaling.
        let capped_rmf = table.caps.rmf.apply(rmf, income);
        let capped_ssf = table.caps.ssf.apply(ssf, income);
        let capped_pvd = table.caps.pvd.apply(pvd, income);
        let capped_sum = capped_rmf + capped_ssf + capped_pvd;
        if capped_sum > dec!(500000) {
            let ratio = dec!(500000) / capped_sum;
            prop_assert!((scaled_rmf - capped_rmf * ratio).abs() <= TOLERANCE);
            prop_assert!((scaled_ssf - capped_ssf * ratio).abs() <= TOLERANCE);
            prop_assert!((scaled_pvd - capped_pvd * ratio).abs() <= TOLERANCE);
        } else {
            prop_assert_eq!(scaled_rmf, capped_rmf);
            prop_assert_eq!(scaled_ssf, capped_ssf);
            prop_assert_eq!(scaled_pvd, capped_pvd);
        }
    }

    #[test]
    fn donations_stay_within_ten_percent_of_income_after_basic(
        income in baht(5_000_000),
        personal in baht(100_000),
        life_insurance in baht(150_000),
        donation in baht(1_000_000),
        education_donation in baht(1_000_000),
    ) {
        let table = RateTable::thai_2025();
        let input = DeductionInput {
            personal,
            life_insurance,
            donation,
            education_donation,
            ..Default::default()
        };

        let result = DeductionAggregator::new(&table).aggregate(income, &input);
        let cap = result.income_after_basic * dec!(0.10);

        prop_assert!(result.line(DeductionLine::Donation) <= cap);
        prop_assert!(result.line(DeductionLine::EducationDonation) <= cap);
        prop_assert!(result.line(DeductionLine::EducationDonation) <= education_donation * dec!(2));
    }

    #[test]
    fn derived_figures_are_never_negative(
        salary in baht(5_000_000),
        rental in baht(2_000_000),
        other in baht(2_000_000),
        personal in baht(200_000),
        donation in baht(500_000),
        withholding in baht(500_000),
    ) {
        let table = RateTable::thai_2025();
        let income = IncomeInput { salary, rental, other, ..Default::default() };
        let deductions = DeductionInput { personal, donation, ..Default::default() };

        let result = compute(&table, &income, &deductions, withholding);

        prop_assert!(result.income_after_expenses >= Decimal::ZERO);
        prop_assert!(result.net_income_before_donation >= Decimal::ZERO);
        prop_assert!(result.net_income >= Decimal::ZERO);
        prop_assert!(result.tax >= Decimal::ZERO);
        prop_assert!(result.tax_refund >= Decimal::ZERO);
        prop_assert!(result.tax_additional >= Decimal::ZERO);
        prop_assert!(result.net_income_after_tax >= Decimal::ZERO);
    }

    #[test]
    fn refund_and_additional_payment_are_exclusive(
        salary in baht(5_000_000),
        withholding in baht(1_000_000),
    ) {
        let table = RateTable::thai_2025();
        let income = IncomeInput { salary, ..Default::default() };
        let deductions = DeductionInput { personal: dec!(60000), ..Default::default() };

        let result = compute(&table, &income, &deductions, withholding);

        prop_assert!(result.tax_refund.is_zero() || result.tax_additional.is_zero());
        prop_assert_eq!(
            result.tax - result.withholding_tax,
            result.tax_additional - result.tax_refund
        );
    }
}

#[test]
fn tax_is_continuous_at_every_bracket_boundary() {
    let table = RateTable::thai_2025();
    let progressive = ProgressiveTax::new(&table.brackets);

    for pair in table.brackets.windows(2) {
        let Some(upper) = pair[0].max_income else {
            continue;
        };
        let at_bound = progressive.calculate(upper).tax;
        let one_above = progressive.calculate(upper + Decimal::ONE).tax;

        assert_eq!(one_above - at_bound, pair[1].tax_rate);
    }
}
