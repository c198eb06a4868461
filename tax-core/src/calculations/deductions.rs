//! Deduction aggregation.
//!
//! Lines are computed in a fixed order because donations are capped against
//! income left after every other basic deduction:
//!
//! 1. Allowances: personal (as supplied), spouse, children, parents.
//! 2. Absolute caps: insurance, social security, housing, political donation,
//!    social enterprise.
//! 3. Dual caps (share of income and amount): RMF, SSF, PVD, Thai ESG.
//! 4. Joint ceiling on RMF + SSF + PVD, scaled proportionally.
//! 5. NSSF and the Easy E-Receipt bonus.
//! 6. Basic deductions, then general and education donations at 10% of
//!    income after basic deductions.
//!
//! Political donation and social enterprise are left out of the basic total
//! and added back once in the grand total.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::clamp_zero;
use crate::models::{DeductionCaps, DeductionDetails, DeductionInput, DeductionLine, RateTable};

/// Output of [`DeductionAggregator::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedDeductions {
    pub basic_deductions: Decimal,
    /// `max(0, income − basic_deductions)`, the donation base.
    pub income_after_basic: Decimal,
    pub total_deductions: Decimal,
    /// One entry per [`DeductionLine`], zero-valued lines included.
    pub details: DeductionDetails,
}

impl AggregatedDeductions {
    pub fn line(
        &self,
        line: DeductionLine,
    ) -> Decimal {
        self.details.get(&line).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct DeductionAggregator<'a> {
    rate_table: &'a RateTable,
}

impl<'a> DeductionAggregator<'a> {
    pub fn new(rate_table: &'a RateTable) -> Self {
        Self { rate_table }
    }

    /// Applies every cap to `input` against `income` (income after expenses).
    pub fn aggregate(
        &self,
        income: Decimal,
        input: &DeductionInput,
    ) -> AggregatedDeductions {
        let allowances = &self.rate_table.allowances;
        let caps = &self.rate_table.caps;
        let mut details = DeductionDetails::new();

        details.insert(DeductionLine::Personal, input.personal);
        details.insert(
            DeductionLine::Spouse,
            if input.spouse { allowances.spouse } else { Decimal::ZERO },
        );
        details.insert(DeductionLine::Children, self.children(input));
        details.insert(
            DeductionLine::Parents,
            Decimal::from(input.parents) * allowances.parent,
        );

        let absolute = [
            (DeductionLine::LifeInsurance, input.life_insurance, caps.life_insurance),
            (
                DeductionLine::HealthInsuranceSelf,
                input.health_insurance_self,
                caps.health_insurance_self,
            ),
            (
                DeductionLine::HealthInsuranceParent,
                input.health_insurance_parent,
                caps.health_insurance_parent,
            ),
            (DeductionLine::SocialSecurity, input.social_security, caps.social_security),
            (DeductionLine::SolarCell, input.solar_cell, caps.solar_cell),
            (DeductionLine::HomeConstruction, input.home_construction, caps.home_construction),
            (DeductionLine::HomeInterest, input.home_interest, caps.home_interest),
            (DeductionLine::PoliticalDonation, input.political_donation, caps.political_donation),
            (DeductionLine::SocialEnterprise, input.social_enterprise, caps.social_enterprise),
        ];
        for (line, claimed, cap) in absolute {
            if claimed > cap {
                debug!(line = line.as_str(), %claimed, %cap, "claim capped");
            }
            details.insert(line, claimed.min(cap));
        }

        let (rmf, ssf, pvd) = Self::retirement_funds(
            caps,
            caps.rmf.apply(input.rmf, income),
            caps.ssf.apply(input.ssf, income),
            caps.pvd.apply(input.pvd, income),
        );
        details.insert(DeductionLine::Rmf, rmf);
        details.insert(DeductionLine::Ssf, ssf);
        details.insert(DeductionLine::Pvd, pvd);
        details.insert(DeductionLine::ThaiEsg, caps.thai_esg.apply(input.thai_esg, income));

        details.insert(DeductionLine::Nssf, input.nssf.min(caps.nssf));
        details.insert(
            DeductionLine::EasyEReceipt,
            if input.easy_e_receipt {
                allowances.easy_e_receipt
            } else {
                Decimal::ZERO
            },
        );

        let basic_deductions: Decimal = details
            .iter()
            .filter(|(line, _)| !Self::outside_basic(**line))
            .map(|(_, amount)| *amount)
            .sum();
        let income_after_basic = clamp_zero(income - basic_deductions);

        let donation_cap = income_after_basic * caps.donation_percent;
        let donation = input.donation.min(donation_cap);
        let education_donation =
            (input.education_donation * caps.education_donation_multiplier).min(donation_cap);
        details.insert(DeductionLine::Donation, donation);
        details.insert(DeductionLine::EducationDonation, education_donation);

        let total_deductions = basic_deductions
            + donation
            + education_donation
            + details[&DeductionLine::PoliticalDonation]
            + details[&DeductionLine::SocialEnterprise];

        debug!(
            %income,
            %basic_deductions,
            %income_after_basic,
            %donation_cap,
            %total_deductions,
            "deductions aggregated"
        );

        AggregatedDeductions {
            basic_deductions,
            income_after_basic,
            total_deductions,
            details,
        }
    }

    /// `(children − second) × child + second × child_second`.
    ///
    /// Computed in `Decimal` so a second-child count above the total yields a
    /// negative first term instead of wrapping.
    fn children(
        &self,
        input: &DeductionInput,
    ) -> Decimal {
        let allowances = &self.rate_table.allowances;
        let children = Decimal::from(input.children);
        let second = Decimal::from(input.children_2nd);

        (children - second) * allowances.child + second * allowances.child_second
    }

    /// Scales individually capped RMF, SSF and PVD by the same ratio,
    /// `ceiling / sum`, to fit the joint ceiling.
    ///
    /// PVD is written as the remainder `ceiling − rmf − ssf`, which equals
    /// `pvd × ratio` up to the rounding of the division; the remainder form
    /// keeps the three summing to the ceiling exactly.
    fn retirement_funds(
        caps: &DeductionCaps,
        rmf: Decimal,
        ssf: Decimal,
        pvd: Decimal,
    ) -> (Decimal, Decimal, Decimal) {
        let ceiling = caps.retirement_combined;
        let sum = rmf + ssf + pvd;
        if sum <= ceiling {
            return (rmf, ssf, pvd);
        }

        let ratio = ceiling / sum;
        let rmf = rmf * ratio;
        let ssf = ssf * ratio;
        let pvd = clamp_zero(ceiling - rmf - ssf);
        debug!(%sum, %ceiling, %ratio, "retirement funds scaled to joint ceiling");
        (rmf, ssf, pvd)
    }

    fn outside_basic(line: DeductionLine) -> bool {
        line.is_donation()
            || matches!(
                line,
                DeductionLine::PoliticalDonation | DeductionLine::SocialEnterprise
            )
    }
}
