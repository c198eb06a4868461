use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{InputError, non_negative};

/// Deduction claims for one taxpayer.
///
/// Every field is optional: monetary claims and counts default to zero and
/// flags to `false`. Claims are taken as entered; ceilings are applied by
/// [`crate::calculations::DeductionAggregator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeductionInput {
    /// Personal allowance, used as supplied (60,000 under current law).
    pub personal: Decimal,
    /// Spouse without income.
    pub spouse: bool,
    pub children: u32,
    /// Second and later children born from 2018 onwards; a subset of `children`.
    pub children_2nd: u32,
    /// Parents aged 60 or over supported by the taxpayer.
    pub parents: u32,

    pub life_insurance: Decimal,
    pub health_insurance_self: Decimal,
    pub health_insurance_parent: Decimal,
    pub social_security: Decimal,

    /// Retirement Mutual Fund.
    pub rmf: Decimal,
    /// Super Savings Fund.
    pub ssf: Decimal,
    /// Provident Fund.
    pub pvd: Decimal,
    /// Thailand ESG Fund.
    pub thai_esg: Decimal,
    /// National Savings Fund.
    pub nssf: Decimal,

    pub easy_e_receipt: bool,
    pub solar_cell: Decimal,
    pub home_construction: Decimal,
    pub home_interest: Decimal,

    pub donation: Decimal,
    /// Donations to education, sports or hospitals; count double before capping.
    pub education_donation: Decimal,
    pub political_donation: Decimal,
    pub social_enterprise: Decimal,
}

impl DeductionInput {
    /// Rejects negative claims and a second-child count above the total.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.children_2nd > self.children {
            return Err(InputError::SecondChildrenExceedChildren {
                children: self.children,
                children_2nd: self.children_2nd,
            });
        }

        let amounts = [
            ("personal", self.personal),
            ("life_insurance", self.life_insurance),
            ("health_insurance_self", self.health_insurance_self),
            ("health_insurance_parent", self.health_insurance_parent),
            ("social_security", self.social_security),
            ("rmf", self.rmf),
            ("ssf", self.ssf),
            ("pvd", self.pvd),
            ("thai_esg", self.thai_esg),
            ("nssf", self.nssf),
            ("solar_cell", self.solar_cell),
            ("home_construction", self.home_construction),
            ("home_interest", self.home_interest),
            ("donation", self.donation),
            ("education_donation", self.education_donation),
            ("political_donation", self.political_donation),
            ("social_enterprise", self.social_enterprise),
        ];
        for (field, value) in amounts {
            non_negative(field, value)?;
        }

        Ok(())
    }
}

/// One line of the deduction breakdown, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionLine {
    Personal,
    Spouse,
    Children,
    Parents,
    LifeInsurance,
    HealthInsuranceSelf,
    HealthInsuranceParent,
    Rmf,
    Ssf,
    Pvd,
    ThaiEsg,
    Nssf,
    SocialSecurity,
    EasyEReceipt,
    SolarCell,
    HomeConstruction,
    HomeInterest,
    Donation,
    EducationDonation,
    PoliticalDonation,
    SocialEnterprise,
}

impl DeductionLine {
    pub const ALL: [Self; 21] = [
        Self::Personal,
        Self::Spouse,
        Self::Children,
        Self::Parents,
        Self::LifeInsurance,
        Self::HealthInsuranceSelf,
        Self::HealthInsuranceParent,
        Self::Rmf,
        Self::Ssf,
        Self::Pvd,
        Self::ThaiEsg,
        Self::Nssf,
        Self::SocialSecurity,
        Self::EasyEReceipt,
        Self::SolarCell,
        Self::HomeConstruction,
        Self::HomeInterest,
        Self::Donation,
        Self::EducationDonation,
        Self::PoliticalDonation,
        Self::SocialEnterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Spouse => "spouse",
            Self::Children => "children",
            Self::Parents => "parents",
            Self::LifeInsurance => "life_insurance",
            Self::HealthInsuranceSelf => "health_insurance_self",
            Self::HealthInsuranceParent => "health_insurance_parent",
            Self::Rmf => "rmf",
            Self::Ssf => "ssf",
            Self::Pvd => "pvd",
            Self::ThaiEsg => "thai_esg",
            Self::Nssf => "nssf",
            Self::SocialSecurity => "social_security",
            Self::EasyEReceipt => "easy_e_receipt",
            Self::SolarCell => "solar_cell",
            Self::HomeConstruction => "home_construction",
            Self::HomeInterest => "home_interest",
            Self::Donation => "donation",
            Self::EducationDonation => "education_donation",
            Self::PoliticalDonation => "political_donation",
            Self::SocialEnterprise => "social_enterprise",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal allowance",
            Self::Spouse => "Spouse allowance",
            Self::Children => "Child allowance",
            Self::Parents => "Parent allowance",
            Self::LifeInsurance => "Life insurance premium",
            Self::HealthInsuranceSelf => "Health insurance (self)",
            Self::HealthInsuranceParent => "Health insurance (parents)",
            Self::Rmf => "RMF",
            Self::Ssf => "SSF",
            Self::Pvd => "Provident fund",
            Self::ThaiEsg => "Thai ESG fund",
            Self::Nssf => "National Savings Fund",
            Self::SocialSecurity => "Social security contribution",
            Self::EasyEReceipt => "Easy E-Receipt",
            Self::SolarCell => "Solar cell installation",
            Self::HomeConstruction => "New home construction",
            Self::HomeInterest => "Home loan interest",
            Self::Donation => "General donation",
            Self::EducationDonation => "Education donation (2x)",
            Self::PoliticalDonation => "Political party donation",
            Self::SocialEnterprise => "Social enterprise investment",
        }
    }

    /// Donation lines capped against income after basic deductions.
    pub fn is_donation(&self) -> bool {
        matches!(self, Self::Donation | Self::EducationDonation)
    }
}

/// Allowed amount per deduction line. Every line is present, zero or not.
pub type DeductionDetails = BTreeMap<DeductionLine, Decimal>;
