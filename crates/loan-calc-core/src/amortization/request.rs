use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::*;
use crate::LoanCalcResult;

/// Longest accepted term in payment periods: 50 years of monthly payments.
pub const MAX_TERM: u32 = 600;

/// How many payment periods fall in one year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Annual => 1,
        }
    }
}

/// Insurance charged on top of the annuity payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InsuranceSpec {
    /// Flat amount charged every period
    Fixed { amount_per_period: Money },
    /// Percentage of the original principal charged every period.
    /// Does not follow the declining balance.
    PercentOfPrincipal { rate: Percent },
}

impl InsuranceSpec {
    /// Insurance charged in each period for a loan of `principal`.
    pub fn per_period_cost(&self, principal: Money) -> LoanCalcResult<Money> {
        match self {
            InsuranceSpec::Fixed { amount_per_period } => Ok(*amount_per_period),
            InsuranceSpec::PercentOfPrincipal { rate } => principal
                .checked_mul(*rate)
                .map(|cost| cost / Decimal::ONE_HUNDRED)
                .ok_or_else(|| LoanCalcError::overflow("insurance.rate", "Insurance cost")),
        }
    }

    fn validate(&self) -> LoanCalcResult<()> {
        match self {
            InsuranceSpec::Fixed { amount_per_period } if *amount_per_period < Decimal::ZERO => {
                Err(LoanCalcError::invalid(
                    "insurance.amount_per_period",
                    "Insurance amount cannot be negative",
                ))
            }
            InsuranceSpec::PercentOfPrincipal { rate } if *rate < Decimal::ZERO => Err(
                LoanCalcError::invalid("insurance.rate", "Insurance rate cannot be negative"),
            ),
            _ => Ok(()),
        }
    }
}

/// A single borrower submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    /// Annual nominal rate as a percentage (12 = 12%)
    pub annual_rate: Percent,
    /// Number of payment periods
    pub term: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<InsuranceSpec>,
}

impl LoanRequest {
    /// Monthly loan without insurance.
    pub fn new(principal: Money, annual_rate: Percent, term: u32) -> Self {
        LoanRequest {
            principal,
            annual_rate,
            term,
            frequency: PaymentFrequency::default(),
            insurance: None,
        }
    }

    pub fn with_insurance(mut self, insurance: InsuranceSpec) -> Self {
        self.insurance = Some(insurance);
        self
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Rate applied once per payment period, as a decimal.
    pub fn periodic_rate(&self) -> Rate {
        self.annual_rate / Decimal::ONE_HUNDRED / Decimal::from(self.frequency.periods_per_year())
    }

    pub fn insurance_per_period(&self) -> LoanCalcResult<Money> {
        match &self.insurance {
            Some(insurance) => insurance.per_period_cost(self.principal),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Reject anything the engine cannot amortize.
    pub fn validate(&self) -> LoanCalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanCalcError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(LoanCalcError::invalid(
                "annual_rate",
                "Annual rate cannot be negative",
            ));
        }
        if self.term == 0 {
            return Err(LoanCalcError::invalid(
                "term",
                "Term must be at least 1 period",
            ));
        }
        if self.term > MAX_TERM {
            return Err(LoanCalcError::invalid(
                "term",
                format!("Term cannot exceed {MAX_TERM} periods"),
            ));
        }
        if let Some(insurance) = &self.insurance {
            insurance.validate()?;
        }
        Ok(())
    }
}
