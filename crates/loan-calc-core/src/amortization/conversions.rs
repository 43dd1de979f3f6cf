//! Conversions between the equivalent ways a borrower can enter insurance
//! and loan duration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::*;
use crate::LoanCalcResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Insurance expressed both ways for a given principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceEquivalence {
    pub principal: Money,
    pub amount_per_period: Money,
    pub rate: Percent,
}

/// Loan duration expressed both ways
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEquivalence {
    pub months: u32,
    pub years: u32,
}

fn check_principal(principal: Money) -> LoanCalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    Ok(())
}

/// Percentage of principal that a fixed per-period insurance amount represents.
pub fn insurance_rate_from_amount(amount: Money, principal: Money) -> LoanCalcResult<Percent> {
    check_principal(principal)?;
    if amount < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "amount",
            "Insurance amount cannot be negative",
        ));
    }
    if amount.is_zero() {
        return Ok(Decimal::ZERO);
    }
    amount
        .checked_div(principal)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| LoanCalcError::overflow("amount", "Insurance rate"))
}

/// Per-period insurance amount for a percentage of principal.
pub fn insurance_amount_from_rate(rate: Percent, principal: Money) -> LoanCalcResult<Money> {
    check_principal(principal)?;
    if rate < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "rate",
            "Insurance rate cannot be negative",
        ));
    }
    (rate / Decimal::ONE_HUNDRED)
        .checked_mul(principal)
        .ok_or_else(|| LoanCalcError::overflow("rate", "Insurance amount"))
}

pub fn months_from_years(years: u32) -> LoanCalcResult<u32> {
    years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| LoanCalcError::invalid("years", "Duration is too long"))
}

/// Whole years nearest to `months`; exact half years round to the even year.
pub fn years_from_months(months: u32) -> u32 {
    let years = months / MONTHS_PER_YEAR;
    let rem = months % MONTHS_PER_YEAR;
    let half = MONTHS_PER_YEAR / 2;
    if rem > half || (rem == half && years % 2 == 1) {
        years + 1
    } else {
        years
    }
}

pub fn insurance_equivalence_from_amount(
    amount: Money,
    principal: Money,
) -> LoanCalcResult<InsuranceEquivalence> {
    Ok(InsuranceEquivalence {
        principal,
        amount_per_period: amount,
        rate: insurance_rate_from_amount(amount, principal)?,
    })
}

pub fn insurance_equivalence_from_rate(
    rate: Percent,
    principal: Money,
) -> LoanCalcResult<InsuranceEquivalence> {
    Ok(InsuranceEquivalence {
        principal,
        amount_per_period: insurance_amount_from_rate(rate, principal)?,
        rate,
    })
}

pub fn term_from_months(months: u32) -> TermEquivalence {
    TermEquivalence {
        months,
        years: years_from_months(months),
    }
}

pub fn term_from_years(years: u32) -> LoanCalcResult<TermEquivalence> {
    Ok(TermEquivalence {
        months: months_from_years(years)?,
        years,
    })
}
