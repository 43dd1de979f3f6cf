use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::request::LoanRequest;
use crate::error::LoanCalcError;
use crate::time_value;
use crate::types::*;
use crate::LoanCalcResult;

/// A single period in the amortization table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub opening_balance: Money,
    /// Annuity payment (principal + interest, excluding insurance)
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub insurance: Money,
    /// Payment plus insurance
    pub total_due: Money,
    pub remaining_balance: Money,
}

impl AmortizationRow {
    fn rounded(&self, dp: u32) -> Self {
        AmortizationRow {
            period: self.period,
            opening_balance: round_money(self.opening_balance, dp),
            payment: round_money(self.payment, dp),
            interest: round_money(self.interest, dp),
            principal: round_money(self.principal, dp),
            insurance: round_money(self.insurance, dp),
            total_due: round_money(self.total_due, dp),
            remaining_balance: round_money(self.remaining_balance, dp),
        }
    }
}

/// Full amortization schedule with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub rows: Vec<AmortizationRow>,
    pub payment: Money,
    pub periodic_rate: Rate,
    pub insurance_per_period: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_insurance: Money,
    /// Principal + interest + insurance
    pub total_cost: Money,
}

impl AmortizationResult {
    /// Copy with every money field rounded to `dp` places. The periodic rate is left exact.
    pub fn rounded(&self, dp: u32) -> Self {
        AmortizationResult {
            rows: self.rows.iter().map(|r| r.rounded(dp)).collect(),
            payment: round_money(self.payment, dp),
            periodic_rate: self.periodic_rate,
            insurance_per_period: round_money(self.insurance_per_period, dp),
            total_principal: round_money(self.total_principal, dp),
            total_interest: round_money(self.total_interest, dp),
            total_insurance: round_money(self.total_insurance, dp),
            total_cost: round_money(self.total_cost, dp),
        }
    }

    /// Sum of `total_due` across all rows.
    pub fn total_due(&self) -> LoanCalcResult<Money> {
        self.rows.iter().try_fold(Decimal::ZERO, |sum, r| {
            sum.checked_add(r.total_due)
                .ok_or_else(|| LoanCalcError::overflow("total_due", "Total due"))
        })
    }
}

/// Build the period-by-period amortization schedule for a fixed-rate loan.
pub fn compute_schedule(request: &LoanRequest) -> LoanCalcResult<AmortizationResult> {
    request.validate()?;

    let periodic_rate = request.periodic_rate();
    let payment = annuity_payment(request.principal, periodic_rate, request.term)?;
    let insurance = request.insurance_per_period()?;

    debug!(
        "amortizing {} over {} periods: periodic rate {}, payment {}, insurance {}",
        request.principal, request.term, periodic_rate, payment, insurance
    );

    let mut rows = Vec::with_capacity(request.term as usize);
    let mut balance = request.principal;
    let mut total_principal = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_insurance = Decimal::ZERO;
    let total_due = payment
        .checked_add(insurance)
        .ok_or_else(|| LoanCalcError::overflow("insurance", "Payment plus insurance"))?;

    for period in 1..=request.term {
        let opening = balance;
        let interest = opening
            .checked_mul(periodic_rate)
            .ok_or_else(|| LoanCalcError::overflow("principal", "Interest"))?;
        // Final period clears whatever drift the fixed payment left behind
        let principal = if period == request.term {
            opening
        } else {
            payment - interest
        };
        balance -= principal;

        total_principal = total_principal
            .checked_add(principal)
            .ok_or_else(|| LoanCalcError::overflow("principal", "Total principal"))?;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| LoanCalcError::overflow("principal", "Total interest"))?;
        total_insurance = total_insurance
            .checked_add(insurance)
            .ok_or_else(|| LoanCalcError::overflow("insurance", "Total insurance"))?;

        rows.push(AmortizationRow {
            period,
            opening_balance: opening,
            payment,
            interest,
            principal,
            insurance,
            total_due,
            remaining_balance: balance,
        });
    }

    let total_cost = request
        .principal
        .checked_add(total_interest)
        .and_then(|cost| cost.checked_add(total_insurance))
        .ok_or_else(|| LoanCalcError::overflow("principal", "Total cost"))?;

    Ok(AmortizationResult {
        rows,
        payment,
        periodic_rate,
        insurance_per_period: insurance,
        total_principal,
        total_interest,
        total_insurance,
        total_cost,
    })
}

/// Level payment that amortizes `principal` over `term` periods.
/// A zero rate never compounds, so only a positive rate is range checked.
fn annuity_payment(principal: Money, periodic_rate: Rate, term: u32) -> LoanCalcResult<Money> {
    if !periodic_rate.is_zero() && time_value::compound_factor(periodic_rate, term).is_none() {
        return Err(LoanCalcError::invalid(
            "annual_rate",
            format!("Rate compounded over {term} periods exceeds decimal range"),
        ));
    }
    time_value::pmt(periodic_rate, term, -principal, Decimal::ZERO).map_err(|e| match e {
        LoanCalcError::DivisionByZero { context } => LoanCalcError::invalid("annual_rate", context),
        LoanCalcError::InvalidInput { reason, .. } => LoanCalcError::invalid("principal", reason),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::request::{InsuranceSpec, MAX_TERM};
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_rate_schedule() {
        let result = compute_schedule(&LoanRequest::new(dec!(12000), Decimal::ZERO, 12)).unwrap();
        assert_eq!(result.payment, dec!(1000));
        assert_eq!(result.rows.len(), 12);
        for row in &result.rows {
            assert_eq!(row.principal, dec!(1000));
            assert_eq!(row.interest, Decimal::ZERO);
        }
        assert_eq!(result.rows[11].remaining_balance, Decimal::ZERO);
        assert_eq!(result.total_cost, dec!(12000));
    }

    #[test]
    fn test_one_percent_monthly() {
        let result = compute_schedule(&LoanRequest::new(dec!(10000), dec!(12), 12)).unwrap();
        assert!((result.payment - dec!(888.49)).abs() < dec!(0.01));
        assert!((result.total_interest - dec!(661.85)).abs() < dec!(0.01));
        assert_eq!(result.total_cost, dec!(10000) + result.total_interest);
        // First month interest: 10000 * 1% = 100
        assert_eq!(result.rows[0].interest, dec!(100));
    }

    #[test]
    fn test_single_period() {
        let result = compute_schedule(&LoanRequest::new(dec!(500), dec!(12), 1)).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].principal, dec!(500));
        assert_eq!(result.rows[0].interest, dec!(5));
        assert_eq!(result.rows[0].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_fixed_insurance_in_every_row() {
        let req = LoanRequest::new(dec!(6000), dec!(6), 6).with_insurance(InsuranceSpec::Fixed {
            amount_per_period: dec!(12.5),
        });
        let result = compute_schedule(&req).unwrap();
        assert!(result.rows.iter().all(|r| r.insurance == dec!(12.5)));
        assert_eq!(result.total_insurance, dec!(75));
        assert_eq!(result.rows[0].total_due, result.payment + dec!(12.5));
    }

    #[test]
    fn test_rounded_copy_leaves_original() {
        let result = compute_schedule(&LoanRequest::new(dec!(10000), dec!(12), 12)).unwrap();
        let rounded = result.rounded(2);
        assert_eq!(rounded.payment, dec!(888.49));
        assert_ne!(result.payment, rounded.payment);
        assert_eq!(rounded.rows[11].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_principal_error() {
        assert!(compute_schedule(&LoanRequest::new(Decimal::ZERO, dec!(5), 12)).is_err());
    }

    #[test]
    fn test_rate_overflow_is_invalid_input() {
        let err = compute_schedule(&LoanRequest::new(dec!(1000), dec!(100000), 600)).unwrap_err();
        match err {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "annual_rate"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    fn assert_out_of_range(req: &LoanRequest, expected_field: &str) {
        match compute_schedule(req) {
            Err(LoanCalcError::InvalidInput { field, reason }) => {
                assert_eq!(field, expected_field);
                assert!(reason.contains("exceeds decimal range"), "{reason}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_max_principal_total_cost_out_of_range() {
        // principal fits but principal plus interest does not
        assert_out_of_range(&LoanRequest::new(Decimal::MAX, dec!(12), 12), "principal");
    }

    #[test]
    fn test_max_principal_payment_out_of_range() {
        // a single period repays more than the principal
        assert_out_of_range(&LoanRequest::new(Decimal::MAX, dec!(12), 1), "principal");
    }

    #[test]
    fn test_percent_insurance_cost_out_of_range() {
        let req = LoanRequest::new(Decimal::MAX / Decimal::TWO, dec!(12), 12)
            .with_insurance(InsuranceSpec::PercentOfPrincipal { rate: dec!(200) });
        assert_out_of_range(&req, "insurance.rate");
    }

    #[test]
    fn test_total_insurance_out_of_range() {
        let req = LoanRequest::new(dec!(10000), dec!(12), 12).with_insurance(InsuranceSpec::Fixed {
            amount_per_period: Decimal::MAX / Decimal::TWO,
        });
        assert_out_of_range(&req, "insurance");
    }

    #[test]
    fn test_zero_rate_huge_term_rejected() {
        match compute_schedule(&LoanRequest::new(dec!(1000), Decimal::ZERO, u32::MAX)) {
            Err(LoanCalcError::InvalidInput { field, .. }) => assert_eq!(field, "term"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_rate_longest_term() {
        let req = LoanRequest::new(dec!(6000), Decimal::ZERO, MAX_TERM);
        let result = compute_schedule(&req).unwrap();
        assert_eq!(result.rows.len(), MAX_TERM as usize);
        assert_eq!(result.payment, dec!(10));
        assert_eq!(result.rows[MAX_TERM as usize - 1].remaining_balance, Decimal::ZERO);
    }
}
