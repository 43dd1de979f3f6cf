use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::types::{Money, Rate};
use crate::LoanCalcResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// (1 + rate)^n by repeated multiplication. `None` if the product leaves decimal range.
pub fn compound_factor(rate: Rate, n: u32) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    if one_plus_r == Decimal::ONE || one_plus_r.is_zero() {
        return Some(if n == 0 { Decimal::ONE } else { one_plus_r });
    }
    let mut factor = Decimal::ONE;
    for _ in 0..n {
        factor = factor.checked_mul(one_plus_r)?;
    }
    Some(factor)
}

/// Net Present Value of a series of cash flows, first flow at t = 0
pub fn npv(rate: Rate, cash_flows: &[Money]) -> LoanCalcResult<Money> {
    if rate <= dec!(-1) {
        return Err(LoanCalcError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| LoanCalcError::DivisionByZero {
                    context: format!("NPV discount factor overflow at period {t}"),
                })?;
        }
        if discount.is_zero() {
            return Err(LoanCalcError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| LoanCalcError::overflow("cash_flows", "NPV"))?;
    }

    Ok(result)
}

/// Internal Rate of Return per period using Newton-Raphson.
///
/// Discount factors are built incrementally so long loan schedules stay
/// linear in the number of flows per iteration.
pub fn irr(cash_flows: &[Money], guess: Rate) -> LoanCalcResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(LoanCalcError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;
        let mut discount = Decimal::ONE;

        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                discount = match discount.checked_mul(one_plus_r) {
                    Some(d) => d,
                    None => break,
                };
            }
            if discount.is_zero() {
                continue;
            }
            npv_val = cf
                .checked_div(discount)
                .and_then(|pv| npv_val.checked_add(pv))
                .ok_or_else(|| LoanCalcError::overflow("cash_flows", "IRR present value"))?;
            if t > 0 {
                let t_dec = Decimal::from(t as i64);
                dnpv = t_dec
                    .checked_mul(*cf)
                    .zip(discount.checked_mul(one_plus_r))
                    .and_then(|(num, den)| num.checked_div(den))
                    .and_then(|d| dnpv.checked_sub(d))
                    .ok_or_else(|| LoanCalcError::overflow("cash_flows", "IRR derivative"))?;
            }
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(LoanCalcError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate = npv_val
            .checked_div(dnpv)
            .and_then(|step| rate.checked_sub(step))
            .ok_or_else(|| LoanCalcError::overflow("cash_flows", "IRR step"))?;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    Err(LoanCalcError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv(rate, cash_flows).unwrap_or(Decimal::MAX),
    })
}

/// Payment (PMT), spreadsheet sign convention: borrowing a positive
/// present value yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> LoanCalcResult<Money> {
    if nper == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        let total = present_value
            .checked_add(future_value)
            .ok_or_else(|| LoanCalcError::overflow("present_value", "PMT balance"))?;
        return Ok(-total / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper).ok_or_else(|| LoanCalcError::InvalidInput {
        field: "rate".into(),
        reason: format!("(1 + rate)^{nper} exceeds decimal range"),
    })?;
    // Discounted form: the factor only ever divides, so large balances cannot overflow
    let discount = Decimal::ONE / factor;
    let annuity_factor = Decimal::ONE - discount;

    if annuity_factor.is_zero() {
        return Err(LoanCalcError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    future_value
        .checked_mul(discount)
        .and_then(|fv| present_value.checked_add(fv))
        .and_then(|balance| (-balance).checked_mul(rate))
        .and_then(|interest| interest.checked_div(annuity_factor))
        .ok_or_else(|| LoanCalcError::overflow("present_value", "PMT payment"))
}
