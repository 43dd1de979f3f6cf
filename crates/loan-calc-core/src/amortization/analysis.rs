use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::conversions;
use crate::amortization::request::{InsuranceSpec, LoanRequest};
use crate::amortization::schedule::{compute_schedule, AmortizationResult};
use crate::error::LoanCalcError;
use crate::time_value;
use crate::types::*;
use crate::LoanCalcResult;

/// Headline figures shown to the borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub principal: Money,
    pub term: u32,
    pub term_years: Decimal,
    /// Annuity payment, principal + interest only
    pub payment: Money,
    pub insurance_per_period: Money,
    pub payment_with_insurance: Money,
    /// Insurance per period as a percentage of principal
    pub insurance_rate: Percent,
    pub total_interest: Money,
    pub total_insurance: Money,
    /// Everything the borrower pays back: principal, interest and insurance
    pub total_paid: Money,
    /// Interest plus insurance
    pub cost_of_credit: Money,
    /// Cost of credit as a percentage of principal
    pub cost_percentage: Percent,
    /// Annualised rate of all outflows including insurance, compounded per period
    pub effective_annual_rate: Option<Percent>,
}

impl LoanSummary {
    pub fn rounded(&self, dp: u32) -> Self {
        LoanSummary {
            principal: round_money(self.principal, dp),
            term: self.term,
            term_years: self.term_years.round_dp(2),
            payment: round_money(self.payment, dp),
            insurance_per_period: round_money(self.insurance_per_period, dp),
            payment_with_insurance: round_money(self.payment_with_insurance, dp),
            insurance_rate: self.insurance_rate.round_dp(4),
            total_interest: round_money(self.total_interest, dp),
            total_insurance: round_money(self.total_insurance, dp),
            total_paid: round_money(self.total_paid, dp),
            cost_of_credit: round_money(self.cost_of_credit, dp),
            cost_percentage: self.cost_percentage.round_dp(2),
            effective_annual_rate: self.effective_annual_rate.map(|r| r.round_dp(4)),
        }
    }
}

/// Summary plus the full table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub summary: LoanSummary,
    pub schedule: AmortizationResult,
}

impl LoanAnalysis {
    pub fn rounded(&self, dp: u32) -> Self {
        LoanAnalysis {
            summary: self.summary.rounded(dp),
            schedule: self.schedule.rounded(dp),
        }
    }
}

/// Amortize the loan and derive the borrower-facing cost figures.
pub fn analyse_loan(request: &LoanRequest) -> LoanCalcResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = compute_schedule(request)?;

    if request.annual_rate.is_zero() {
        warnings.push("Interest-free loan: payment is principal divided by term".into());
    }
    if let Some(InsuranceSpec::PercentOfPrincipal { .. }) = request.insurance {
        warnings.push(
            "Percentage insurance is charged on the original principal every period".into(),
        );
    }

    let periods_per_year = request.frequency.periods_per_year();
    let effective_annual_rate = match effective_annual_rate(request, &schedule, periods_per_year) {
        Ok(rate) => Some(rate),
        Err(e) => {
            warn!("effective annual rate unavailable: {e}");
            warnings.push(format!("Effective annual rate not computed: {e}"));
            None
        }
    };

    let cost_of_credit = schedule
        .total_interest
        .checked_add(schedule.total_insurance)
        .ok_or_else(|| LoanCalcError::overflow("principal", "Cost of credit"))?;
    let payment_with_insurance = schedule
        .payment
        .checked_add(schedule.insurance_per_period)
        .ok_or_else(|| LoanCalcError::overflow("insurance", "Payment plus insurance"))?;
    let cost_percentage = cost_of_credit
        .checked_div(request.principal)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| LoanCalcError::overflow("principal", "Cost percentage"))?;
    let summary = LoanSummary {
        principal: request.principal,
        term: request.term,
        term_years: Decimal::from(request.term) / Decimal::from(periods_per_year),
        payment: schedule.payment,
        insurance_per_period: schedule.insurance_per_period,
        payment_with_insurance,
        insurance_rate: conversions::insurance_rate_from_amount(
            schedule.insurance_per_period,
            request.principal,
        )?,
        total_interest: schedule.total_interest,
        total_insurance: schedule.total_insurance,
        total_paid: schedule.total_cost,
        cost_of_credit,
        cost_percentage,
        effective_annual_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity amortization",
        &serde_json::json!({
            "principal": request.principal.to_string(),
            "annual_rate": request.annual_rate.to_string(),
            "term": request.term,
            "periods_per_year": periods_per_year,
            "periodic_rate": schedule.periodic_rate.to_string(),
            "insurance": request.insurance,
        }),
        warnings,
        elapsed,
        LoanAnalysis { summary, schedule },
    ))
}

/// IRR of the borrower's flows, compounded up to an annual percentage.
fn effective_annual_rate(
    request: &LoanRequest,
    schedule: &AmortizationResult,
    periods_per_year: u32,
) -> LoanCalcResult<Percent> {
    let mut flows = Vec::with_capacity(schedule.rows.len() + 1);
    flows.push(-request.principal);
    flows.extend(schedule.rows.iter().map(|r| r.total_due));

    let periodic = time_value::irr(&flows, schedule.periodic_rate)?;
    time_value::compound_factor(periodic, periods_per_year)
        .and_then(|annual| (annual - Decimal::ONE).checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| LoanCalcError::overflow("annual_rate", "Effective rate"))
}
