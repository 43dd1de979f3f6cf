use clap::{ArgGroup, Args};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::amortization::conversions;
use loan_calc_core::types::round_money;

/// Arguments for converting insurance between amount and percentage
#[derive(Args)]
#[command(group(ArgGroup::new("insurance").required(true).args(["amount", "rate"])))]
pub struct InsuranceArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Insurance charged per period
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Insurance per period as a percentage of principal
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_insurance(args: InsuranceArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let mut eq = match (args.amount, args.rate) {
        (Some(amount), _) => conversions::insurance_equivalence_from_amount(amount, args.principal)?,
        (None, Some(rate)) => conversions::insurance_equivalence_from_rate(rate, args.principal)?,
        (None, None) => return Err("--amount or --rate is required".into()),
    };
    eq.amount_per_period = round_money(eq.amount_per_period, precision);
    eq.rate = eq.rate.round_dp(4);
    Ok(serde_json::to_value(eq)?)
}

/// Arguments for converting loan duration between months and years
#[derive(Args)]
#[command(group(ArgGroup::new("duration").required(true).args(["months", "years"])))]
pub struct TermArgs {
    /// Duration in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Duration in whole years
    #[arg(long)]
    pub years: Option<u32>,
}

pub fn run_term(args: TermArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let eq = match (args.months, args.years) {
        (Some(months), _) => conversions::term_from_months(months),
        (None, Some(years)) => conversions::term_from_years(years)?,
        (None, None) => return Err("--months or --years is required".into()),
    };
    Ok(serde_json::to_value(eq)?)
}
