use clap::{Args, ValueEnum};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::amortization::{
    analyse_loan, InsuranceSpec, LoanRequest, PaymentFrequency,
};
use loan_calc_core::types::ComputationOutput;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(f: FrequencyArg) -> Self {
        match f {
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Quarterly => PaymentFrequency::Quarterly,
            FrequencyArg::SemiAnnual => PaymentFrequency::SemiAnnual,
            FrequencyArg::Annual => PaymentFrequency::Annual,
        }
    }
}

/// Loan parameters shared by `schedule` and `payment`
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 4.45)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of payment periods
    #[arg(long, conflicts_with = "term_years")]
    pub term: Option<u32>,

    /// Duration in whole years, converted to payment periods
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Fixed insurance charged every period
    #[arg(long, conflicts_with = "insurance_rate")]
    pub insurance_amount: Option<Decimal>,

    /// Insurance per period as a percentage of principal
    #[arg(long)]
    pub insurance_rate: Option<Decimal>,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,
}

impl LoanArgs {
    /// Loan flags that a file or piped request would override
    fn given_flags(&self) -> Vec<&'static str> {
        [
            ("--principal", self.principal.is_some()),
            ("--rate", self.rate.is_some()),
            ("--term", self.term.is_some()),
            ("--term-years", self.term_years.is_some()),
            ("--insurance-amount", self.insurance_amount.is_some()),
            ("--insurance-rate", self.insurance_rate.is_some()),
        ]
        .into_iter()
        .filter_map(|(flag, given)| given.then_some(flag))
        .collect()
    }
}

fn build_request(args: LoanArgs) -> Result<LoanRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        debug!("loan request source: input file {path}");
        warn_ignored(&args, "--input");
        return input::file::read_input(path);
    }
    if let Some(request) = input::stdin::read_stdin()? {
        debug!("loan request source: stdin");
        warn_ignored(&args, "stdin");
        return Ok(request);
    }
    debug!("loan request source: command-line flags");

    let principal = args
        .principal
        .ok_or("--principal is required (or provide --input)")?;
    let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
    let frequency = PaymentFrequency::from(args.frequency);

    let term = match (args.term, args.term_years) {
        (Some(term), _) => term,
        (None, Some(years)) => years
            .checked_mul(frequency.periods_per_year())
            .ok_or("--term-years is too large")?,
        (None, None) => return Err("--term or --term-years is required (or provide --input)".into()),
    };

    let insurance = match (args.insurance_amount, args.insurance_rate) {
        (Some(amount), _) => Some(InsuranceSpec::Fixed {
            amount_per_period: amount,
        }),
        (None, Some(rate)) => Some(InsuranceSpec::PercentOfPrincipal { rate }),
        (None, None) => None,
    };

    Ok(LoanRequest {
        principal,
        annual_rate: rate,
        term,
        frequency,
        insurance,
    })
}

fn warn_ignored(args: &LoanArgs, source: &str) {
    let ignored = args.given_flags();
    if !ignored.is_empty() {
        warn!("reading the loan from {source}; ignoring {}", ignored.join(", "));
    }
}

/// Full amortization table with summary
pub fn run_schedule(args: LoanArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(args)?;
    let mut output = analyse_loan(&request)?;
    output.result = output.result.rounded(precision);
    Ok(serde_json::to_value(output)?)
}

/// Headline payment and cost figures only
pub fn run_payment(args: LoanArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(args)?;
    let output = analyse_loan(&request)?;
    let summary = ComputationOutput {
        result: output.result.summary.rounded(precision),
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    Ok(serde_json::to_value(summary)?)
}
