pub mod analysis;
pub mod conversions;
pub mod request;
pub mod schedule;

pub use analysis::{analyse_loan, LoanAnalysis, LoanSummary};
pub use request::{InsuranceSpec, LoanRequest, PaymentFrequency, MAX_TERM};
pub use schedule::{compute_schedule, AmortizationResult, AmortizationRow};
