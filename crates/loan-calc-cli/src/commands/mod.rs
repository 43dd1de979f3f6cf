pub mod convert;
pub mod loan;
