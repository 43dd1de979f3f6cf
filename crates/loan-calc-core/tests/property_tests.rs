/// Schedule invariants that must hold for every valid loan
use loan_calc_core::amortization::{compute_schedule, LoanRequest};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn request(cents: i64, rate_bp: i64, term: u32) -> LoanRequest {
    LoanRequest::new(Decimal::new(cents, 2), Decimal::new(rate_bp, 2), term)
}

proptest! {
    #[test]
    fn principal_portions_sum_to_principal(
        cents in 100i64..1_000_000_000i64,
        rate_bp in 0i64..3_000i64,
        term in 1u32..=480u32,
    ) {
        let req = request(cents, rate_bp, term);
        let result = compute_schedule(&req).unwrap();
        let repaid: Decimal = result.rows.iter().map(|r| r.principal).sum();
        let tolerance = Decimal::new(1, 2) * Decimal::from(term);
        prop_assert!((repaid - req.principal).abs() <= tolerance);
        prop_assert_eq!(result.rows.len(), term as usize);
    }

    #[test]
    fn final_balance_is_exactly_zero(
        cents in 100i64..1_000_000_000i64,
        rate_bp in 0i64..3_000i64,
        term in 1u32..=480u32,
    ) {
        let result = compute_schedule(&request(cents, rate_bp, term)).unwrap();
        prop_assert_eq!(result.rows.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn interest_accrues_on_previous_balance(
        cents in 100i64..1_000_000_000i64,
        rate_bp in 0i64..3_000i64,
        term in 2u32..=360u32,
    ) {
        let result = compute_schedule(&request(cents, rate_bp, term)).unwrap();
        for pair in result.rows.windows(2) {
            prop_assert_eq!(pair[1].interest, pair[0].remaining_balance * result.periodic_rate);
        }
    }

    #[test]
    fn portions_shift_towards_principal(
        cents in 100_000i64..1_000_000_000i64,
        rate_bp in 1i64..3_000i64,
        term in 2u32..=360u32,
    ) {
        let result = compute_schedule(&request(cents, rate_bp, term)).unwrap();
        for pair in result.rows.windows(2) {
            prop_assert!(pair[1].principal >= pair[0].principal);
            prop_assert!(pair[1].interest <= pair[0].interest);
        }
    }

    #[test]
    fn zero_rate_divides_principal_evenly(
        cents in 100i64..1_000_000_000i64,
        term in 1u32..=480u32,
    ) {
        let req = request(cents, 0, term);
        let result = compute_schedule(&req).unwrap();
        prop_assert_eq!(result.payment, req.principal / Decimal::from(term));
        prop_assert!(result.rows.iter().all(|r| r.interest.is_zero()));
    }
}
