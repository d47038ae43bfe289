//! Daily balance reconstruction for the current month
//!
//! The store only knows today's outstanding balance. The daily trail is derived by starting
//! from that balance and walking backward through the month, undoing each day's
//! transactions to get the balance the day before.
//!
//! # Design
//!
//! - Balances are signed: a debt of 200 is `-200`.
//! - Each emitted value is the balance at the *end* of its day. Undoing a day's
//!   consumption makes the previous day less negative, undoing a payment makes it more
//!   negative.
//! - Days before the credit existed are reported as zero with no transactions.
//! - Entries whose date is missing or not `YYYY-MM-DD` are ignored. Types that are
//!   neither payments nor consumptions count toward the day's total but move nothing.
//!
//! The reconstruction is a pure function of its inputs, so repeating it gives the same trail.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::types::{BalanceTrail, CreditError, DailyBalance, HistoryTransaction, LedgerEffect};

const OPERATION: &str = "ledger reconstruction";

/// Rebuild the day-by-day balance of one credit for the month containing `today`
///
/// # Arguments
///
/// * `credit_id` - Credit being reconstructed (used in error context only)
/// * `outstanding_balance` - Debt as of now, non-negative
/// * `creation_date` - Local date the credit was created
/// * `today` - Last day of the trail
/// * `transactions` - History entries of the month, in any order
///
/// # Returns
///
/// One [`DailyBalance`] per day from the first of the month through `today`, in
/// ascending order, and the arithmetic mean of their balances.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a running balance or the mean cannot be represented.
pub fn reconstruct(
    credit_id: &str,
    outstanding_balance: Decimal,
    creation_date: NaiveDate,
    today: NaiveDate,
    transactions: &[HistoryTransaction],
) -> Result<BalanceTrail, CreditError> {
    let mut by_day: HashMap<NaiveDate, Vec<&HistoryTransaction>> = HashMap::new();
    for transaction in transactions {
        if let Some(date) = transaction.calendar_date() {
            by_day.entry(date).or_default().push(transaction);
        }
    }

    let first_of_month = today.with_day(1).unwrap_or(today);
    let mut running_balance = -outstanding_balance;
    let mut daily_balances = Vec::with_capacity(today.day() as usize);
    let mut date = today;

    loop {
        if date < creation_date {
            daily_balances.push(DailyBalance {
                date,
                balance: Decimal::ZERO,
                transactions_count: 0,
            });
        } else {
            let day_transactions = by_day.get(&date).map(Vec::as_slice).unwrap_or_default();
            daily_balances.push(DailyBalance {
                date,
                balance: running_balance,
                transactions_count: day_transactions.len(),
            });
            running_balance = undo_day(credit_id, running_balance, day_transactions)?;
        }

        match date.pred_opt() {
            Some(previous) if date > first_of_month => date = previous,
            _ => break,
        }
    }

    daily_balances.reverse();
    let daily_average = average(credit_id, &daily_balances)?;

    Ok(BalanceTrail {
        daily_balances,
        daily_average,
    })
}

/// Balance at the end of the previous day, given the end-of-day balance and that day's entries
fn undo_day(
    credit_id: &str,
    end_of_day: Decimal,
    transactions: &[&HistoryTransaction],
) -> Result<Decimal, CreditError> {
    transactions
        .iter()
        .try_fold(end_of_day, |balance, transaction| match transaction.effect() {
            LedgerEffect::Payment => balance
                .checked_sub(transaction.amount)
                .ok_or_else(|| CreditError::arithmetic_overflow(OPERATION, credit_id)),
            LedgerEffect::Consumption => balance
                .checked_add(transaction.amount)
                .ok_or_else(|| CreditError::arithmetic_overflow(OPERATION, credit_id)),
            LedgerEffect::Neutral => Ok(balance),
        })
}

/// Arithmetic mean of the emitted balances, zero for an empty trail
pub fn average(credit_id: &str, daily_balances: &[DailyBalance]) -> Result<Decimal, CreditError> {
    if daily_balances.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let sum = daily_balances
        .iter()
        .try_fold(Decimal::ZERO, |sum, day| sum.checked_add(day.balance))
        .ok_or_else(|| CreditError::arithmetic_overflow(OPERATION, credit_id))?;

    sum.checked_div(Decimal::from(daily_balances.len()))
        .ok_or_else(|| CreditError::arithmetic_overflow(OPERATION, credit_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn balance_on(trail: &BalanceTrail, day: u32) -> Decimal {
        trail
            .daily_balances
            .iter()
            .find(|entry| entry.date == date(day))
            .map(|entry| entry.balance)
            .unwrap()
    }

    #[test]
    fn test_consumption_reversed_before_its_day() {
        let transactions = vec![HistoryTransaction::new(
            "CONSUMPTION",
            Decimal::new(50, 0),
            "2024-03-15T14:03:00Z",
        )];

        let trail = reconstruct("c1", Decimal::new(200, 0), date(10), date(20), &transactions)
            .unwrap();

        assert_eq!(trail.daily_balances.len(), 20);
        assert_eq!(trail.daily_balances.first().unwrap().date, date(1));
        assert_eq!(trail.daily_balances.last().unwrap().date, date(20));
        for day in 15..=20 {
            assert_eq!(balance_on(&trail, day), Decimal::new(-200, 0), "day {}", day);
        }
        for day in 10..=14 {
            assert_eq!(balance_on(&trail, day), Decimal::new(-150, 0), "day {}", day);
        }
        for day in 1..=9 {
            assert_eq!(balance_on(&trail, day), Decimal::ZERO, "day {}", day);
        }
        assert_eq!(trail.daily_balances[14].transactions_count, 1);
        // (6 * -200 + 5 * -150) / 20
        assert_eq!(trail.daily_average, Decimal::new(-975, 1));
    }

    #[test]
    fn test_payment_reversed_makes_earlier_days_more_negative() {
        let transactions = vec![
            HistoryTransaction::new("CREDIT_PAYMENT", Decimal::new(300, 0), "2024-03-05"),
            HistoryTransaction::new("payment", Decimal::new(100, 0), "2024-03-05"),
        ];

        let trail =
            reconstruct("c1", Decimal::new(600, 0), date(1), date(7), &transactions).unwrap();

        assert_eq!(balance_on(&trail, 7), Decimal::new(-600, 0));
        assert_eq!(balance_on(&trail, 5), Decimal::new(-600, 0));
        assert_eq!(balance_on(&trail, 4), Decimal::new(-1000, 0));
        assert_eq!(balance_on(&trail, 1), Decimal::new(-1000, 0));
        assert_eq!(trail.daily_balances[4].transactions_count, 2);
    }

    #[test]
    fn test_neutral_and_undated_entries() {
        let transactions = vec![
            HistoryTransaction::new("FEE_WAIVER", Decimal::new(999, 0), "2024-03-03"),
            HistoryTransaction {
                transaction_type: "CHARGE".to_string(),
                amount: Decimal::new(40, 0),
                date: None,
            },
            HistoryTransaction::new("CHARGE", Decimal::new(40, 0), "03/03/2024"),
        ];

        let trail =
            reconstruct("c1", Decimal::new(100, 0), date(1), date(4), &transactions).unwrap();

        let counts: Vec<usize> = trail
            .daily_balances
            .iter()
            .map(|entry| entry.transactions_count)
            .collect();
        assert_eq!(counts, vec![0, 0, 1, 0]);
        assert!(trail
            .daily_balances
            .iter()
            .all(|entry| entry.balance == Decimal::new(-100, 0)));
    }

    #[rstest]
    #[case::created_today(date(20), 19)]
    #[case::created_last_month(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), 0)]
    #[case::created_in_future(date(25), 20)]
    fn test_days_before_creation_are_zero(#[case] created: NaiveDate, #[case] zero_days: usize) {
        let trail = reconstruct("c1", Decimal::new(80, 0), created, date(20), &[]).unwrap();
        let zeros = trail
            .daily_balances
            .iter()
            .filter(|entry| entry.balance == Decimal::ZERO && entry.transactions_count == 0)
            .count();
        assert_eq!(zeros, zero_days);
        assert!(trail
            .daily_balances
            .iter()
            .filter(|entry| entry.date < created)
            .all(|entry| entry.balance == Decimal::ZERO));
    }

    #[test]
    fn test_first_of_month_yields_single_day() {
        let trail = reconstruct("c1", Decimal::new(10, 0), date(1), date(1), &[]).unwrap();
        assert_eq!(trail.daily_balances.len(), 1);
        assert_eq!(trail.daily_average, Decimal::new(-10, 0));
    }

    #[test]
    fn test_reconstruction_is_idempotent() {
        let transactions = vec![
            HistoryTransaction::new("CARD_CONSUMPTION", Decimal::new(25, 0), "2024-03-12"),
            HistoryTransaction::new("THIRD_PARTY_PAYMENT", Decimal::new(10, 0), "2024-03-14"),
        ];
        let first = reconstruct("c1", Decimal::new(75, 0), date(2), date(18), &transactions);
        let second = reconstruct("c1", Decimal::new(75, 0), date(2), date(18), &transactions);
        assert_eq!(first, second);
    }

    #[test]
    fn test_average_of_empty_trail_is_zero() {
        assert_eq!(average("c1", &[]), Ok(Decimal::ZERO));
    }
}
