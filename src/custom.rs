use crate::currency::round_cents;
use chrono::NaiveDate;
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user-authored installment: buyer and seller agree on explicit capital
/// amounts and due dates instead of a generated amortization.
///
/// Serializes under the sales-endpoint field names, like a generated
/// installment does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntry {
    #[serde(rename = "montoCapital")]
    pub capital_amount: Decimal,
    #[serde(rename = "fechaVencimiento")]
    pub due_date: NaiveDate,
    #[serde(rename = "montoInteres", default)]
    pub computed_interest: Decimal,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum AllocationError {
    #[error("the financed principal cannot be negative")]
    NegativePrincipal,
    #[error("capital amounts cannot be negative")]
    NegativeCapital,
    #[error("the annual rate must lie between 0 and 100")]
    RateOutOfRange,
}

/// Fills `computed_interest` for every entry of a user-authored schedule.
///
/// Interest accrues on the declining financed balance as simple daily
/// interest from `reference_date`. The entries arrive in whatever order the
/// user typed them; the balance walk sorts a copy of the indices by due date
/// (stable, so same-day entries keep their typed order) and scatters the
/// results back onto the original positions. The returned list is a new one
/// in the caller's order with only `computed_interest` changed.
///
/// Entries due on or before the reference date accrue nothing, as does
/// anything after the capital amounts have exhausted the balance.
///
/// The walk depends on the full chronology, so the list recomputes from
/// scratch whenever the rate, the reference date or any entry changes.
pub fn allocate_interest(
    entries: &[CustomEntry],
    financed_principal: Decimal,
    annual_rate_percent: Decimal,
    reference_date: NaiveDate,
    apply_interest: bool,
) -> Result<Vec<CustomEntry>, AllocationError> {
    if financed_principal < Decimal::ZERO {
        return Err(AllocationError::NegativePrincipal);
    }
    if entries.iter().any(|e| e.capital_amount < Decimal::ZERO) {
        return Err(AllocationError::NegativeCapital);
    }

    let mut allocated: Vec<CustomEntry> = entries.to_vec();

    if !apply_interest || annual_rate_percent.is_zero() {
        for entry in &mut allocated {
            entry.computed_interest = Decimal::new(0, 2);
        }
        return Ok(allocated);
    }

    if annual_rate_percent < Decimal::ZERO || annual_rate_percent > Decimal::from(100) {
        return Err(AllocationError::RateOutOfRange);
    }

    let daily_rate = annual_rate_percent / Decimal::from(365) / Decimal::from(100);

    // Chronological order for the balance walk, without disturbing the
    // caller's list.
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| entries[i].due_date);

    debug!(
        "allocating interest across {} entries from {} at {}% annual",
        entries.len(),
        reference_date,
        annual_rate_percent
    );

    let mut balance = financed_principal;
    for i in order {
        let entry = &entries[i];
        let days = (entry.due_date - reference_date).num_days();
        let interest = if days > 0 && balance > Decimal::ZERO {
            round_cents(balance * daily_rate * Decimal::from(days))
        } else {
            Decimal::new(0, 2)
        };

        trace!(
            "entry {} due {}: {} days on balance {} -> interest {}",
            i,
            entry.due_date,
            days,
            balance,
            interest
        );

        allocated[i].computed_interest = interest;
        balance -= entry.capital_amount;
    }

    Ok(allocated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(capital: Decimal, due: NaiveDate) -> CustomEntry {
        CustomEntry {
            capital_amount: capital,
            due_date: due,
            computed_interest: Decimal::ZERO,
        }
    }

    #[test]
    fn walks_by_date_but_preserves_input_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        let entries = vec![
            entry(dec!(100), date(2024, 3, 1)),
            entry(dec!(200), date(2024, 1, 1)),
        ];

        let allocated =
            allocate_interest(&entries, dec!(300), dec!(12), date(2024, 1, 1), true).unwrap();

        assert_eq!(allocated.len(), 2);
        // Caller's order survives: index 0 is still the March entry.
        assert_eq!(allocated[0].due_date, date(2024, 3, 1));
        assert_eq!(allocated[1].due_date, date(2024, 1, 1));

        // The January entry goes first in the walk and accrues 0 days; the
        // March entry accrues 60 days on the remaining 100.
        assert_eq!(allocated[1].computed_interest, dec!(0));
        assert_eq!(allocated[0].computed_interest, dec!(1.97));
    }

    #[test]
    fn no_interest_when_not_applied() {
        let entries = vec![
            entry(dec!(100), date(2024, 3, 1)),
            entry(dec!(200), date(2024, 1, 1)),
        ];

        let allocated =
            allocate_interest(&entries, dec!(300), dec!(12), date(2024, 1, 1), false).unwrap();

        assert!(allocated
            .iter()
            .all(|e| e.computed_interest == Decimal::ZERO));
        assert_eq!(allocated[0].due_date, date(2024, 3, 1));
    }

    #[test]
    fn same_day_entries_keep_typed_order() {
        let due = date(2024, 2, 1);
        let entries = vec![entry(dec!(100), due), entry(dec!(100), due)];

        let allocated =
            allocate_interest(&entries, dec!(200), dec!(12), date(2024, 1, 1), true).unwrap();

        // The first-typed entry sees the full balance, the second only what
        // remains after it.
        assert!(allocated[0].computed_interest > allocated[1].computed_interest);
    }

    #[test]
    fn entries_before_the_reference_accrue_nothing_but_reduce_the_balance() {
        let entries = vec![
            entry(dec!(200), date(2023, 12, 1)),
            entry(dec!(100), date(2024, 1, 31)),
        ];

        let allocated =
            allocate_interest(&entries, dec!(300), dec!(12), date(2024, 1, 1), true).unwrap();

        assert_eq!(allocated[0].computed_interest, dec!(0));
        // 30 days on the remaining 100 at 12% / 365.
        assert_eq!(allocated[1].computed_interest, dec!(0.99));
    }

    #[test]
    fn exhausted_balance_accrues_nothing() {
        let entries = vec![
            entry(dec!(300), date(2024, 1, 31)),
            entry(dec!(100), date(2024, 3, 1)),
        ];

        let allocated =
            allocate_interest(&entries, dec!(300), dec!(12), date(2024, 1, 1), true).unwrap();

        assert!(allocated[0].computed_interest > Decimal::ZERO);
        assert_eq!(allocated[1].computed_interest, dec!(0));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let entries = vec![
            entry(dec!(150), date(2024, 4, 10)),
            entry(dec!(150), date(2024, 2, 10)),
        ];

        let first =
            allocate_interest(&entries, dec!(300), dec!(10), date(2024, 1, 10), true).unwrap();
        let second =
            allocate_interest(&entries, dec!(300), dec!(10), date(2024, 1, 10), true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn validation() {
        let entries = vec![entry(dec!(-1), date(2024, 1, 1))];
        assert_eq!(
            allocate_interest(&entries, dec!(100), dec!(12), date(2024, 1, 1), true),
            Err(AllocationError::NegativeCapital)
        );

        assert_eq!(
            allocate_interest(&[], dec!(-100), dec!(12), date(2024, 1, 1), true),
            Err(AllocationError::NegativePrincipal)
        );

        assert_eq!(
            allocate_interest(&[], dec!(100), dec!(101), date(2024, 1, 1), true),
            Err(AllocationError::RateOutOfRange)
        );
    }

    #[test]
    fn serializes_with_downstream_field_names() {
        let allocated = allocate_interest(
            &[entry(dec!(100.50), date(2024, 2, 1))],
            dec!(100.50),
            dec!(12),
            date(2024, 1, 1),
            true,
        )
        .unwrap();

        let value = serde_json::to_value(&allocated).unwrap();
        assert_eq!(value[0]["montoCapital"], serde_json::json!("100.50"));
        assert_eq!(value[0]["fechaVencimiento"], serde_json::json!("2024-02-01"));
        assert_eq!(value[0]["montoInteres"], serde_json::json!("1.02"));
    }
}
