//! Pure wallet arithmetic. Every mutation of a wallet row goes through
//! [`apply`] so the balance and the running totals move together.
use models::wallet_transaction::TxnKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Balances {
    pub balance_cents: i64,
    pub total_added_cents: i64,
    pub total_spent_cents: i64,
    pub total_refunded_cents: i64,
}

impl From<&models::wallet::Model> for Balances {
    fn from(w: &models::wallet::Model) -> Self {
        Self {
            balance_cents: w.balance_cents,
            total_added_cents: w.total_added_cents,
            total_spent_cents: w.total_spent_cents,
            total_refunded_cents: w.total_refunded_cents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    NonPositiveAmount(i64),
    Insufficient { available_cents: i64, required_cents: i64 },
    Overflow,
}

/// Balances after posting `amount_cents` of `kind`.
///
/// Credits grow `total_added`, debits grow `total_spent`, refunds grow
/// `total_refunded`; totals never shrink.
pub fn apply(current: Balances, kind: TxnKind, amount_cents: i64) -> Result<Balances, LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::NonPositiveAmount(amount_cents));
    }
    let mut next = current;
    match kind {
        TxnKind::Credit => {
            next.balance_cents = current.balance_cents.checked_add(amount_cents).ok_or(LedgerError::Overflow)?;
            next.total_added_cents = current.total_added_cents.checked_add(amount_cents).ok_or(LedgerError::Overflow)?;
        }
        TxnKind::Refund => {
            next.balance_cents = current.balance_cents.checked_add(amount_cents).ok_or(LedgerError::Overflow)?;
            next.total_refunded_cents = current.total_refunded_cents.checked_add(amount_cents).ok_or(LedgerError::Overflow)?;
        }
        TxnKind::Debit => {
            if current.balance_cents < amount_cents {
                return Err(LedgerError::Insufficient {
                    available_cents: current.balance_cents,
                    required_cents: amount_cents,
                });
            }
            next.balance_cents = current.balance_cents - amount_cents;
            next.total_spent_cents = current.total_spent_cents.checked_add(amount_cents).ok_or(LedgerError::Overflow)?;
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_then_debit() {
        let b = apply(Balances::default(), TxnKind::Credit, 5_000).unwrap();
        assert_eq!(b.balance_cents, 5_000);
        assert_eq!(b.total_added_cents, 5_000);
        let b = apply(b, TxnKind::Debit, 1_500).unwrap();
        assert_eq!(b.balance_cents, 3_500);
        assert_eq!(b.total_spent_cents, 1_500);
        assert_eq!(b.total_added_cents, 5_000);
    }

    #[test]
    fn debit_beyond_balance_is_rejected() {
        let b = Balances { balance_cents: 100, ..Balances::default() };
        assert_eq!(
            apply(b, TxnKind::Debit, 101),
            Err(LedgerError::Insufficient { available_cents: 100, required_cents: 101 })
        );
        assert_eq!(apply(b, TxnKind::Debit, 100).unwrap().balance_cents, 0);
    }

    #[test]
    fn refund_tracks_its_own_total() {
        let b = apply(Balances::default(), TxnKind::Refund, 700).unwrap();
        assert_eq!(b.balance_cents, 700);
        assert_eq!(b.total_refunded_cents, 700);
        assert_eq!(b.total_added_cents, 0);
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        assert!(matches!(apply(Balances::default(), TxnKind::Credit, 0), Err(LedgerError::NonPositiveAmount(0))));
        assert!(apply(Balances::default(), TxnKind::Refund, -5).is_err());
    }

    #[test]
    fn overflow_is_caught() {
        let b = Balances { balance_cents: i64::MAX, ..Balances::default() };
        assert_eq!(apply(b, TxnKind::Credit, 1), Err(LedgerError::Overflow));
    }
}
