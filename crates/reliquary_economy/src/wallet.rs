//! # Wallet
//!
//! A single non-negative currency counter, mutated only through
//! [`Wallet::add`] and [`Wallet::spend`].

use crate::error::{EconomyError, EconomyResult};
use crate::events::{ChangeReceiver, ChangeSignal, ChangeTopic};

/// Player currency.
#[derive(Clone, Debug, Default)]
pub struct Wallet {
    amount: u64,
    signal: ChangeSignal,
}

impl Wallet {
    /// Creates a wallet holding `amount`.
    #[must_use]
    pub fn new(amount: u64) -> Self {
        Self {
            amount,
            signal: ChangeSignal::new(),
        }
    }

    /// Subscribes to [`ChangeTopic::WalletChanged`].
    pub fn subscribe(&mut self) -> ChangeReceiver {
        self.signal.subscribe()
    }

    /// Current balance.
    #[inline]
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    /// Adds currency, saturating at `u64::MAX`. Returns the new balance.
    pub fn add(&mut self, amount: u64) -> u64 {
        if amount > 0 {
            self.amount = self.amount.saturating_add(amount);
            self.signal.emit(ChangeTopic::WalletChanged);
        }
        self.amount
    }

    /// Spends `amount` if the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    pub fn spend(&mut self, amount: u64) -> bool {
        if amount > self.amount {
            tracing::debug!(
                "Spend of {} rejected, balance is {}",
                amount,
                self.amount
            );
            return false;
        }
        if amount > 0 {
            self.amount -= amount;
            self.signal.emit(ChangeTopic::WalletChanged);
        }
        true
    }

    /// Spends `amount`, reporting a shortfall as an error.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` when the balance does not cover `amount`.
    pub fn try_spend(&mut self, amount: u64) -> EconomyResult<u64> {
        if self.spend(amount) {
            Ok(self.amount)
        } else {
            Err(EconomyError::InsufficientFunds {
                requested: amount,
                available: self.amount,
            })
        }
    }

    /// Overwrites the balance (used when loading a save).
    pub fn replace_amount(&mut self, amount: u64) {
        self.amount = amount;
        self.signal.emit(ChangeTopic::WalletChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_scenario() {
        let mut wallet = Wallet::new(5);
        assert!(!wallet.spend(10));
        assert_eq!(wallet.amount(), 5);
        assert!(wallet.spend(5));
        assert_eq!(wallet.amount(), 0);
    }

    #[test]
    fn test_add_notifies() {
        let mut wallet = Wallet::default();
        let rx = wallet.subscribe();
        assert_eq!(wallet.add(12), 12);
        assert_eq!(wallet.add(0), 12);
        assert_eq!(rx.drain(), vec![ChangeTopic::WalletChanged]);
    }

    #[test]
    fn test_try_spend_reports_shortfall() {
        let mut wallet = Wallet::new(3);
        assert_eq!(
            wallet.try_spend(4),
            Err(EconomyError::InsufficientFunds { requested: 4, available: 3 })
        );
        assert_eq!(wallet.try_spend(3), Ok(0));
    }

    #[test]
    fn test_add_saturates() {
        let mut wallet = Wallet::new(u64::MAX - 1);
        assert_eq!(wallet.add(10), u64::MAX);
    }
}
