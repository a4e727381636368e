//! Account types
//!
//! Account numbers are 10-digit integers; an account is its number plus a
//! non-negative balance.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Balance;

/// Smallest 10-digit account number
pub const MIN_ACCOUNT_ID: i64 = 1_000_000_000;

/// Largest 10-digit account number
pub const MAX_ACCOUNT_ID: i64 = 9_999_999_999;

/// Account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw account number. Values outside the 10-digit range are
    /// accepted so that lookups of bogus numbers report "not found".
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Draw a candidate account number uniformly from the 10-digit range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(MIN_ACCOUNT_ID..=MAX_ACCOUNT_ID))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether this number lies in the range the registry allocates from.
    pub fn is_well_formed(&self) -> bool {
        (MIN_ACCOUNT_ID..=MAX_ACCOUNT_ID).contains(&self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for AccountId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Point-in-time view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_ten_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let id = AccountId::random(&mut rng);
            assert!(id.is_well_formed());
            assert_eq!(id.to_string().len(), 10);
        }
    }

    #[test]
    fn test_parse_account_id() {
        let id: AccountId = "1234567890".parse().unwrap();
        assert_eq!(id.value(), 1_234_567_890);
        assert!("12ab".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_short_ids_are_not_well_formed() {
        assert!(!AccountId::new(42).is_well_formed());
        assert!(AccountId::new(MAX_ACCOUNT_ID).is_well_formed());
    }
}
