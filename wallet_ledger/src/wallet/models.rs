//! Wallet data models.

use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::errors::{WalletError, WalletResult};

/// Wallet model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Internal surrogate key assigned by the store
    #[serde(skip_serializing, default)]
    pub id: i64,
    pub uuid: Uuid,
    pub balance: i64,
}

impl Wallet {
    /// A freshly created wallet has an empty balance.
    pub fn new(id: i64, uuid: Uuid) -> Self {
        Self {
            id,
            uuid,
            balance: 0,
        }
    }
}

/// Kind of balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "DEPOSIT",
            OperationKind::Withdraw => "WITHDRAW",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEPOSIT" => Ok(OperationKind::Deposit),
            "WITHDRAW" => Ok(OperationKind::Withdraw),
            _ => Err(WalletError::InvalidOperation(s.to_string())),
        }
    }
}

// Accepts any casing, e.g. "deposit" or "Withdraw".
impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single deposit or withdraw request against one wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletOperation {
    pub operation_type: OperationKind,
    pub amount: i64,
}

impl WalletOperation {
    /// Build a validated operation
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidAmount` - `amount` is negative
    pub fn new(operation_type: OperationKind, amount: i64) -> WalletResult<Self> {
        let operation = Self {
            operation_type,
            amount,
        };
        operation.validate()?;
        Ok(operation)
    }

    pub fn deposit(amount: i64) -> WalletResult<Self> {
        Self::new(OperationKind::Deposit, amount)
    }

    pub fn withdraw(amount: i64) -> WalletResult<Self> {
        Self::new(OperationKind::Withdraw, amount)
    }

    /// Reject malformed operations before any storage interaction
    pub fn validate(&self) -> WalletResult<()> {
        if self.amount < 0 {
            return Err(WalletError::InvalidAmount(self.amount));
        }
        Ok(())
    }

    /// Compute the balance this operation would leave behind.
    ///
    /// # Errors
    ///
    /// * `WalletError::InsufficientBalance` - withdrawal exceeds `current`
    /// * `WalletError::BalanceOverflow` - deposit does not fit in an `i64`
    pub fn apply_to(&self, current: i64) -> WalletResult<i64> {
        match self.operation_type {
            OperationKind::Deposit => current
                .checked_add(self.amount)
                .ok_or(WalletError::BalanceOverflow),
            OperationKind::Withdraw => {
                if self.amount > current {
                    return Err(WalletError::InsufficientBalance {
                        available: current,
                        required: self.amount,
                    });
                }
                Ok(current - self.amount)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_case_insensitive() {
        assert_eq!("deposit".parse::<OperationKind>().unwrap(), OperationKind::Deposit);
        assert_eq!("Withdraw".parse::<OperationKind>().unwrap(), OperationKind::Withdraw);
        assert_eq!("DEPOSIT".parse::<OperationKind>().unwrap(), OperationKind::Deposit);
    }

    #[test]
    fn test_operation_kind_rejects_unknown() {
        let err = "invalid command".parse::<OperationKind>().unwrap_err();
        assert!(matches!(err, WalletError::InvalidOperation(ref s) if s == "invalid command"));
    }

    #[test]
    fn test_operation_deserialize_lowercase() {
        let op: WalletOperation =
            serde_json::from_str(r#"{"operation_type": "withdraw", "amount": 10}"#).unwrap();
        assert_eq!(op.operation_type, OperationKind::Withdraw);
        assert_eq!(op.amount, 10);
    }

    #[test]
    fn test_operation_deserialize_invalid_kind() {
        let result: Result<WalletOperation, _> =
            serde_json::from_str(r#"{"operation_type": "invalid command", "amount": 100}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = WalletOperation::deposit(-1).unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(-1)));
    }

    #[test]
    fn test_zero_amount_allowed() {
        let op = WalletOperation::withdraw(0).unwrap();
        assert_eq!(op.apply_to(0).unwrap(), 0);
    }

    #[test]
    fn test_withdraw_exact_balance() {
        let op = WalletOperation::withdraw(1000).unwrap();
        assert_eq!(op.apply_to(1000).unwrap(), 0);
    }

    #[test]
    fn test_withdraw_exceeding_balance() {
        let op = WalletOperation::withdraw(1001).unwrap();
        let err = op.apply_to(1000).unwrap_err();
        assert!(matches!(
            err,
            WalletError::InsufficientBalance {
                available: 1000,
                required: 1001
            }
        ));
    }

    #[test]
    fn test_deposit_overflow() {
        let op = WalletOperation::deposit(1).unwrap();
        assert!(matches!(op.apply_to(i64::MAX), Err(WalletError::BalanceOverflow)));
    }

    #[test]
    fn test_wallet_serialization_hides_internal_id() {
        let wallet = Wallet {
            id: 42,
            uuid: Uuid::nil(),
            balance: 7,
        };
        let json = serde_json::to_value(&wallet).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["balance"], 7);
        assert_eq!(json["uuid"], "00000000-0000-0000-0000-000000000000");
    }
}
