use thiserror::Error;
use tripledger_domain::{
    ExpenseEditError, ExpenseId, ExpenseValidationError, MemberId, RateEditError,
    SettlementRecordError,
};

/// Failure of the shared trip store. A failed update leaves the stored field
/// as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateRefreshError {
    #[error("rate request failed: {0}")]
    Request(String),
    #[error("rate response could not be decoded: {0}")]
    Decode(String),
    #[error("rate response carried no rates")]
    MissingRates,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ExpenseValidationError),
    #[error("expense {0} does not exist")]
    ExpenseNotFound(ExpenseId),
    #[error(transparent)]
    RateEdit(#[from] RateEditError),
    #[error(transparent)]
    Settlement(#[from] SettlementRecordError),
    /// A scoped settlement must be a split member paying the expense's payer.
    #[error("{from} does not owe {to} a share of expense {expense_id}")]
    ShareMismatch {
        expense_id: ExpenseId,
        from: MemberId,
        to: MemberId,
    },
    #[error(transparent)]
    RateRefresh(#[from] RateRefreshError),
}

impl From<ExpenseEditError> for LedgerError {
    fn from(value: ExpenseEditError) -> Self {
        match value {
            ExpenseEditError::Validation(err) => Self::Validation(err),
            ExpenseEditError::NotFound(id) => Self::ExpenseNotFound(id),
        }
    }
}
