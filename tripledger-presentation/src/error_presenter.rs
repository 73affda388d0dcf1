use tripledger_application::{LedgerError, StoreError};
use tripledger_i18n as i18n;

pub fn format_ledger_error(error: &LedgerError) -> String {
    match error {
        LedgerError::Validation(detail) => i18n::invalid_expense(detail),
        LedgerError::ExpenseNotFound(id) => i18n::expense_not_found(id),
        LedgerError::RateEdit(detail) => i18n::invalid_rate(detail),
        LedgerError::Settlement(detail) => i18n::invalid_settlement(detail),
        LedgerError::ShareMismatch { .. } => i18n::invalid_settlement(error),
        LedgerError::RateRefresh(detail) => i18n::rate_refresh_failed(detail),
    }
}

pub fn format_write_failure(error: &StoreError) -> String {
    i18n::write_not_saved(error)
}
