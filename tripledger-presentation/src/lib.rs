#![warn(clippy::uninlined_format_args)]

pub mod booking_presenter;
pub mod breakdown_presenter;
pub mod error_presenter;
pub mod expense_presenter;
pub mod format;
pub mod rates_presenter;
pub mod settlement_presenter;
pub mod text_table;

pub use booking_presenter::BookingPresenter;
pub use breakdown_presenter::BreakdownPresenter;
pub use error_presenter::{format_ledger_error, format_write_failure};
pub use expense_presenter::ExpensePresenter;
pub use rates_presenter::RatesPresenter;
pub use settlement_presenter::{SettlementPresenter, SettlementView};
