#![warn(clippy::uninlined_format_args)]

pub mod archive;
pub mod booking;
pub mod currency;
pub mod ledger;
pub mod model;
pub mod services;

pub use archive::{Repayment, SettlementArchive, SettlementRecordError};
pub use booking::{
    ActivityDetails, Booking, BookingDetails, FlightDetails, HotelDetails, TicketDetails,
};
pub use currency::{CurrencyCode, CurrencyRateTable, RateEditError, RateMap};
pub use ledger::{ExpenseDraft, ExpenseEditError, ExpenseLedger, ExpenseValidationError};
pub use model::{
    ArchivedSettlement, Category, Expense, ExpenseId, Member, MemberBalances, MemberId, Money,
    SettlementId, SettlementScope, Transfer, apply_transfers,
};
pub use services::{
    AnalyticsAggregator, BalanceCalculator, CategoryBreakdown, CategoryShare, SETTLEMENT_EPSILON,
    SettlementPlanner, ShareStatus, ShareStatusResolver, Viewpoint,
};
