#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_service;
pub mod model;
pub mod ports;

pub use error::{LedgerError, RateRefreshError, StoreError};
pub use ledger_service::LedgerService;
pub use model::{
    Field, FieldValue, Mutation, ShareToggle, TripDocument, TripSnapshot, WriteStatus,
};
pub use ports::{Clock, FieldStream, MemberDirectory, RateSource, TripStore};
