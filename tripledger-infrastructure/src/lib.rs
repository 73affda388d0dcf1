#![warn(clippy::uninlined_format_args)]

pub mod clock;
pub mod json_store;
pub mod memory_store;
pub mod rate_source;

pub use clock::SystemClock;
pub use json_store::JsonFileTripStore;
pub use memory_store::InMemoryTripStore;
pub use rate_source::{DEFAULT_RATE_ENDPOINT, ErApiRateSource, parse_multipliers};
