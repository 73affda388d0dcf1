pub mod analytics_aggregator;
pub mod balance_calculator;
pub mod settlement_planner;
pub mod share_status;

pub use analytics_aggregator::{AnalyticsAggregator, CategoryBreakdown, CategoryShare, Viewpoint};
pub use balance_calculator::BalanceCalculator;
pub use settlement_planner::{SETTLEMENT_EPSILON, SettlementPlanner};
pub use share_status::{ShareStatus, ShareStatusResolver};
