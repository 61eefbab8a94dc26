//! Progress aggregation and throttling.

mod aggregator;
mod throttle;

pub use aggregator::{ProgressAggregator, ProgressSnapshot, TaskProgress};
pub use throttle::ProgressThrottle;
