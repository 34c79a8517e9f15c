pub mod date_range;
pub mod maintenance;
pub mod profit;
pub mod report;
pub mod stats;

pub use date_range::{date_range_for, date_range_for_duration, DateRange, DurationTag};
pub use maintenance::{BulkMaintenance, MAX_BATCH_SIZE};
pub use profit::{adjusted_profit, has_profit_adjustments};
pub use report::write_profit_report;
pub use stats::{calculate_stats, classify_payment, PAYMENT_TOLERANCE};
