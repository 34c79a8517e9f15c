pub mod amount;
pub mod ledger;
pub mod maintenance;
pub mod order;
pub mod stats;

pub use ledger::{EntryType, LedgerEntry};
pub use maintenance::{ClearOptions, ClearReport};
pub use order::{Order, Payment};
pub use stats::{DashboardStats, PaymentStatus};
