//! Episode reconciliation: which episodes a show's range covers, which of
//! them are still needed, and whether a parsed release satisfies one.

pub mod ledger;
pub mod matcher;
pub mod range;

pub use ledger::{acquire, needed_episodes, needed_in_order, recompute, recompute_all};
pub use matcher::{batch_episodes, matches, normalize_show_name};
pub use range::enumerate;
