pub mod catalog;
pub mod release;
pub mod show;

pub use catalog::{Catalog, KnownShow, SeasonLengths};
pub use release::{Candidate, ParsedRelease};
pub use show::{ShowForm, TrackedShow};
