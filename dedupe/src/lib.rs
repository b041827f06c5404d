pub mod filter;
pub mod shared;
pub mod similarity;
pub mod stats;

pub use filter::{Admission, DuplicateFilter, EmptyKeyPolicy, RejectReason, SimilarTitle};
pub use shared::{SharedDuplicateFilter, Verdict, spawn_filter_worker};
pub use similarity::similarity_ratio;
pub use stats::FilterStats;
