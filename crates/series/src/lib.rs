pub mod dedup;
pub mod merge;
pub mod normalize;
pub mod series;

pub use dedup::DedupPolicy;
pub use merge::merge;
pub use normalize::{normalize, normalize_with};
pub use series::{Series, SeriesError};
