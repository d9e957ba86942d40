pub mod classifier;
pub mod sampler;
pub mod scoring;
pub mod selection;
pub mod trending;

pub use scoring::{ScoredPost, ScoringEngine};
pub use trending::{ReadEndOutcome, TrendingService};
