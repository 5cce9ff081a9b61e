pub mod metrics;
pub mod pair;

// Re-export commonly used types
pub use metrics::{HighestVolumePair, PairTotals, TokenAnalysis, TokenMetrics};
pub use pair::PairRecord;
