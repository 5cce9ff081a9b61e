pub mod metrics;
pub mod narrative;
pub mod service;
pub mod slot;

pub use metrics::MetricsDeriver;
pub use narrative::NarrativeRequester;
pub use service::TokenAnalyzer;
pub use slot::AnalysisSlot;
