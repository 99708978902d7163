pub mod format;
pub mod state;

pub use format::{ChartPoint, ConfidenceTier, chart_points, display_name, format_percent};
pub use state::{AnalyzerState, ReplyOutcome, ServiceFailure};
