pub mod metrics;
pub mod request;
pub mod series;

pub use metrics::{MetricCard, MetricCards, MetricKind, MetricSnapshot};
pub use request::AnalysisRequest;
pub use series::{ReturnPoint, ReturnSeries};
