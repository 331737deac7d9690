pub mod cache;
pub mod provider;

pub use cache::CachedReturnsProvider;
pub use provider::{ReturnsProvider, YahooChartProvider};
