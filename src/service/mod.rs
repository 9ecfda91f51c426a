pub mod gdp;
pub mod query;
pub mod refresh;
pub mod summary;

pub use gdp::{GdpEstimator, MultiplierSource};
pub use query::QueryService;
pub use refresh::RefreshService;
pub use summary::SummaryRenderer;
