pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod service;
pub mod types;

pub use error::{CountryError, UpstreamSource};
pub use router::{AppState, country_router};
