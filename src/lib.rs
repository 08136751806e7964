pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod shutdown;
pub mod state;

pub use error::{ApiError, ProviderError};
pub use gateway::GenerationGateway;
pub use models::Artifact;
pub use provider::{GenerationProvider, TastingService};
