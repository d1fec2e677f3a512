pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod logging;
pub mod windows;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use errors::AppError;
pub use infrastructure::container::{global, CapabilityKey, Container, Key, Lifetime, ResolveError};
pub use infrastructure::factory::{FactoryError, WindowFactory};
