pub mod backend;
pub mod config;
pub mod enhance;
pub mod store;

pub use backend::BackendError;
pub use config::ConfigError;
pub use enhance::{BACKEND_PROVIDER, EnhanceError, EnhanceErrorKind};
pub use store::StoreError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Enhance(#[from] enhance::EnhanceError),

    #[error(transparent)]
    Backend(#[from] backend::BackendError),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
