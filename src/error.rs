use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Style error: {0}")]
    Style(#[from] vcss::VcssError),

    #[error("Configuration error: {0}")]
    Config(#[from] viewport::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] viewport::StoreError),
}

// Create a type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
