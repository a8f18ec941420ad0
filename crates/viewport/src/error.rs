use thiserror::Error;

/// Invalid breakpoint configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No breakpoints configured")]
    NoBreakpoints,

    #[error("Breakpoints must include the base viewport 0")]
    MissingBaseBreakpoint,

    #[error("Invalid breakpoint '{0}': expected a pixel width")]
    InvalidBreakpoint(String),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown block '{0}'")]
    UnknownBlock(String),

    #[error("CSS error: {0}")]
    Css(#[from] vcss::VcssError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
