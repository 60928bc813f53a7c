use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpError {
    #[error("Access error: {0}")]
    Access(String),
    #[error("Asset error: {0}")]
    Asset(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Composition error: {0}")]
    Composition(String),
    #[error("Normalization error: {0}")]
    Normalization(String),
    #[error("Optimization error: {0}")]
    Optimization(String),
    #[error("No route for identifier {id}")]
    RouteNotFound { id: u32 },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SpError>;
