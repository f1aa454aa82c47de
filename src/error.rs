#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to encode or decode stories: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("persistence backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown story kind {0:?}")]
pub struct UnknownKind(pub String);

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("malformed {0} command")]
    Malformed(&'static str),
    #[error("invalid story id {0:?}")]
    InvalidId(String),
    #[error("unknown story kind {0:?}")]
    InvalidKind(String),
}
