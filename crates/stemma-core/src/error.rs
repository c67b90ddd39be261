pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed document at {path}: {message}")]
    MalformedInput { path: String, message: String },

    #[error("Document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown node id: {id}")]
    UnknownNode { id: usize },

    #[error("Invalid config value for `{key}`: {message}")]
    InvalidConfig { key: String, message: String },
}

impl Error {
    pub(crate) fn malformed(path: &str, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
