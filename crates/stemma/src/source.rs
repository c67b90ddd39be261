//! Where the genealogy document comes from.
//!
//! Loading is the only asynchronous step of a session; everything after it runs synchronously.

use crate::{Result, ViewerError};
use std::path::PathBuf;

#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    /// Returns the raw JSON text of the document.
    async fn load(&self) -> Result<String>;
}

/// Reads the document from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileSource {
    async fn load(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|err| ViewerError::DataLoad {
            message: format!("could not load {} ({err})", self.path.display()),
        })
    }
}

/// An already-fetched response: a status code and a body.
///
/// Any status outside `200..300` is a load failure, regardless of the body.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    status: u16,
    body: String,
}

impl StaticSource {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            name: "data.json".to_string(),
            status,
            body: body.into(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl DocumentSource for StaticSource {
    async fn load(&self) -> Result<String> {
        if !(200..300).contains(&self.status) {
            return Err(ViewerError::DataLoad {
                message: format!("could not load {} (HTTP {})", self.name, self.status),
            });
        }
        Ok(self.body.clone())
    }
}
