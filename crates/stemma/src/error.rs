/// Failures that abort initialization. The `Display` text is shown verbatim on the status
/// surface.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("render target is missing: there is nothing to mount the tree on")]
    MissingRenderTarget,
    #[error("required dependency is unavailable: {name}")]
    MissingDependency { name: String },
    #[error("{message}")]
    DataLoad { message: String },
    #[error(transparent)]
    MalformedInput(#[from] stemma_core::Error),
    #[error(transparent)]
    Render(#[from] stemma_render::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
