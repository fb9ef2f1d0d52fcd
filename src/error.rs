//! Error types for asset loading, composition and rendering
//!
//! The loader reports [`LoadError`]; everything a caller of
//! [`ModelViewer`](crate::viewer::ModelViewer) can observe is folded into
//! [`ViewerError`].

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the asset loader itself
#[derive(Debug, Error)]
pub enum LoadError {
    /// The asset could not be read from its location
    #[error("asset not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes were read but are not a usable 3D asset
    #[error("failed to decode asset {}: {reason}", path.display())]
    DecodeFailed { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LoadError::DecodeFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Path of the asset that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound { path, .. } | LoadError::DecodeFailed { path, .. } => path,
        }
    }
}

/// Failure while building the paired presentation
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("composed group has no measurable extent")]
    DegenerateGroup,

    #[error("composition produced a non-finite transform ({0})")]
    NonFinite(&'static str),
}

/// GPU setup or frame submission failure
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface frame unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("pipeline '{pipeline}' references unknown shader '{shader}'")]
    MissingShader { pipeline: String, shader: String },
}

/// Everything a viewer operation can report to its caller
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("asset not found: {}", path.display())]
    AssetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode asset {}: {reason}", path.display())]
    AssetDecodeFailed { path: PathBuf, reason: String },

    /// The asset was presented at the origin without scale correction
    #[error("asset {} has no measurable geometry; placed unscaled at the origin", path.display())]
    EmptyGeometry { path: PathBuf },

    #[error("failed to compose {}: {source}", path.display())]
    CompositionFailed {
        path: PathBuf,
        #[source]
        source: ComposeError,
    },

    #[error("a load is already in progress ({})", in_flight.display())]
    LoadInProgress { in_flight: PathBuf },

    #[error("load #{id} is not the load in flight")]
    StaleLoad { id: u64 },

    #[error("viewer has been disposed")]
    Disposed,

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<LoadError> for ViewerError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound { path, source } => ViewerError::AssetNotFound { path, source },
            LoadError::DecodeFailed { path, reason } => {
                ViewerError::AssetDecodeFailed { path, reason }
            }
        }
    }
}

impl ViewerError {
    /// True for the failures that come out of a load attempt
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            ViewerError::AssetNotFound { .. }
                | ViewerError::AssetDecodeFailed { .. }
                | ViewerError::EmptyGeometry { .. }
                | ViewerError::CompositionFailed { .. }
        )
    }
}
