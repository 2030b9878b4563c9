use thiserror::Error;

/// Failures while bringing the app up. Nothing in the per-frame path errors.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("window setup failed: {0}")]
    Window(String),

    #[error("missing DOM object: {0}")]
    Dom(&'static str),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
