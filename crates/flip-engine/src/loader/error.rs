use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::GfxError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode `{}`", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to upload `{}`", path.display())]
    Gpu {
        path: PathBuf,
        #[source]
        source: GfxError,
    },

    #[error("loader worker is gone; `{}` was not queued", path.display())]
    WorkerGone { path: PathBuf },

    #[error("loader returned the wrong payload kind for `{}`", path.display())]
    WrongPayload { path: PathBuf },
}
