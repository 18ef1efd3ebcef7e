use thiserror::Error;

/// GPU layer failure.
///
/// Creation failures are fatal at initialization time; callers propagate them
/// up to the host, which aborts startup.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("failed to create {kind} `{label}`")]
    CreationFailed { kind: &'static str, label: String },
}

impl GfxError {
    pub(crate) fn creation(kind: &'static str, label: impl Into<String>) -> Self {
        Self::CreationFailed { kind, label: label.into() }
    }
}
