use crate::device::DeviceError;

/// Failure raised while checking, parsing or executing a directive.
///
/// `InvalidArgument` is user-correctable: it becomes a delivered failure with
/// remediation guidance. Everything else is operational and stays silent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("{0}")]
    Operational(String),
}

impl CommandError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
