#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("code is {size} bytes, exceeding the {limit} byte limit")]
    CodeTooLarge { size: usize, limit: usize },

    #[error("failed to stage code: {0}")]
    StageFailed(String),

    #[error("failed to start interpreter: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_too_large_names_both_sizes() {
        let err = SandboxError::CodeTooLarge {
            size: 2048,
            limit: 1024,
        };
        assert_eq!(
            err.to_string(),
            "code is 2048 bytes, exceeding the 1024 byte limit"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SandboxError = io.into();
        assert!(matches!(err, SandboxError::Io(_)));
        assert_eq!(err.to_string(), "IO error: denied");
    }
}
