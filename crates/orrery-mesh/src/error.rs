//! Mesh generation error types.

/// Errors returned by the mesh generators.
///
/// Generation is total over valid input, so the only failure is a rejected
/// argument. No partial buffers are ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// A generator argument is outside its valid domain.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the rejected parameter.
        name: &'static str,
        /// Human-readable description of the constraint that failed.
        reason: String,
    },
}

impl MeshError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_parameter() {
        let err = MeshError::invalid("split", "must be at least 3, got 2");
        let msg = err.to_string();
        assert!(msg.contains("split"));
        assert!(msg.contains("at least 3"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshError>();
    }
}
