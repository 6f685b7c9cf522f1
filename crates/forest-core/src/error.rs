use thiserror::Error;

/// Everything that can reject a generation request.
///
/// Generation never produces a partial result: either the full skeleton and
/// both meshes come out, or one of these is returned before anything is built.
#[derive(Debug, Error)]
pub enum ForestError {
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("configuration would generate up to {estimated} nodes, limit is {limit}")]
    TooManyNodes { estimated: u64, limit: u64 },

    #[error("node {node} has non-finite geometry")]
    NonFiniteGeometry { node: usize },

    #[error("mesh of {vertices} vertices cannot be indexed with 32 bits")]
    IndexOverflow { vertices: usize },

    #[error("malformed skeleton: {0}")]
    MalformedSkeleton(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ForestError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForestError>;
