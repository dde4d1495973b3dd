//! Error types for the state registry and persistence paths.
//!
//! Programmer errors (duplicate scope names) surface at registration time;
//! persistence errors carry the owning scope name for diagnosis. Expected
//! absences (no previous snapshot, no subscribers) are ordinary control flow
//! and never appear here.

/// Errors surfaced while registering state scopes.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two features tried to claim the same scope name. Each named scope has
    /// exactly one owner; this is a bug in the registering feature.
    #[error("save data scope \"{0}\" is already registered")]
    DuplicateScope(&'static str),
}

/// Errors surfaced while snapshotting or restoring registered scopes.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to serialize scope \"{name}\": {source}")]
    Serialize {
        name: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to deserialize scope \"{name}\": {source}")]
    Deserialize {
        name: &'static str,
        source: serde_json::Error,
    },

    /// The restored payload was not a map of scope chunks.
    #[error("save payload is not an object")]
    MalformedPayload,
}
