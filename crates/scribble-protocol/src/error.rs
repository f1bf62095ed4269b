//! Error types for the protocol layer.
//!
//! Each crate in Scribble defines its own error enum. When you see a
//! `ProtocolError`, the problem is in (de)serialization or in a value that
//! violates a wire-level rule, not in networking or room state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `event` name, missing
    /// required fields, or a room code that fails validation.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that is empty, too long, or contains characters
    /// outside `[A-Za-z0-9_-]`.
    #[error("invalid room code {0:?}")]
    InvalidRoomCode(String),
}
