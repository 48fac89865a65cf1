//! Error types for the adoption API client.
//!
//! # Design
//! Three caller-facing kinds mirror the three failure classes of the system:
//! `Validation` is raised client-side before any request is built,
//! `Request` carries whatever the backend said about a non-2xx response, and
//! `Forbidden` is the role gate. `InvalidTransition` guards the adoption
//! state machine locally so an illegal status change never reaches the wire.

use thiserror::Error;

use crate::types::{AdoptionStatus, Role};

/// Errors returned by `PetClient` build/parse methods and session guards.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required fields were missing or empty. No request was issued.
    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// The server answered with a non-2xx status. `message` is taken from
    /// the response envelope when present, otherwise `"HTTP <status>"`.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The operation is restricted to another role.
    #[error("operation requires the {required} role")]
    Forbidden { required: Role },

    /// The adoption lifecycle forbids this status change.
    #[error("adoption status cannot change from {from} to {to}")]
    InvalidTransition {
        from: AdoptionStatus,
        to: AdoptionStatus,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// True when the backend confirmed the credential is invalid, as opposed
    /// to any other kind of failure. Session restore uses this to decide
    /// whether a stored token should be purged.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Request {
                status: 401 | 403,
                ..
            }
        )
    }
}
