//! Client core for the ProtegePet adoption service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and
//! testable.
//!
//! # Design
//! - `PetClient` carries only `base_url` and the current bearer token;
//!   each backend operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `Session` layers the login state machine and token persistence on top
//!   of the client; `TokenStore` is the seam between session logic and
//!   durable storage.
//! - `AdoptionForm` validates submissions before any request exists, and
//!   the adoption status lifecycle is enforced on both sides of the wire.
//! - `CepClient` handles the best-effort address lookup; its failures
//!   never block manual entry.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod adoption;
pub mod cep;
pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod store;
pub mod types;

pub use adoption::AdoptionForm;
pub use cep::{CepAddress, CepClient};
pub use client::PetClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Session, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{
    Adoption, AdoptionRequest, AdoptionStatus, Animal, AnimalPage, AnimalStatus, AnimalUpdate,
    ApiEnvelope, AuthSession, ContactMessage, Credentials, Feedback, Identity, NewAnimal, PageMeta,
    Registration, Role, Size, Species, StatusUpdate,
};
