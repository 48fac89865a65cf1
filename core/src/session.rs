//! Session and authorization state.
//!
//! # Design
//! `Session` pairs a `TokenStore` with the login state machine:
//! `Anonymous`, `Validating`, `Authenticated(role)`. Like the client, it
//! never touches the network itself — restore and login are split into a
//! step that produces the request and a step that consumes the response,
//! so every transition is a pure function of the response the host hands
//! back.
//!
//! A stored token is purged only when the backend confirms it is invalid
//! (401/403 from the identity check). A transport failure leaves the token
//! in place so a transient outage does not log the user out of the next
//! run.
//!
//! Persistence failures never fail an otherwise successful login; they are
//! logged and the session continues in memory.

use crate::client::PetClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::store::TokenStore;
use crate::types::{Credentials, Registration, Role};

/// Login state. `Validating` only occurs during startup restore, between
/// `restore` and `complete_restore`/`fail_restore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Validating,
    Authenticated(Role),
}

/// The process-wide session: current state plus the store the token
/// survives restarts in.
#[derive(Debug)]
pub struct Session<S: TokenStore> {
    store: S,
    state: SessionState,
}

impl<S: TokenStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn current_role(&self) -> Option<Role> {
        match self.state {
            SessionState::Authenticated(role) => Some(role),
            _ => None,
        }
    }

    /// Navigation guard: protected actions call this before running and
    /// redirect to the login entry point on `Err`.
    pub fn require_login(&self) -> Result<Role, ApiError> {
        self.current_role().ok_or(ApiError::Forbidden {
            required: Role::Adotante,
        })
    }

    /// Role gate for ONG-only actions. Holds regardless of what the UI
    /// shows.
    pub fn require_role(&self, required: Role) -> Result<(), ApiError> {
        match self.current_role() {
            Some(role) if role == required => Ok(()),
            _ => Err(ApiError::Forbidden { required }),
        }
    }

    /// Begin startup restore. With a stored token the session enters
    /// `Validating`, installs the token on the client, and returns the
    /// identity-check request for the host to execute. Without one the
    /// session is `Anonymous` and no request is made.
    pub fn restore(&mut self, client: &mut PetClient) -> Option<HttpRequest> {
        let stored = self.store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read stored token");
            None
        });
        match stored {
            Some(token) => {
                client.set_token(Some(token));
                self.state = SessionState::Validating;
                Some(client.build_me())
            }
            None => {
                self.state = SessionState::Anonymous;
                None
            }
        }
    }

    /// Finish restore with the identity-check response. Success yields
    /// `Authenticated(role)`. A confirmed rejection (401/403) purges the
    /// stored token; any other failure keeps it for the next run. Either
    /// way a failed restore ends `Anonymous`.
    pub fn complete_restore(
        &mut self,
        client: &mut PetClient,
        response: HttpResponse,
    ) -> Result<Role, ApiError> {
        match client.parse_me(response) {
            Ok(identity) => {
                self.state = SessionState::Authenticated(identity.role);
                tracing::debug!(role = %identity.role, "session restored");
                Ok(identity.role)
            }
            Err(err) => {
                if err.is_auth_rejection() {
                    tracing::debug!("stored token rejected, purging");
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "failed to purge stored token");
                    }
                }
                client.set_token(None);
                self.state = SessionState::Anonymous;
                Err(err)
            }
        }
    }

    /// Finish restore after a transport failure: anonymous for this run,
    /// stored token untouched.
    pub fn fail_restore(&mut self, client: &mut PetClient) {
        tracing::debug!("identity check unreachable, staying anonymous");
        client.set_token(None);
        self.state = SessionState::Anonymous;
    }

    pub fn login(
        &self,
        client: &PetClient,
        credentials: &Credentials,
    ) -> Result<HttpRequest, ApiError> {
        client.build_login(credentials)
    }

    pub fn complete_login(
        &mut self,
        client: &mut PetClient,
        response: HttpResponse,
    ) -> Result<Role, ApiError> {
        let auth = client.parse_login(response)?;
        self.enter(client, auth.token, auth.role);
        Ok(auth.role)
    }

    pub fn register(
        &self,
        client: &PetClient,
        registration: &Registration,
    ) -> Result<HttpRequest, ApiError> {
        client.build_register(registration)
    }

    pub fn complete_register(
        &mut self,
        client: &mut PetClient,
        response: HttpResponse,
    ) -> Result<Role, ApiError> {
        let auth = client.parse_register(response)?;
        self.enter(client, auth.token, auth.role);
        Ok(auth.role)
    }

    /// Explicit logout: token gone from client and store, state
    /// `Anonymous`.
    pub fn logout(&mut self, client: &mut PetClient) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
        client.set_token(None);
        self.state = SessionState::Anonymous;
    }

    fn enter(&mut self, client: &mut PetClient, token: String, role: Role) {
        if let Err(e) = self.store.save(&token) {
            tracing::warn!(error = %e, "failed to persist token");
        }
        client.set_token(Some(token));
        self.state = SessionState::Authenticated(role);
        tracing::debug!(role = %role, "session authenticated");
    }
}
