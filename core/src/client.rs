//! HTTP request builder and response parser for the adoption API.
//!
//! # Design
//! `PetClient` holds the `base_url` and the current bearer token; nothing
//! else. Each backend operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies. Once a token is set,
//! every subsequent `build_*` attaches the `authorization` header until the
//! token is cleared.
//!
//! Every response is the `{success, message, data}` envelope. On a non-2xx
//! status the envelope's `message` becomes the error; an unparseable body
//! falls back to `"HTTP <status>"`. Calls are fire-once: no retries, no
//! timeouts, no queuing.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adoption;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AdoptionRequest, AdoptionStatus, Adoption, Animal, AnimalPage, AnimalUpdate, ApiEnvelope,
    AuthSession, ContactMessage, Credentials, Feedback, Identity, NewAnimal, Registration, Role,
    StatusUpdate,
};

/// Client for the adoption API: builds requests, parses responses, and
/// carries the bearer token between calls.
#[derive(Debug, Clone)]
pub struct PetClient {
    base_url: String,
    token: Option<String>,
}

impl PetClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Install or remove the bearer token. Every request built after this
    /// call reflects the new value.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if with_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = &self.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: self.headers(false),
            body: None,
        }
    }

    fn send_json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: self.headers(true),
            body: Some(body),
        })
    }

    // --- animals ---

    pub fn build_list_animals(&self, page: u32, per_page: u32) -> HttpRequest {
        self.get(format!(
            "{}/animals?page={page}&per_page={per_page}",
            self.base_url
        ))
    }

    pub fn parse_list_animals(&self, response: HttpResponse) -> Result<AnimalPage, ApiError> {
        parse_data(response)
    }

    pub fn build_get_animal(&self, id: i64) -> HttpRequest {
        self.get(format!("{}/animals/{id}", self.base_url))
    }

    pub fn parse_get_animal(&self, response: HttpResponse) -> Result<Animal, ApiError> {
        parse_data(response)
    }

    pub fn build_create_animal(&self, input: &NewAnimal) -> Result<HttpRequest, ApiError> {
        self.send_json(HttpMethod::Post, format!("{}/animals", self.base_url), input)
    }

    pub fn parse_create_animal(&self, response: HttpResponse) -> Result<Animal, ApiError> {
        parse_data(response)
    }

    pub fn build_update_animal(
        &self,
        id: i64,
        input: &AnimalUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.send_json(
            HttpMethod::Put,
            format!("{}/animals/{id}", self.base_url),
            input,
        )
    }

    pub fn parse_update_animal(&self, response: HttpResponse) -> Result<Animal, ApiError> {
        parse_data(response)
    }

    pub fn build_delete_animal(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/animals/{id}", self.base_url),
            headers: self.headers(false),
            body: None,
        }
    }

    pub fn parse_delete_animal(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }

    // --- adoptions ---

    /// Fails with `Validation` (and builds nothing) when any required field
    /// of the payload is empty.
    pub fn build_create_adoption(&self, input: &AdoptionRequest) -> Result<HttpRequest, ApiError> {
        let missing = adoption::missing_required(input);
        if !missing.is_empty() {
            return Err(ApiError::Validation { missing });
        }
        self.send_json(
            HttpMethod::Post,
            format!("{}/adoptions", self.base_url),
            input,
        )
    }

    pub fn parse_create_adoption(&self, response: HttpResponse) -> Result<Adoption, ApiError> {
        parse_data(response)
    }

    pub fn build_list_adoptions(&self) -> HttpRequest {
        self.get(format!("{}/adoptions", self.base_url))
    }

    pub fn parse_list_adoptions(&self, response: HttpResponse) -> Result<Vec<Adoption>, ApiError> {
        parse_data(response)
    }

    pub fn build_get_adoption(&self, id: i64) -> HttpRequest {
        self.get(format!("{}/adoptions/{id}", self.base_url))
    }

    pub fn parse_get_adoption(&self, response: HttpResponse) -> Result<Adoption, ApiError> {
        parse_data(response)
    }

    /// Status changes are gated twice before anything reaches the wire: the
    /// caller must hold the ONG role, and the move must be a legal lifecycle
    /// transition from the adoption's current status.
    pub fn build_update_adoption_status(
        &self,
        id: i64,
        current: AdoptionStatus,
        target: AdoptionStatus,
        role: Role,
    ) -> Result<HttpRequest, ApiError> {
        if role != Role::Ong {
            return Err(ApiError::Forbidden {
                required: Role::Ong,
            });
        }
        if !current.can_transition_to(target) {
            return Err(ApiError::InvalidTransition {
                from: current,
                to: target,
            });
        }
        self.send_json(
            HttpMethod::Put,
            format!("{}/adoptions/{id}/status", self.base_url),
            &StatusUpdate { status: target },
        )
    }

    pub fn parse_update_adoption_status(
        &self,
        response: HttpResponse,
    ) -> Result<Adoption, ApiError> {
        parse_data(response)
    }

    // --- auth ---

    pub fn build_register(&self, input: &Registration) -> Result<HttpRequest, ApiError> {
        self.send_json(
            HttpMethod::Post,
            format!("{}/auth/register", self.base_url),
            input,
        )
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<AuthSession, ApiError> {
        parse_data(response)
    }

    pub fn build_login(&self, input: &Credentials) -> Result<HttpRequest, ApiError> {
        self.send_json(
            HttpMethod::Post,
            format!("{}/auth/login", self.base_url),
            input,
        )
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AuthSession, ApiError> {
        parse_data(response)
    }

    pub fn build_me(&self) -> HttpRequest {
        self.get(format!("{}/auth/me", self.base_url))
    }

    pub fn parse_me(&self, response: HttpResponse) -> Result<Identity, ApiError> {
        parse_data(response)
    }

    // --- contact & feedback ---

    pub fn build_send_contact(&self, input: &ContactMessage) -> Result<HttpRequest, ApiError> {
        self.send_json(
            HttpMethod::Post,
            format!("{}/contact", self.base_url),
            input,
        )
    }

    pub fn parse_send_contact(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }

    pub fn build_send_feedback(&self, mensagem: &str) -> Result<HttpRequest, ApiError> {
        self.send_json(
            HttpMethod::Post,
            format!("{}/feedback", self.base_url),
            &Feedback {
                mensagem: mensagem.to_string(),
            },
        )
    }

    pub fn parse_send_feedback(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }

    pub fn build_health(&self) -> HttpRequest {
        self.get(format!("{}/health", self.base_url))
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_ack(response)
    }
}

/// Extract the error message for a non-2xx response: the envelope's
/// `message` when the body parses, otherwise `"HTTP <status>"`.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Request {
        status: response.status,
        message: error_message(response),
    })
}

/// Parse a successful envelope and take its `data` payload.
fn parse_data<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    let envelope: ApiEnvelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    envelope
        .data
        .ok_or_else(|| ApiError::Deserialization("envelope carried no data".to_string()))
}

/// Parse a successful envelope that carries no payload.
fn parse_ack(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)?;
    let _: ApiEnvelope<serde_json::Value> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    Ok(())
}
