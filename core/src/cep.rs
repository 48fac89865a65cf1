//! Address lookup by CEP (Brazilian postal code).
//!
//! # Design
//! Same build/parse split as `PetClient`, pointed at a ViaCEP-style
//! service. The lookup is best-effort enrichment for the adoption form:
//! every failure here is recoverable and must leave manual entry possible,
//! so errors carry a user-presentable message and nothing more. The
//! service answers 200 with `{"erro": true}` for an unknown code, which
//! parses to an error rather than an empty address.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const DEFAULT_CEP_SERVICE: &str = "https://viacep.com.br/ws";

/// Address fields returned by the postal-code service, in its own wire
/// naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CepAddress {
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
}

/// Client for the external postal-code service.
#[derive(Debug, Clone)]
pub struct CepClient {
    base_url: String,
}

impl Default for CepClient {
    fn default() -> Self {
        Self::new(DEFAULT_CEP_SERVICE)
    }
}

impl CepClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the lookup request. The code must contain exactly 8 digits;
    /// separators like `01310-100` are accepted and stripped.
    pub fn build_lookup(&self, cep: &str) -> Result<HttpRequest, ApiError> {
        let digits: String = cep.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 8 {
            return Err(ApiError::Validation {
                missing: vec!["address_cep".to_string()],
            });
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/{digits}/json/", self.base_url),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn parse_lookup(&self, response: HttpResponse) -> Result<CepAddress, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Request {
                status: response.status,
                message: format!("HTTP {}", response.status),
            });
        }
        let value: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        // The error marker is only present on failed lookups; its value has
        // varied between `true` and `"true"` across service versions.
        if value.get("erro").is_some() {
            return Err(ApiError::Request {
                status: response.status,
                message: "CEP não encontrado".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}
