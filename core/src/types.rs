//! Domain DTOs for the adoption API.
//!
//! # Design
//! These types mirror the backend's wire schema but are defined
//! independently; integration tests against the mock server catch any
//! drift. Enum values serialize to the exact Portuguese strings the
//! backend stores (`"Cachorro"`, `"Médio"`, `"Disponível"`), so a parsed
//! value can be compared and re-sent without translation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform response envelope returned by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    Cachorro,
    Gato,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Size {
    Pequeno,
    #[serde(rename = "Médio")]
    Medio,
    Grande,
}

/// Availability of an animal. Flips to `Adotado` exactly once, when an
/// adoption for it is approved; the backend owns that transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimalStatus {
    #[serde(rename = "Disponível")]
    Disponivel,
    Adotado,
}

/// An animal listed for adoption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub species: Species,
    pub age: String,
    pub size: Size,
    pub temperament: String,
    pub city: String,
    pub status: AnimalStatus,
    pub image: Option<String>,
    pub description: String,
    pub history: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for registering a new animal (ONG only). The backend assigns
/// id, timestamps and defaults `status` to `Disponível`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnimal {
    pub name: String,
    pub species: Species,
    pub age: String,
    pub size: Size,
    pub temperament: String,
    pub city: String,
    pub description: String,
    pub history: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payload for editing an animal (ONG only). Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Status of an adoption request. `Pending` is the only initial state;
/// `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdoptionStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdoptionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AdoptionStatus::Approved | AdoptionStatus::Rejected)
    }

    /// Legal transitions: `Pending → Approved` and `Pending → Rejected`.
    pub fn can_transition_to(self, target: AdoptionStatus) -> bool {
        self == AdoptionStatus::Pending && target.is_terminal()
    }
}

impl fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdoptionStatus::Pending => "Pending",
            AdoptionStatus::Approved => "Approved",
            AdoptionStatus::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

/// An adoption request as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adoption {
    pub id: i64,
    pub animal_id: i64,
    /// Embedded snapshot of the animal, when the backend joins it in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal: Option<Animal>,
    pub adopter_name: String,
    pub adopter_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopter_phone: Option<String>,
    pub address_cep: String,
    pub address_street: String,
    pub address_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_complement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_neighborhood: Option<String>,
    pub address_city: String,
    pub address_state: String,
    pub adoption_message: String,
    pub status: AdoptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for submitting an adoption request. Produced by
/// `AdoptionForm::validate`, which guarantees required fields are
/// non-empty before this value exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRequest {
    pub animal_id: i64,
    pub adopter_name: String,
    pub adopter_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopter_phone: Option<String>,
    pub address_cep: String,
    pub address_street: String,
    pub address_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_complement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_neighborhood: Option<String>,
    pub address_city: String,
    pub address_state: String,
    pub adoption_message: String,
}

/// Body for `PUT /adoptions/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: AdoptionStatus,
}

/// Pagination block returned alongside the animal list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of the animal listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalPage {
    pub items: Vec<Animal>,
    pub meta: PageMeta,
}

/// The two roles the backend knows. There is no third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Adotante,
    Ong,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Adotante => "adotante",
            Role::Ong => "ong",
        };
        f.write_str(s)
    }
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Returned by register and login: the bearer token plus a user snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Returned by `GET /auth/me` for a valid token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Body for `POST /contact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// Body for `POST /feedback`. Field name matches the backend's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub mensagem: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_portuguese_wire_strings() {
        assert_eq!(serde_json::to_value(Size::Medio).unwrap(), "Médio");
        assert_eq!(
            serde_json::to_value(AnimalStatus::Disponivel).unwrap(),
            "Disponível"
        );
        assert_eq!(serde_json::to_value(Species::Cachorro).unwrap(), "Cachorro");
        assert_eq!(serde_json::to_value(Role::Ong).unwrap(), "ong");
    }

    #[test]
    fn adoption_status_transitions() {
        use AdoptionStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
    }

    #[test]
    fn animal_deserializes_from_backend_shape() {
        let json = r#"{
            "id": 3,
            "name": "Thor",
            "species": "Cachorro",
            "age": "3 anos",
            "size": "Grande",
            "temperament": "Protetor e leal",
            "city": "Belo Horizonte, MG",
            "status": "Disponível",
            "image": null,
            "description": "Um guardião.",
            "history": "Resgatado de um abrigo superlotado.",
            "created_at": "2025-01-10T12:00:00Z",
            "updated_at": "2025-01-10T12:00:00Z"
        }"#;
        let animal: Animal = serde_json::from_str(json).unwrap();
        assert_eq!(animal.id, 3);
        assert_eq!(animal.size, Size::Grande);
        assert_eq!(animal.status, AnimalStatus::Disponivel);
    }

    #[test]
    fn optional_adoption_fields_are_omitted_when_absent() {
        let req = AdoptionRequest {
            animal_id: 1,
            adopter_name: "Ana".to_string(),
            adopter_email: "ana@example.com".to_string(),
            adopter_phone: None,
            address_cep: "01310100".to_string(),
            address_street: "Avenida Paulista".to_string(),
            address_number: "1000".to_string(),
            address_complement: None,
            address_neighborhood: None,
            address_city: "São Paulo".to_string(),
            address_state: "SP".to_string(),
            adoption_message: "Quero muito adotar.".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("adopter_phone").is_none());
        assert!(value.get("address_complement").is_none());
        assert_eq!(value["address_state"], "SP");
    }

    #[test]
    fn envelope_round_trips_with_and_without_data() {
        let with: ApiEnvelope<Vec<i64>> =
            serde_json::from_str(r#"{"success":true,"message":"ok","data":[1,2]}"#).unwrap();
        assert!(with.success);
        assert_eq!(with.data.as_deref(), Some(&[1, 2][..]));

        let without: ApiEnvelope<Vec<i64>> =
            serde_json::from_str(r#"{"success":false,"message":"Erro"}"#).unwrap();
        assert!(!without.success);
        assert!(without.data.is_none());
    }
}
