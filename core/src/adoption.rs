//! Adoption form validation and lifecycle rules.
//!
//! # Design
//! `AdoptionForm` is the mutable state behind the submission form. It only
//! becomes an `AdoptionRequest` through `validate`, which reports every
//! missing required field at once so the user can fix the whole form in one
//! pass. Whitespace-only input counts as missing.
//!
//! Status transition rules live on `AdoptionStatus`
//! (`Pending → Approved | Rejected`, terminals frozen); the client checks
//! them again before building the status-update request. After an approval
//! the caller must re-fetch the animal — the backend owns the
//! `Disponível → Adotado` flip and nothing here mutates animal state
//! locally.

use crate::cep::CepAddress;
use crate::error::ApiError;
use crate::types::AdoptionRequest;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Names of the required fields that are empty in `request`, in form
/// order. Used both for form validation and for the client's pre-flight
/// check.
pub fn missing_required(request: &AdoptionRequest) -> Vec<String> {
    let required = [
        ("adopter_name", request.adopter_name.as_str()),
        ("adopter_email", request.adopter_email.as_str()),
        ("address_cep", request.address_cep.as_str()),
        ("address_street", request.address_street.as_str()),
        ("address_number", request.address_number.as_str()),
        ("address_city", request.address_city.as_str()),
        ("address_state", request.address_state.as_str()),
        ("adoption_message", request.adoption_message.as_str()),
    ];
    required
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// The adoption request form as the user fills it in. Optional fields stay
/// empty strings until given; they are omitted from the payload when blank.
#[derive(Debug, Clone, Default)]
pub struct AdoptionForm {
    pub adopter_name: String,
    pub adopter_email: String,
    pub adopter_phone: String,
    pub address_cep: String,
    pub address_street: String,
    pub address_number: String,
    pub address_complement: String,
    pub address_neighborhood: String,
    pub address_city: String,
    pub address_state: String,
    pub adoption_message: String,
}

impl AdoptionForm {
    /// Validate the form against the required-field list and produce the
    /// submission payload for `animal_id`. Fails with `Validation` naming
    /// every missing field; no request is built in that case.
    pub fn validate(&self, animal_id: i64) -> Result<AdoptionRequest, ApiError> {
        let request = AdoptionRequest {
            animal_id,
            adopter_name: self.adopter_name.trim().to_string(),
            adopter_email: self.adopter_email.trim().to_string(),
            adopter_phone: optional(&self.adopter_phone),
            address_cep: self.address_cep.trim().to_string(),
            address_street: self.address_street.trim().to_string(),
            address_number: self.address_number.trim().to_string(),
            address_complement: optional(&self.address_complement),
            address_neighborhood: optional(&self.address_neighborhood),
            address_city: self.address_city.trim().to_string(),
            address_state: self.address_state.trim().to_string(),
            adoption_message: self.adoption_message.trim().to_string(),
        };
        let missing = missing_required(&request);
        if !missing.is_empty() {
            return Err(ApiError::Validation { missing });
        }
        Ok(request)
    }

    /// Populate address fields from a CEP lookup without overwriting
    /// anything the user already typed.
    pub fn fill_address(&mut self, address: &CepAddress) {
        fill_if_blank(&mut self.address_street, &address.logradouro);
        fill_if_blank(&mut self.address_neighborhood, &address.bairro);
        fill_if_blank(&mut self.address_city, &address.localidade);
        fill_if_blank(&mut self.address_state, &address.uf);
        fill_if_blank(&mut self.address_complement, &address.complemento);
    }

    /// Best-effort enrichment: apply a lookup result, degrading to a no-op
    /// on failure. Returns whether anything could be applied; manual entry
    /// and submission are never blocked.
    pub fn apply_cep_lookup(&mut self, lookup: Result<CepAddress, ApiError>) -> bool {
        match lookup {
            Ok(address) => {
                self.fill_address(&address);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "CEP lookup failed, keeping manual entry");
                false
            }
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn fill_if_blank(field: &mut String, value: &str) {
    if is_blank(field) && !is_blank(value) {
        *field = value.to_string();
    }
}
