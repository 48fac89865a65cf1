//! In-memory implementation of the ProtegePet backend REST contract.
//!
//! Serves the same routes, envelope, and Portuguese error messages as the
//! real backend so the core client can be exercised over real HTTP in
//! integration tests. State lives behind an `RwLock`; bearer tokens are
//! opaque uuid strings mapped to users.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub age: String,
    pub size: String,
    pub temperament: String,
    pub city: String,
    pub status: String,
    pub image: Option<String>,
    pub description: String,
    pub history: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Adoption {
    pub id: i64,
    pub animal_id: i64,
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
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
struct User {
    name: String,
    email: String,
    password: String,
    role: String,
}

#[derive(Default)]
pub struct Store {
    animals: HashMap<i64, Animal>,
    adoptions: HashMap<i64, Adoption>,
    users: Vec<User>,
    tokens: HashMap<String, usize>,
    next_animal_id: i64,
    next_adoption_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn reply<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    let body = Envelope {
        success: status.is_success(),
        message: message.to_string(),
        data,
    };
    (status, Json(body)).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    reply::<()>(status, message, None)
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/animals", get(list_animals).post(create_animal))
        .route(
            "/animals/{id}",
            get(get_animal).put(update_animal).delete(delete_animal),
        )
        .route("/adoptions", get(list_adoptions).post(create_adoption))
        .route("/adoptions/{id}", get(get_adoption))
        .route("/adoptions/{id}/status", put(update_adoption_status))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/contact", post(contact))
        .route("/feedback", post(feedback))
        .route("/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// --- auth plumbing ---

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

fn authenticate(store: &Store, headers: &HeaderMap) -> Result<User, Response> {
    let token = bearer(headers)
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Token ausente ou formato inválido"))?;
    let index = store
        .tokens
        .get(&token)
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Token inválido"))?;
    Ok(store.users[*index].clone())
}

fn require_role(user: &User, role: &str) -> Result<(), Response> {
    if user.role == role {
        Ok(())
    } else {
        Err(fail(StatusCode::FORBIDDEN, "Permissão insuficiente"))
    }
}

fn text_field(data: &serde_json::Value, field: &str) -> Option<String> {
    data.get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn has_required(data: &serde_json::Value, fields: &[&str]) -> bool {
    fields.iter().all(|f| text_field(data, f).is_some())
}

// --- animals ---

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

async fn list_animals(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let mut animals: Vec<&Animal> = store.animals.values().collect();
    animals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let total = animals.len() as u64;
    let per_page = query.per_page.max(1);
    let pages = total.div_ceil(per_page as u64) as u32;
    let offset = (query.page.saturating_sub(1) * per_page) as usize;
    let items: Vec<Animal> = animals
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .cloned()
        .collect();

    reply(
        StatusCode::OK,
        "Animais recuperados com sucesso",
        Some(serde_json::json!({
            "items": items,
            "meta": {
                "page": query.page,
                "per_page": per_page,
                "total": total,
                "pages": pages,
            },
        })),
    )
}

async fn get_animal(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    let store = db.read().await;
    match store.animals.get(&id) {
        Some(animal) => reply(
            StatusCode::OK,
            "Animal recuperado com sucesso",
            Some(animal.clone()),
        ),
        None => fail(StatusCode::NOT_FOUND, "Animal não encontrado"),
    }
}

async fn create_animal(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(data): Json<serde_json::Value>,
) -> Response {
    let mut store = db.write().await;
    let user = match authenticate(&store, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, "ong") {
        return response;
    }

    let required = [
        "name",
        "species",
        "age",
        "size",
        "temperament",
        "city",
        "description",
        "history",
    ];
    if !has_required(&data, &required) {
        return fail(StatusCode::BAD_REQUEST, "Campos obrigatórios faltando");
    }

    store.next_animal_id += 1;
    let now = Utc::now();
    let animal = Animal {
        id: store.next_animal_id,
        name: text_field(&data, "name").unwrap_or_default(),
        species: text_field(&data, "species").unwrap_or_default(),
        age: text_field(&data, "age").unwrap_or_default(),
        size: text_field(&data, "size").unwrap_or_default(),
        temperament: text_field(&data, "temperament").unwrap_or_default(),
        city: text_field(&data, "city").unwrap_or_default(),
        status: text_field(&data, "status").unwrap_or_else(|| "Disponível".to_string()),
        image: text_field(&data, "image"),
        description: text_field(&data, "description").unwrap_or_default(),
        history: text_field(&data, "history").unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    tracing::info!(id = animal.id, name = %animal.name, "animal registered");
    store.animals.insert(animal.id, animal.clone());
    reply(StatusCode::CREATED, "Animal criado com sucesso", Some(animal))
}

async fn update_animal(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(data): Json<serde_json::Value>,
) -> Response {
    let mut store = db.write().await;
    let user = match authenticate(&store, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, "ong") {
        return response;
    }

    let Some(animal) = store.animals.get_mut(&id) else {
        return fail(StatusCode::NOT_FOUND, "Animal não encontrado");
    };
    for (field, slot) in [
        ("name", &mut animal.name),
        ("species", &mut animal.species),
        ("age", &mut animal.age),
        ("size", &mut animal.size),
        ("temperament", &mut animal.temperament),
        ("city", &mut animal.city),
        ("description", &mut animal.description),
        ("history", &mut animal.history),
    ] {
        if let Some(value) = text_field(&data, field) {
            *slot = value;
        }
    }
    if let Some(image) = text_field(&data, "image") {
        animal.image = Some(image);
    }
    animal.updated_at = Utc::now();
    reply(
        StatusCode::OK,
        "Animal atualizado com sucesso",
        Some(animal.clone()),
    )
}

async fn delete_animal(State(db): State<Db>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    let mut store = db.write().await;
    let user = match authenticate(&store, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, "ong") {
        return response;
    }
    if store.animals.remove(&id).is_none() {
        return fail(StatusCode::NOT_FOUND, "Animal não encontrado");
    }
    store.adoptions.retain(|_, adoption| adoption.animal_id != id);
    reply::<()>(StatusCode::OK, "Animal deletado com sucesso", None)
}

// --- adoptions ---

async fn list_adoptions(State(db): State<Db>) -> Response {
    let store = db.read().await;
    let mut adoptions: Vec<Adoption> = store.adoptions.values().cloned().collect();
    adoptions.sort_by_key(|a| a.id);
    reply(
        StatusCode::OK,
        "Adoções recuperadas com sucesso",
        Some(adoptions),
    )
}

async fn get_adoption(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    let store = db.read().await;
    match store.adoptions.get(&id) {
        Some(adoption) => reply(
            StatusCode::OK,
            "Adoção recuperada com sucesso",
            Some(adoption.clone()),
        ),
        None => fail(StatusCode::NOT_FOUND, "Adoção não encontrada"),
    }
}

async fn create_adoption(State(db): State<Db>, Json(data): Json<serde_json::Value>) -> Response {
    let mut store = db.write().await;

    let required = [
        "adopter_name",
        "adopter_email",
        "address_cep",
        "address_street",
        "address_number",
        "address_city",
        "address_state",
        "adoption_message",
    ];
    let animal_id = data.get("animal_id").and_then(|v| v.as_i64());
    if animal_id.is_none() || !has_required(&data, &required) {
        return fail(StatusCode::BAD_REQUEST, "Campos obrigatórios faltando");
    }
    let animal_id = animal_id.unwrap();

    let Some(animal) = store.animals.get(&animal_id).cloned() else {
        return fail(StatusCode::NOT_FOUND, "Animal não encontrado");
    };
    if animal.status != "Disponível" {
        return fail(StatusCode::CONFLICT, "Animal não está disponível");
    }

    store.next_adoption_id += 1;
    let now = Utc::now();
    // The animal stays Disponível here; only an approval flips it.
    let adoption = Adoption {
        id: store.next_adoption_id,
        animal_id,
        animal: Some(animal),
        adopter_name: text_field(&data, "adopter_name").unwrap_or_default(),
        adopter_email: text_field(&data, "adopter_email").unwrap_or_default(),
        adopter_phone: text_field(&data, "adopter_phone"),
        address_cep: text_field(&data, "address_cep").unwrap_or_default(),
        address_street: text_field(&data, "address_street").unwrap_or_default(),
        address_number: text_field(&data, "address_number").unwrap_or_default(),
        address_complement: text_field(&data, "address_complement"),
        address_neighborhood: text_field(&data, "address_neighborhood"),
        address_city: text_field(&data, "address_city").unwrap_or_default(),
        address_state: text_field(&data, "address_state").unwrap_or_default(),
        adoption_message: text_field(&data, "adoption_message").unwrap_or_default(),
        status: "Pending".to_string(),
        created_at: now,
        updated_at: now,
    };
    tracing::info!(id = adoption.id, animal_id, "adoption requested");
    store.adoptions.insert(adoption.id, adoption.clone());
    reply(
        StatusCode::CREATED,
        "Adoção registrada com sucesso",
        Some(adoption),
    )
}

async fn update_adoption_status(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(data): Json<serde_json::Value>,
) -> Response {
    let mut store = db.write().await;
    let user = match authenticate(&store, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, "ong") {
        return response;
    }

    let new_status = match data.get("status").and_then(|v| v.as_str()) {
        Some(s @ ("Approved" | "Rejected")) => s.to_string(),
        _ => return fail(StatusCode::BAD_REQUEST, "Status inválido"),
    };

    let Some(adoption) = store.adoptions.get(&id).cloned() else {
        return fail(StatusCode::NOT_FOUND, "Adoção não encontrada");
    };
    if adoption.status != "Pending" {
        return fail(StatusCode::CONFLICT, "Adoção já finalizada");
    }

    let now = Utc::now();
    if new_status == "Approved" {
        if let Some(animal) = store.animals.get_mut(&adoption.animal_id) {
            animal.status = "Adotado".to_string();
            animal.updated_at = now;
        }
    }
    let animal_snapshot = store.animals.get(&adoption.animal_id).cloned();
    let adoption = store.adoptions.get_mut(&id).expect("checked above");
    adoption.status = new_status;
    adoption.animal = animal_snapshot;
    adoption.updated_at = now;
    tracing::info!(id, status = %adoption.status, "adoption status updated");
    reply(StatusCode::OK, "Status atualizado", Some(adoption.clone()))
}

// --- auth ---

fn issue_token(store: &mut Store, index: usize) -> String {
    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), index);
    token
}

fn auth_payload(user: &User, token: &str) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "name": user.name,
        "email": user.email,
        "role": user.role,
    })
}

async fn register(State(db): State<Db>, Json(data): Json<serde_json::Value>) -> Response {
    let mut store = db.write().await;
    if !has_required(&data, &["name", "email", "password", "role"]) {
        return fail(StatusCode::BAD_REQUEST, "Campos obrigatórios faltando");
    }
    let role = text_field(&data, "role").unwrap_or_default();
    if role != "ong" && role != "adotante" {
        return fail(StatusCode::BAD_REQUEST, "Role inválida");
    }
    let email = text_field(&data, "email").unwrap_or_default();
    if store.users.iter().any(|u| u.email == email) {
        return fail(StatusCode::CONFLICT, "E-mail já cadastrado");
    }

    let user = User {
        name: text_field(&data, "name").unwrap_or_default(),
        email,
        password: text_field(&data, "password").unwrap_or_default(),
        role,
    };
    let index = store.users.len();
    store.users.push(user.clone());
    let token = issue_token(&mut store, index);
    tracing::info!(email = %user.email, role = %user.role, "user registered");
    reply(
        StatusCode::CREATED,
        "Usuário registrado com sucesso",
        Some(auth_payload(&user, &token)),
    )
}

async fn login(State(db): State<Db>, Json(data): Json<serde_json::Value>) -> Response {
    let mut store = db.write().await;
    if !has_required(&data, &["email", "password", "role"]) {
        return fail(StatusCode::BAD_REQUEST, "Credenciais incompletas");
    }
    let email = text_field(&data, "email").unwrap_or_default();
    let password = text_field(&data, "password").unwrap_or_default();
    let role = text_field(&data, "role").unwrap_or_default();

    let found = store
        .users
        .iter()
        .position(|u| u.email == email && u.role == role && u.password == password);
    let Some(index) = found else {
        return fail(StatusCode::UNAUTHORIZED, "Credenciais inválidas");
    };

    let user = store.users[index].clone();
    let token = issue_token(&mut store, index);
    reply(
        StatusCode::OK,
        "Login realizado com sucesso",
        Some(auth_payload(&user, &token)),
    )
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Response {
    let store = db.read().await;
    match authenticate(&store, &headers) {
        Ok(user) => reply(
            StatusCode::OK,
            "Usuário autenticado",
            Some(serde_json::json!({
                "name": user.name,
                "email": user.email,
                "role": user.role,
            })),
        ),
        Err(response) => response,
    }
}

// --- contact & feedback ---

async fn contact(Json(data): Json<serde_json::Value>) -> Response {
    if !has_required(&data, &["name", "email", "message"]) {
        return fail(StatusCode::BAD_REQUEST, "Campos obrigatórios faltando");
    }
    reply::<()>(StatusCode::CREATED, "Mensagem recebida", None)
}

async fn feedback(Json(data): Json<serde_json::Value>) -> Response {
    if !has_required(&data, &["mensagem"]) {
        return fail(StatusCode::BAD_REQUEST, "Campos obrigatórios faltando");
    }
    reply::<()>(StatusCode::CREATED, "Feedback recebido", None)
}

async fn health() -> Response {
    reply::<()>(StatusCode::OK, "ok", None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_data() {
        let body = Envelope::<()> {
            success: false,
            message: "Erro".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn bearer_parses_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc-123".parse().unwrap());
        assert_eq!(bearer(&headers).as_deref(), Some("abc-123"));

        headers.insert("authorization", "Token abc".parse().unwrap());
        assert_eq!(bearer(&headers), None);
    }

    #[test]
    fn required_field_check_rejects_blank_strings() {
        let data = serde_json::json!({"name": "Ana", "email": "  "});
        assert!(!has_required(&data, &["name", "email"]));
        assert!(has_required(&data, &["name"]));
    }
}
