//! Full adoption lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the client,
//! session, and adoption lifecycle over real HTTP using ureq. Validates
//! that the core's request building and response parsing work end-to-end
//! with the actual server, including bearer-token handling and the
//! role-gated status transition.

use protegepet_core::{
    AdoptionForm, AdoptionStatus, AnimalStatus, ApiError, HttpMethod, HttpRequest, HttpResponse,
    MemoryTokenStore, NewAnimal, PetClient, Registration, Role, Session, SessionState, Size,
    Species, TokenStore,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation. All headers the core attached
/// (content-type, authorization) are forwarded as-is.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let result = match req.method {
        HttpMethod::Get => {
            let mut r = agent.get(&req.path);
            for (name, value) in &req.headers {
                r = r.header(name, value);
            }
            r.call()
        }
        HttpMethod::Delete => {
            let mut r = agent.delete(&req.path);
            for (name, value) in &req.headers {
                r = r.header(name, value);
            }
            r.call()
        }
        HttpMethod::Post => {
            let mut r = agent.post(&req.path);
            for (name, value) in &req.headers {
                r = r.header(name, value);
            }
            r.send(req.body.unwrap_or_default().as_bytes())
        }
        HttpMethod::Put => {
            let mut r = agent.put(&req.path);
            for (name, value) in &req.headers {
                r = r.header(name, value);
            }
            r.send(req.body.unwrap_or_default().as_bytes())
        }
    };

    let mut response = result.expect("HTTP transport error");
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn thor() -> NewAnimal {
    NewAnimal {
        name: "Thor".to_string(),
        species: Species::Cachorro,
        age: "3 anos".to_string(),
        size: Size::Grande,
        temperament: "Protetor e leal".to_string(),
        city: "Belo Horizonte, MG".to_string(),
        description: "Um guardião.".to_string(),
        history: "Resgatado de um abrigo superlotado.".to_string(),
        image: None,
    }
}

fn adoption_form() -> AdoptionForm {
    AdoptionForm {
        adopter_name: "Ana Souza".to_string(),
        adopter_email: "ana@example.com".to_string(),
        address_cep: "01310-100".to_string(),
        address_street: "Avenida Paulista".to_string(),
        address_number: "1000".to_string(),
        address_city: "São Paulo".to_string(),
        address_state: "SP".to_string(),
        adoption_message: "Tenho quintal e tempo para passeios.".to_string(),
        ..AdoptionForm::default()
    }
}

#[test]
fn adoption_lifecycle() {
    let base_url = start_server();

    // Step 1: the ONG registers, which authenticates its session.
    let mut ong_client = PetClient::new(&base_url);
    let mut ong_session = Session::new(MemoryTokenStore::default());
    assert!(ong_session.restore(&mut ong_client).is_none());

    let registration = Registration {
        name: "Abrigo Patinhas".to_string(),
        email: "contato@patinhas.org".to_string(),
        password: "s3cret".to_string(),
        role: Role::Ong,
    };
    let req = ong_session.register(&ong_client, &registration).unwrap();
    let role = ong_session
        .complete_register(&mut ong_client, execute(req))
        .unwrap();
    assert_eq!(role, Role::Ong);
    assert!(ong_client.token().is_some());

    // Step 2: the ONG registers an animal.
    let req = ong_client.build_create_animal(&thor()).unwrap();
    let animal = ong_client.parse_create_animal(execute(req)).unwrap();
    assert_eq!(animal.status, AnimalStatus::Disponivel);
    let animal_id = animal.id;

    // Step 3: the listing shows it.
    let req = ong_client.build_list_animals(1, 10);
    let page = ong_client.parse_list_animals(execute(req)).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.meta.total, 1);

    // Step 4: an adopter logs in on a separate session and submits the
    // adoption form. The animal stays available.
    let mut adopter_client = PetClient::new(&base_url);
    let mut adopter_session = Session::new(MemoryTokenStore::default());
    let registration = Registration {
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        password: "s3cret".to_string(),
        role: Role::Adotante,
    };
    let req = adopter_session
        .register(&adopter_client, &registration)
        .unwrap();
    adopter_session
        .complete_register(&mut adopter_client, execute(req))
        .unwrap();
    assert_eq!(adopter_session.current_role(), Some(Role::Adotante));

    let payload = adoption_form().validate(animal_id).unwrap();
    let req = adopter_client.build_create_adoption(&payload).unwrap();
    let adoption = adopter_client.parse_create_adoption(execute(req)).unwrap();
    assert_eq!(adoption.status, AdoptionStatus::Pending);
    assert_eq!(adoption.animal_id, animal_id);

    let req = adopter_client.build_get_animal(animal_id);
    let animal = adopter_client.parse_get_animal(execute(req)).unwrap();
    assert_eq!(animal.status, AnimalStatus::Disponivel);

    // Step 5: the adopter cannot approve. The client-side gate refuses to
    // even build the request.
    let err = adopter_client
        .build_update_adoption_status(
            adoption.id,
            AdoptionStatus::Pending,
            AdoptionStatus::Approved,
            Role::Adotante,
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { required: Role::Ong }));

    // Even a request forged past the gate is rejected by the server.
    let forged = adopter_client
        .build_update_adoption_status(
            adoption.id,
            AdoptionStatus::Pending,
            AdoptionStatus::Approved,
            Role::Ong,
        )
        .unwrap();
    let err = adopter_client
        .parse_update_adoption_status(execute(forged))
        .unwrap_err();
    assert!(matches!(err, ApiError::Request { status: 403, .. }));

    let req = adopter_client.build_get_adoption(adoption.id);
    let unchanged = adopter_client.parse_get_adoption(execute(req)).unwrap();
    assert_eq!(unchanged.status, AdoptionStatus::Pending);

    // Step 6: the ONG approves; the animal flips to Adotado on re-fetch.
    ong_session.require_role(Role::Ong).unwrap();
    let req = ong_client
        .build_update_adoption_status(
            adoption.id,
            AdoptionStatus::Pending,
            AdoptionStatus::Approved,
            Role::Ong,
        )
        .unwrap();
    let approved = ong_client.parse_update_adoption_status(execute(req)).unwrap();
    assert_eq!(approved.status, AdoptionStatus::Approved);

    let req = ong_client.build_get_animal(animal_id);
    let animal = ong_client.parse_get_animal(execute(req)).unwrap();
    assert_eq!(animal.status, AnimalStatus::Adotado);

    // Step 7: terminal means terminal. The lifecycle check refuses
    // locally, and the server refuses a request that lies about the
    // current status.
    let err = ong_client
        .build_update_adoption_status(
            adoption.id,
            AdoptionStatus::Approved,
            AdoptionStatus::Rejected,
            Role::Ong,
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition { .. }));

    let forged = ong_client
        .build_update_adoption_status(
            adoption.id,
            AdoptionStatus::Pending,
            AdoptionStatus::Rejected,
            Role::Ong,
        )
        .unwrap();
    let err = ong_client
        .parse_update_adoption_status(execute(forged))
        .unwrap_err();
    assert!(matches!(err, ApiError::Request { status: 409, .. }));

    // Step 8: a second adoption for the adopted animal is refused with the
    // backend's message.
    let payload = adoption_form().validate(animal_id).unwrap();
    let req = adopter_client.build_create_adoption(&payload).unwrap();
    let err = adopter_client.parse_create_adoption(execute(req)).unwrap_err();
    match err {
        ApiError::Request { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Animal não está disponível");
        }
        other => panic!("expected Request, got {other:?}"),
    }
}

#[test]
fn session_restore_round_trip() {
    let base_url = start_server();

    // Log in once so a token lands in the store.
    let store = MemoryTokenStore::default();
    let mut client = PetClient::new(&base_url);
    let mut session = Session::new(store.clone());
    let registration = Registration {
        name: "Abrigo Patinhas".to_string(),
        email: "contato@patinhas.org".to_string(),
        password: "s3cret".to_string(),
        role: Role::Ong,
    };
    let req = session.register(&client, &registration).unwrap();
    session.complete_register(&mut client, execute(req)).unwrap();

    // A fresh process restores straight to Authenticated(ong) without
    // credentials.
    let mut restored_client = PetClient::new(&base_url);
    let mut restored_session = Session::new(store.clone());
    let req = restored_session.restore(&mut restored_client).unwrap();
    assert_eq!(restored_session.state(), SessionState::Validating);
    let role = restored_session
        .complete_restore(&mut restored_client, execute(req))
        .unwrap();
    assert_eq!(role, Role::Ong);
    assert!(restored_session.is_logged_in());

    // A stale token is rejected by the backend and purged from the store.
    let stale_store = MemoryTokenStore::with_token("not-a-real-token");
    let mut stale_client = PetClient::new(&base_url);
    let mut stale_session = Session::new(stale_store.clone());
    let req = stale_session.restore(&mut stale_client).unwrap();
    let err = stale_session
        .complete_restore(&mut stale_client, execute(req))
        .unwrap_err();
    assert!(err.is_auth_rejection());
    assert_eq!(stale_session.state(), SessionState::Anonymous);
    assert_eq!(stale_store.load().unwrap(), None);
}

#[test]
fn contact_feedback_and_health() {
    let base_url = start_server();
    let client = PetClient::new(&base_url);

    let req = client.build_health();
    client.parse_health(execute(req)).unwrap();

    let contact = protegepet_core::ContactMessage {
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        subject: None,
        message: "Olá!".to_string(),
    };
    let req = client.build_send_contact(&contact).unwrap();
    client.parse_send_contact(execute(req)).unwrap();

    let req = client.build_send_feedback("Adorei o site").unwrap();
    client.parse_send_feedback(execute(req)).unwrap();
}

#[test]
fn unknown_animal_surfaces_backend_message() {
    let base_url = start_server();
    let client = PetClient::new(&base_url);

    let req = client.build_get_animal(999);
    let err = client.parse_get_animal(execute(req)).unwrap_err();
    match err {
        ApiError::Request { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Animal não encontrado");
        }
        other => panic!("expected Request, got {other:?}"),
    }
}
