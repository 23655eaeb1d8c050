//! End-to-end tests through the real ViaCEP client.
//!
//! A local axum server stands in for the provider so the suite runs offline.
//! The live ViaCEP test is ignored by default:
//! Run with: cargo test --test integration -- --ignored

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Method, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use cadastro_cep::api::{create_router, AppState};
use cadastro_cep::config::Config;
use cadastro_cep::error::LookupError;
use cadastro_cep::lookup::{Cep, CepLookup, LookupOutcome, ViaCepClient};
use cadastro_cep::store::RecordStore;

type Bodies = Arc<HashMap<&'static str, Value>>;

fn provider_bodies() -> Bodies {
    let mut bodies = HashMap::new();
    bodies.insert(
        "21240050",
        json!({
            "cep": "21240-050",
            "logradouro": "Rua Guaporé",
            "complemento": "",
            "bairro": "Brás de Pina",
            "localidade": "Rio de Janeiro",
            "uf": "RJ",
            "ibge": "3304557",
            "ddd": "21"
        }),
    );
    bodies.insert(
        "01001000",
        json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308",
            "ddd": "11"
        }),
    );
    Arc::new(bodies)
}

async fn provider_reply(State(bodies): State<Bodies>, Path(cep): Path<String>) -> Json<Value> {
    match bodies.get(cep.as_str()) {
        Some(body) => Json(body.clone()),
        None => Json(json!({ "erro": "true" })),
    }
}

async fn rejecting_reply() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "Bad Request")
}

async fn garbled_reply() -> &'static str {
    "<html><body>manutenção programada</body></html>"
}

/// Start a fake provider.
///
/// `/ws` behaves like ViaCEP, `/rejecting` answers 400 and `/garbled`
/// answers 200 with a body that is not JSON.
async fn spawn_provider() -> SocketAddr {
    let app = Router::new()
        .route("/ws/:cep/json/", get(provider_reply))
        .route("/rejecting/:cep/json/", get(rejecting_reply))
        .route("/garbled/:cep/json/", get(garbled_reply))
        .with_state(provider_bodies());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ViaCepClient {
    client_at(addr, "ws")
}

fn client_at(addr: SocketAddr, prefix: &str) -> ViaCepClient {
    let config = Config {
        cep_lookup_url: format!("http://{}/{}/", addr, prefix),
        http_timeout_ms: Some(2_000),
        ..Config::default()
    };
    ViaCepClient::new(&config).unwrap()
}

async fn app_for(addr: SocketAddr) -> Router {
    app_at(addr, "ws").await
}

async fn app_at(addr: SocketAddr, prefix: &str) -> Router {
    let store = RecordStore::connect("sqlite::memory:", 1).await.unwrap();
    store.init_schema().await.unwrap();
    create_router(AppState::new(store, Arc::new(client_at(addr, prefix))))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn client_resolves_known_cep() {
    let addr = spawn_provider().await;
    let client = client_for(addr);

    let cep = Cep::parse("21240-050").unwrap();
    let outcome = tokio_test::assert_ok!(client.lookup(&cep).await);
    let fields = outcome.into_fields().unwrap();

    assert_eq!(fields.street.as_deref(), Some("Rua Guaporé"));
    assert_eq!(fields.neighborhood.as_deref(), Some("Brás de Pina"));
    assert_eq!(fields.city.as_deref(), Some("Rio de Janeiro"));
    assert_eq!(fields.state.as_deref(), Some("RJ"));
}

#[tokio::test]
async fn client_treats_erro_flag_as_not_found() {
    let addr = spawn_provider().await;
    let client = client_for(addr);

    let cep = Cep::parse("99999999").unwrap();
    assert_eq!(client.lookup(&cep).await.unwrap(), LookupOutcome::NotFound);
}

#[tokio::test]
async fn client_reports_unreachable_provider() {
    // Bind then drop so the port is closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let cep = Cep::parse("21240050").unwrap();
    tokio_test::assert_err!(client.lookup(&cep).await);
}

#[tokio::test]
async fn cliente_lifecycle() {
    let addr = spawn_provider().await;
    let app = app_for(addr).await;

    let (status, created) =
        call(&app, Method::POST, "/cliente", Some(json!({ "cep": "21240-050" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["endereco"], "Rua Guaporé");
    let id = created["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        Method::PUT,
        "/cliente",
        Some(json!({ "id": id, "cep": "01001000", "uf": "ignored" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) = call(&app, Method::GET, "/clientes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        listed,
        json!({
            "clientes": [{
                "id": id,
                "cep": "01001000",
                "endereco": "Praça da Sé",
                "bairro": "Sé",
                "localidade": "São Paulo",
                "uf": "SP"
            }]
        })
    );

    let (status, _) = call(&app, Method::DELETE, &format!("/cliente?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, &format!("/cliente?id={id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn endereco_rejects_unknown_cep() {
    let addr = spawn_provider().await;
    let app = app_for(addr).await;

    let (status, body) =
        call(&app, Method::POST, "/endereco", Some(json!({ "cep": "99999999" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "CEP inválido ou não encontrado" }));
}

#[tokio::test]
async fn consult_returns_provider_body() {
    let addr = spawn_provider().await;
    let app = app_for(addr).await;

    let (status, body) = call(&app, Method::GET, "/consulta-cep?cep=01001-000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complemento"], "lado ímpar");
    assert_eq!(body["ddd"], "11");
}

#[tokio::test]
async fn client_treats_error_status_as_not_found() {
    let addr = spawn_provider().await;
    let client = client_at(addr, "rejecting");

    let cep = Cep::parse("21240050").unwrap();
    assert_eq!(client.lookup(&cep).await.unwrap(), LookupOutcome::NotFound);
}

#[tokio::test]
async fn client_reports_unparseable_body() {
    let addr = spawn_provider().await;
    let client = client_at(addr, "garbled");

    let cep = Cep::parse("21240050").unwrap();
    let err = tokio_test::assert_err!(client.lookup(&cep).await);
    assert!(matches!(err, LookupError::ParseError(_)), "{err:?}");
}

#[tokio::test]
async fn create_with_rejecting_provider_is_400() {
    let addr = spawn_provider().await;
    let app = app_at(addr, "rejecting").await;

    let (status, body) =
        call(&app, Method::POST, "/cliente", Some(json!({ "cep": "21240050" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "CEP inválido ou não encontrado");
}

#[tokio::test]
async fn garbled_provider_body_is_500() {
    let addr = spawn_provider().await;
    let app = app_at(addr, "garbled").await;

    let (status, body) =
        call(&app, Method::POST, "/endereco", Some(json!({ "cep": "21240050" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().starts_with("Erro ao consultar o CEP"));

    let (status, _) = call(&app, Method::GET, "/consulta-cep?cep=21240050", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = call(&app, Method::GET, "/enderecos", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Hits the real ViaCEP service.
#[tokio::test]
#[ignore = "requires network access to viacep.com.br"]
async fn live_viacep_lookup() {
    let client = ViaCepClient::new(&Config::default()).unwrap();

    let cep = Cep::parse("01001-000").unwrap();
    let fields = client.lookup(&cep).await.unwrap().into_fields().unwrap();

    assert_eq!(fields.state.as_deref(), Some("SP"));
    println!("Resolved: {:?}", fields);
}
