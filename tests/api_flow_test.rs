// tests/api_flow_test.rs

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use controle_alugueis::{
    build_app,
    config::{AppState, Settings, StoreBackend},
    db::store::{MemoryStore, Table},
    models::auth::{CookieSettings, CredentialEntry, CredentialMap},
};

const COOKIE_NAME: &str = "controle_alugueis";

fn settings() -> Settings {
    Settings {
        host: "127.0.0.1".into(),
        port: 0,
        store_backend: StoreBackend::Memory,
        spreadsheet_id: None,
        service_account_file: None,
        credentials_file: PathBuf::from("credenciais.json"),
        cookie: CookieSettings {
            name: COOKIE_NAME.into(),
            key: "chave-de-teste".into(),
            expiry_days: 30,
        },
        cache_ttl: Duration::from_secs(600),
        form_cache_ttl: Duration::from_secs(30),
        sheets_timeout: Duration::from_secs(10),
    }
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn app() -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::with_headers());
    store.seed(
        Table::Properties,
        vec![
            cells(&["AURO-APTO1", "Aurora", "Apto 1", "Rua A, 1", "Vago", "1200", "", ""]),
            cells(&["AURO-APTO2", "Aurora", "Apto 2", "Rua A, 1", "Vago", "1200", "", ""]),
        ],
    );
    store.seed(Table::Managers, vec![cells(&["Maria"])]);

    let mut credentials = CredentialMap::default();
    credentials.usernames.insert(
        "joao".into(),
        CredentialEntry {
            name: "João Silva".into(),
            email: "joao@exemplo.com".into(),
            password: bcrypt::hash("segredo", 4).unwrap(),
        },
    );

    let state = AppState::from_parts(store.clone(), credentials, settings());
    (store, build_app(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, body)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Faz login e devolve o par "nome=valor" do cookie de sessão.
async fn login(app: &Router) -> String {
    let (status, set_cookie, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "joao", "password": "segredo" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "authenticated");
    assert_eq!(body["name"], "João Silva");

    let set_cookie = set_cookie.expect("login deve definir o cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let (_, app) = app();

    let (status, _, body) = send(&app, get("/api/dashboard/overview", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let forged = format!("{}=nao-e-um-token", COOKIE_NAME);
    let (status, _, _) = send(&app, get("/api/properties", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = send(&app, get("/api/auth/me", Some(&forged))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let (_, _, body) = send(&app, get("/api/auth/me", None)).await;
    assert_eq!(body["status"], "unset");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (_, app) = app();

    let (status, set_cookie, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "joao", "password": "errada" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(set_cookie.is_none());
    assert_eq!(body["error"], "Usuário ou senha incorretos.");
}

#[tokio::test]
async fn lease_payment_and_cancellation_flow_through_the_overview() {
    let (store, app) = app();
    let cookie = login(&app).await;

    // Visão Geral com a planilha sem contratos
    let (status, _, overview) =
        send(&app, get("/api/dashboard/overview?date=2025-03-15", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["occupancy"]["rented"], 0);
    assert_eq!(overview["occupancy"]["total"], 2);
    assert_eq!(
        overview["emptyTables"],
        json!(["Contratos", "Lancamentos_Financeiros"])
    );

    // Novo contrato: imóvel passa para Alugado
    let (status, _, lease) = send(
        &app,
        json_request(
            "POST",
            "/api/leases",
            Some(&cookie),
            json!({
                "propertyId": "AURO-APTO1",
                "manager": "Maria",
                "tenantName": "Carlos Lima",
                "startDate": "2025-01-01",
                "endDate": "2025-04-30",
                "baseRent": 1000,
                "dueDay": 10
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lease["id"], "AURO-APTO1-20250101");
    assert_eq!(store.snapshot(Table::Properties)[1][4], "Alugado");

    // O cache de Imoveis foi invalidado pela escrita
    let (_, _, overview) =
        send(&app, get("/api/dashboard/overview?date=2025-03-15", Some(&cookie))).await;
    assert_eq!(overview["occupancy"]["rented"], 1);
    assert_eq!(overview["reconciliation"]["mismatch"], false);
    assert_eq!(overview["overdue"][0]["leaseId"], "AURO-APTO1-20250101");
    assert_eq!(overview["expiring"][0]["daysRemaining"], 46);

    // Pagamento do mês tira o contrato do atraso
    let (status, _, entry) = send(
        &app,
        json_request(
            "POST",
            "/api/payments",
            Some(&cookie),
            json!({
                "leaseId": "AURO-APTO1-20250101",
                "referencePeriod": "03/2025",
                "paymentDate": "2025-03-12",
                "baseRentPaid": 1000,
                "penaltyInterest": 20,
                "method": "PIX"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["id"], "1");

    let (_, _, overview) =
        send(&app, get("/api/dashboard/overview?date=2025-03-15", Some(&cookie))).await;
    assert!(overview["overdue"].as_array().unwrap().is_empty());
    assert_eq!(overview["collection"]["collected"], 1020.0);
    assert_eq!(overview["collection"]["rate"], 102.0);

    // Cancelamento: só a coluna de status muda e o lançamento sai das somas
    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/payments/1/cancel", Some(&cookie), Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.snapshot(Table::Ledger)[1][9], "Cancelado");

    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/payments/1/cancel", Some(&cookie), Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, _, overview) =
        send(&app, get("/api/dashboard/overview?date=2025-03-15", Some(&cookie))).await;
    assert_eq!(overview["collection"]["collected"], 0.0);
    assert_eq!(overview["overdue"].as_array().unwrap().len(), 1);

    let (_, _, history) = send(&app, get("/api/payments", Some(&cookie))).await;
    assert_eq!(history["rows"].as_array().unwrap().len(), 1);
    assert_eq!(history["totalValid"], 0.0);
}

#[tokio::test]
async fn rented_property_rejects_second_lease() {
    let (store, app) = app();
    let cookie = login(&app).await;

    let lease = json!({
        "propertyId": "AURO-APTO2",
        "manager": "Maria",
        "tenantName": "Ana",
        "startDate": "2025-02-01",
        "endDate": "2026-01-31",
        "baseRent": 900,
        "dueDay": 5
    });
    let (status, _, _) = send(&app, json_request("POST", "/api/leases", Some(&cookie), lease.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(&app, json_request("POST", "/api/leases", Some(&cookie), lease)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("AURO-APTO2"));
    assert_eq!(store.snapshot(Table::Leases).len(), 2);
}

#[tokio::test]
async fn edit_property_flow_walks_to_a_prefilled_form() {
    let (_, app) = app();
    let cookie = login(&app).await;

    let (status, _, view) = send(
        &app,
        json_request("POST", "/api/flows/edit-property", Some(&cookie), json!({ "inputs": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["step"]["step"], "selectGroup");
    assert_eq!(view["groups"], json!(["Aurora"]));

    let (status, _, view) = send(
        &app,
        json_request(
            "POST",
            "/api/flows/edit-property",
            Some(&cookie),
            json!({ "inputs": [
                { "action": "chooseGroup", "group": "Aurora" },
                { "action": "chooseTarget", "id": "AURO-APTO2" }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["step"]["step"], "editForm");
    assert_eq!(view["step"]["targetId"], "AURO-APTO2");
    assert_eq!(view["prefill"]["unit"], "Apto 2");

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/api/flows/edit-property",
            Some(&cookie),
            json!({ "inputs": [{ "action": "chooseGroup", "group": "Centro" }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
