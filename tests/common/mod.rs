#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use permit_gate::{app::build_router, config::Config, services::auth::build_auth_service, state::AppState};
use serde_json::{Map, Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
pub const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");

pub const DOMAIN: &str = "example.auth0.com";
pub const AUDIENCE: &str = "my-api";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// A provider stand-in serving the fixture key set.
pub async fn provider(expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(JWKS, "application/json"))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

pub fn config_for(server: &MockServer) -> Config {
    let jwks_url = format!("{}{JWKS_PATH}", server.uri());
    Config::from_lookup(|key| match key {
        "AUTH0_DOMAIN" => Some(DOMAIN.to_string()),
        "API_AUDIENCE" => Some(AUDIENCE.to_string()),
        "AUTH_JWKS_URL" => Some(jwks_url.clone()),
        "JWKS_FETCH_TIMEOUT_MS" => Some("1000".to_string()),
        "JWKS_MIN_REFRESH_SECONDS" => Some("0".to_string()),
        _ => None,
    })
    .expect("config")
}

pub fn app_for(server: &MockServer) -> Router {
    let config = config_for(server);
    let auth = build_auth_service(&config).expect("auth service");
    build_router(AppState::new(auth), &config)
}

pub fn claims(permissions: &[&str]) -> Map<String, Value> {
    let now = chrono::Utc::now().timestamp();
    let value = json!({
        "iss": format!("https://{DOMAIN}/"),
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

pub fn sign_with(pem: &str, kid: &str, claims: &Map<String, Value>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture pem");
    encode(&header, claims, &key).expect("sign")
}

pub fn sign(claims: &Map<String, Value>) -> String {
    sign_with(SIGNING_KEY_PEM, "abc", claims)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).expect("request"))
        .await
        .expect("infallible");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, body)
}
