#![allow(dead_code)]

use forexpay::application::controller::PaymentFormController;
use forexpay::config::Config;
use forexpay::domain::session::SessionContext;
use forexpay::infrastructure::http::ApiClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "7";
pub const TOKEN: &str = "t0k3n";

pub fn session() -> SessionContext {
    SessionContext::new(USER_ID, Some(TOKEN.to_string()))
}

pub fn config(server: &MockServer) -> Config {
    Config::default()
        .with_api_url(server.uri())
        .with_processing_delay(Duration::ZERO)
        .with_progress_interval(Duration::from_millis(5))
}

pub fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&config(server), &session()).unwrap()
}

pub fn controller(server: &MockServer) -> PaymentFormController {
    let client = Arc::new(client(server));
    PaymentFormController::new(
        session(),
        config(server),
        client.clone(),
        client.clone(),
        client,
    )
}

pub async fn mount_card(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/card/{USER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 31,
            "cardNumber": "5105105105105100",
            "balance": 25000.0,
            "currency": {"code": "INR"}
        })))
        .mount(server)
        .await;
}

pub async fn mount_rate(server: &MockServer, code: &str, rate: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/currency/{code}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(rate)))
        .mount(server)
        .await;
}

pub async fn mount_rate_delayed(server: &MockServer, code: &str, rate: f64, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/currency/{code}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(rate))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}
