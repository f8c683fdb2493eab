#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use jersey_arena::{
    AppResult, AppServices, Config,
    database::{DbPool, create_pool, run_migrations},
    external::{CheckoutGateway, HostedCheckoutRequest, HostedSession},
    services::CatalogSeeder,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records created sessions; tests flip them to paid.
#[derive(Default)]
pub struct FakeGateway {
    sessions: Mutex<HashMap<String, HostedSession>>,
    pub requests: Mutex<Vec<HostedCheckoutRequest>>,
}

impl FakeGateway {
    pub fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).expect("unknown session");
        session.paid = true;
    }

    pub fn last_request(&self) -> HostedCheckoutRequest {
        self.requests.lock().unwrap().last().cloned().expect("no session created")
    }

    pub fn last_session_id(&self) -> String {
        let count = self.requests.lock().unwrap().len();
        format!("cs_test_{count}")
    }
}

#[async_trait]
impl CheckoutGateway for FakeGateway {
    async fn create_session(&self, request: HostedCheckoutRequest) -> AppResult<HostedSession> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let id = format!("cs_test_{}", requests.len());
        let session = HostedSession {
            id: id.clone(),
            url: Some(format!("https://checkout.test/{id}")),
            paid: false,
            amount_total: Some(request.amount),
            metadata: request.metadata,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> AppResult<HostedSession> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| jersey_arena::AppError::NotFound("No such session".to_string()))
    }
}

pub struct TestContext {
    pub pool: DbPool,
    pub config: Config,
    pub services: AppServices,
    pub gateway: Arc<FakeGateway>,
}

pub fn test_config() -> Config {
    toml::from_str(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [database]
        url = "sqlite::memory:"
        max_connections = 1

        [jwt]
        secret = "integration-secret"
        access_token_expires_in = 3600
        refresh_token_expires_in = 7200

        [client]
        frontend_url = "http://localhost:5173"

        [media]
        root = "media"
        base_url = "http://127.0.0.1:8000/media/"
        "#,
    )
    .expect("test config")
}

pub async fn setup() -> TestContext {
    let config = test_config();
    let pool = create_pool(&config.database).await.expect("sqlite pool");
    run_migrations(&pool).await.expect("migrations");
    CatalogSeeder::new(pool.clone()).sync().await.expect("seed");

    let gateway = Arc::new(FakeGateway::default());
    let services = AppServices::new(pool.clone(), &config, gateway.clone());

    TestContext {
        pool,
        config,
        services,
        gateway,
    }
}

#[macro_export]
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(jersey_arena::middlewares::AuthMiddleware::new(
                    $ctx.services.jwt_service.clone(),
                ))
                .configure(|cfg| $ctx.services.configure(cfg)),
        )
        .await
    };
}

/// Sends a request and returns status plus JSON body (Null when empty).
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match app.call(req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, json)
        }
        Err(err) => (err.as_response_error().status_code(), Value::Null),
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Registers `username` and returns its access token.
pub async fn register<S, B>(app: &S, username: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "locker-room-9",
            "re_password": "locker-room-9",
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}
