use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{IdentityProvider, JwtIdentityProvider};
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{approvals, arrangements, auth, health};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        let jwt = Arc::new(jwt);
        let identity = Arc::new(JwtIdentityProvider::new(jwt.clone()));
        Self { pool, jwt, identity }
    }

    /// Swap in a different identity provider (e.g. a hosted one).
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let state = AppState::new(pool, jwt_config);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        // session-style entry point: reads the `session` cookie
        .route("/me", get(auth::me));

    let arrangement_routes = Router::new()
        .route("/", post(arrangements::apply))
        .route("/me", get(arrangements::list_own))
        .route("/team", get(arrangements::list_team))
        .route("/org", get(arrangements::list_org))
        .route("/:id/withdraw", put(arrangements::request_withdrawal));

    let approval_routes = Router::new()
        .route("/", get(approvals::list_pending))
        .route("/:id", put(approvals::decide));

    let withdrawal_routes = Router::new()
        .route("/", get(approvals::list_pending_withdrawals))
        .route("/:id", put(approvals::decide_withdrawal));

    let router = Router::new()
        .route("/api/health", get(health::health))
        .nest("/auth", auth_routes)
        .nest("/arrangements", arrangement_routes)
        .nest("/approvals", approval_routes)
        .nest("/withdrawals", withdrawal_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
