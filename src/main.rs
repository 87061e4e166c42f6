use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod stats;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route(
            "/api/v1/auth/me",
            get(handlers::auth::me).patch(handlers::auth::update_profile),
        )
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        // Mood check-ins
        .route(
            "/api/v1/feelings/entrada",
            post(handlers::feelings::entry_checkin),
        )
        .route(
            "/api/v1/feelings/saida",
            post(handlers::feelings::exit_checkin),
        )
        .route("/api/v1/feelings", get(handlers::feelings::list_feelings))
        .route(
            "/api/v1/feelings/entrada/:day",
            patch(handlers::feelings::update_entry),
        )
        .route(
            "/api/v1/feelings/saida/:day",
            patch(handlers::feelings::update_exit),
        )
        // Bot check-ins (free-text emotion from the external classifier)
        .route(
            "/api/v1/feeling-bot",
            post(handlers::feeling_bot::upsert_day)
                .get(handlers::feeling_bot::list)
                .delete(handlers::feeling_bot::delete_all),
        )
        .route(
            "/api/v1/feeling-bot/:day",
            delete(handlers::feeling_bot::delete_day),
        )
        // Trails
        .route("/api/v1/trails", get(handlers::trails::list_trails))
        .route("/api/v1/trails/id/:trailId", get(handlers::trails::get_trail))
        .route(
            "/api/v1/trails/obj/:id",
            get(handlers::trails::get_trail_by_uuid),
        )
        .route(
            "/api/v1/trails/progress",
            get(handlers::trails::trail_progress),
        )
        .route(
            "/api/v1/trails/recommendations",
            get(handlers::trails::recommend_trails),
        )
        .route(
            "/api/v1/trails/registro",
            post(handlers::trails::register_exercise),
        )
        .route("/api/v1/trails/next", get(handlers::trails::next_exercise))
        // Stats
        .route("/api/v1/trails/stats", get(handlers::stats::get_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindcare_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let state = AppState {
        db,
        config: config.clone(),
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .expect("FRONTEND_URL must be a valid origin")];
        // In dev, also allow LAN access (e.g. the Expo client on a device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let router = app(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, router)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        // connect_lazy never touches the network until a query runs, so
        // routes that skip the DB are testable without Postgres.
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/mindcare_test")
            .unwrap();

        AppState {
            db,
            config: Arc::new(Config {
                database_url: "postgres://localhost/mindcare_test".into(),
                host: "127.0.0.1".into(),
                port: 0,
                frontend_url: "http://localhost:8081".into(),
                jwt_secret: "test-secret".into(),
                jwt_access_ttl_secs: 900,
                jwt_refresh_ttl_secs: 604_800,
            }),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = app(test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "mindcare-api");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let router = app(test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/trails/stats?period=week")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bot_checkin_route_requires_token() {
        let router = app(test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/feeling-bot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_trail_progress_route_requires_token() {
        let router = app(test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/trails/progress")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_bearer_token_is_rejected() {
        let router = app(test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/feelings")
                    .header("Authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
