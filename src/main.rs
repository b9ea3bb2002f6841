use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use catalog_api_rust::database::manager::DatabaseManager;
use catalog_api_rust::database::models::{Book, Job, Product};
use catalog_api_rust::database::schema::Resource;
use catalog_api_rust::handlers::{resources, users};
use catalog_api_rust::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, CATALOG_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = catalog_api_rust::config::config();
    tracing::info!("Starting Catalog API in {:?} mode", config.environment);

    // A missing database only degrades /health; the server still starts
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::warn!("Migrations not applied, database unavailable: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CATALOG_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Catalog API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Account routes (token acquisition)
        .merge(user_routes())
        // One CRUD surface per resource type
        .nest("/api/books", resource_routes::<Book>())
        .nest("/api/jobs", resource_routes::<Job>())
        .nest("/api/products", resource_routes::<Product>())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    Router::new()
        .route("/api/users/login", post(users::login))
        .route("/api/users/signup", post(users::signup))
}

/// Reads are public; writes sit behind the auth guard via a route layer.
fn resource_routes<R: Resource + Send + Sync + 'static>() -> Router {
    let protected = Router::new()
        .route("/", post(resources::create::<R>))
        .route(
            "/:id",
            put(resources::update::<R>).delete(resources::remove::<R>),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware));

    Router::new()
        .route("/", get(resources::list::<R>))
        .route("/:id", get(resources::get_by_id::<R>))
        .merge(protected)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Catalog API",
        "version": version,
        "description": "One CRUD backend for book, job, and product catalogs",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "accounts": "POST /api/users/signup, POST /api/users/login (public - token acquisition)",
            "books": "/api/books[/:id] (reads public, writes protected)",
            "jobs": "/api/jobs[/:id] (reads public, writes protected)",
            "products": "/api/products[/:id] (reads public, writes protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "error": "database unavailable",
                "database_error": e.to_string()
            })),
        ),
    }
}
