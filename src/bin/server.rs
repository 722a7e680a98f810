use axum::{
    routing::{any, delete, get},
    Extension, Router,
};
use memind_server::render::Pages;
use memind_server::storage::MediaStore;
use memind_server::{migrator, web};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    memind_server::telemetry::init_telemetry("memind-server");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    // Database Connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    memind_server::metrics::init_metrics(&db).await;

    let store = MediaStore::from_env();
    let pages = Pages::new("templates").expect("Failed to load templates");

    let app = app(db, store, pages, prometheus_layer, metric_handle);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()
        .expect("Invalid BIND_ADDR");
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn app(
    db: DatabaseConnection,
    store: MediaStore,
    pages: Pages,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    let public_routes = Router::new()
        .route("/", get(web::pages::home))
        .route("/register/", get(web::auth::register_page).post(web::auth::register))
        .route("/login/", get(web::auth::login_page).post(web::auth::login))
        .route("/logout/", any(web::auth::logout))
        .route("/about/", get(web::pages::about))
        .route("/tips/", get(web::pages::tips))
        .route("/roadmap/", get(web::pages::roadmap))
        .route("/why-diary/", get(web::pages::why_diary))
        .route("/media/*path", get(web::media::serve));

    let protected_routes = Router::new()
        .route("/diary/", get(web::entries::diary))
        .route(
            "/entry/create/",
            get(web::entries::create_page).post(web::entries::create),
        )
        .route("/entry/:id/", get(web::entries::detail))
        .route(
            "/entry/:id/edit/",
            get(web::entries::edit_page).post(web::entries::edit),
        )
        .route(
            "/entry/:id/delete/",
            get(web::entries::delete_page).post(web::entries::delete),
        )
        .route(
            "/entry/:id/toggle-favorite/",
            any(web::entries::toggle_favorite),
        )
        .route("/image/:id/delete/", any(web::images::delete))
        .route("/profile/", get(web::profile::view))
        .route(
            "/profile/edit/",
            get(web::profile::edit_page).post(web::profile::edit),
        )
        .route_layer(axum::middleware::from_fn(web::middleware::require_auth));

    let admin_routes = Router::new()
        .route("/admin/users", get(web::admin::list_users))
        .route("/admin/entries", get(web::admin::list_entries))
        .route("/admin/entries/:id", delete(web::admin::delete_entry))
        .route_layer(axum::middleware::from_fn(web::middleware::require_staff))
        .route_layer(axum::middleware::from_fn(web::middleware::require_auth));

    Router::new()
        .route("/health", get(web::pages::health_check))
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(Extension(db))
        .layer(Extension(store))
        .layer(Extension(pages))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // Span name is "METHOD /path" so requests group by route.
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Filled in by handlers
                        action = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(
                    |_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                        // Skip the default "started processing request" log.
                    },
                )
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(axum::extract::DefaultBodyLimit::max(50 * 1024 * 1024))
}
