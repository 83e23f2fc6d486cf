use assessment_backend::{
    admin_routes,
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::rate_limit::{rps_middleware, RateLimiter},
    public_routes, routes, AppState,
};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let admin_api = admin_routes().layer(axum::middleware::from_fn_with_state(
        RateLimiter::new(config.admin_rps),
        rps_middleware,
    ));
    let public_api = public_routes().layer(axum::middleware::from_fn_with_state(
        RateLimiter::new(config.public_rps),
        rps_middleware,
    ));

    let app = base_routes
        .merge(admin_api)
        .merge(public_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
