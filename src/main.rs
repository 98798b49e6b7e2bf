use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use studycoor_core::constants::{DEFAULT_REST_ADDR, REST_ADDR_ENV, UTC_OFFSET_ENV};
use studycoor_core::CoreConfig;

/// Main entry point for the StudyCoor service.
///
/// Resolves configuration once, then serves the REST API with OpenAPI/Swagger UI.
///
/// # Environment Variables
/// - `STUDYCOOR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `STUDYCOOR_UTC_OFFSET`: UTC offset of the study calendar, e.g. "+01:00" (default: UTC)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the UTC offset is malformed,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studycoor=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_value(std::env::var(UTC_OFFSET_ENV).ok())?;
    let addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("++ Starting StudyCoor REST on {}", addr);
    tracing::info!("++ Study calendar offset {}", cfg.utc_offset());

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
