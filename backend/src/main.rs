//! Backend entry-point: loads settings, wires the provider clients and
//! serves the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bankdash::inbound::http::health::HealthState;
use bankdash::inbound::http::session_config::{BuildMode, session_settings_from_env};
use bankdash::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| {
        error!(error = %e, "failed to load settings");
        std::io::Error::other(format!("failed to load settings: {e}"))
    })?;
    let providers = settings.validate().map_err(|e| {
        error!(error = %e, "invalid settings");
        std::io::Error::other(e.to_string())
    })?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| {
            error!(error = %e, "invalid session configuration");
            std::io::Error::other(e.to_string())
        })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(providers, session))?;
    server.await
}
