use std::path::Path;

use crate::config::{BrokerBackend, PushConfig};
use crate::error::Result;
use crate::server;

/// Load config, apply command-line overrides and run the gateway.
pub async fn execute(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    backend: Option<BrokerBackend>,
) -> Result<()> {
    let config = resolve_config(config_path, host, port, backend)?;

    tracing::info!(
        http = %config.http.bind_address(),
        debug = %config.debug.bind_address(),
        backend = ?config.broker.backend,
        topic = %config.broker.topic,
        "Starting a3s-push"
    );

    server::start(config).await
}

/// Read the config file, apply overrides, then validate the result
fn resolve_config(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    backend: Option<BrokerBackend>,
) -> Result<PushConfig> {
    let mut config = PushConfig::load(config_path)?;
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }
    if let Some(backend) = backend {
        config.broker.backend = backend;
    }
    config.validate()?;
    Ok(config)
}
