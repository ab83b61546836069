//! Gateway lifecycle
//!
//! Startup: connect the publisher, build metrics, tracer and logger,
//! assemble the chain, bind both listeners. Shutdown: stop accepting,
//! drain in-flight requests, then close the publisher.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::{BrokerBackend, BrokerConfig, PushConfig};
use crate::endpoint::{Endpoint, PushEndpoint};
use crate::error::{PushError, Result};
use crate::metrics::PrometheusMetrics;
use crate::middleware::{build_chain, Instruments};
use crate::publisher::memory::MemoryPublisher;
use crate::publisher::nats::NatsPublisher;
use crate::publisher::Publisher;
use crate::transport::{diagnostics, http};

/// Connect the publisher selected by the broker config
pub async fn connect_publisher(config: &BrokerConfig) -> Result<Arc<dyn Publisher>> {
    let publisher: Arc<dyn Publisher> = match config.backend {
        BrokerBackend::Nats => Arc::new(
            NatsPublisher::connect(config.nats.clone(), &config.topic, config.partitions).await?,
        ),
        BrokerBackend::Memory => Arc::new(MemoryPublisher::with_partitions(config.partitions)),
    };
    tracing::info!(
        backend = publisher.name(),
        topic = %config.topic,
        partitions = config.partitions,
        "Publisher ready"
    );
    Ok(publisher)
}

/// A fully assembled gateway, ready to serve
pub struct Gateway {
    app: Router,
    diagnostics: Router,
    publisher: Arc<dyn Publisher>,
}

impl Gateway {
    /// Connect to the broker and assemble the push chain
    pub async fn build(config: &PushConfig) -> Result<Self> {
        config.validate()?;
        let publisher = connect_publisher(&config.broker).await?;
        Ok(Self::with_publisher(config, publisher))
    }

    /// Assemble the push chain over an already connected publisher
    pub fn with_publisher(config: &PushConfig, publisher: Arc<dyn Publisher>) -> Self {
        let metrics = Arc::new(PrometheusMetrics::new());
        let instruments = Instruments::new(metrics.clone(), config.tracing.enabled);
        let chain = build_chain(publisher.clone(), &config.broker.topic, &instruments);
        let endpoint: Arc<dyn Endpoint> = Arc::new(PushEndpoint::new(chain));

        Self {
            app: http::router(endpoint),
            diagnostics: diagnostics::router(metrics, publisher.name()),
            publisher,
        }
    }

    /// Push endpoint router
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Diagnostics router
    pub fn diagnostics(&self) -> Router {
        self.diagnostics.clone()
    }

    /// Serve both routers until `shutdown` resolves, then close the publisher
    pub async fn run<F>(self, http: TcpListener, debug: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown.await;
            let _ = stop_tx.send(true);
        });

        let served = tokio::try_join!(
            serve(http, self.app, stop_rx.clone()),
            serve(debug, self.diagnostics, stop_rx),
        );

        tracing::info!("Listeners stopped, closing publisher");
        let closed = self.publisher.close().await;
        served?;
        closed
    }
}

async fn serve(listener: TcpListener, app: Router, mut stop: watch::Receiver<bool>) -> Result<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| PushError::Server(e.to_string()))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        })
        .await
        .map_err(|e| PushError::Server(format!("Server error on {addr}: {e}")))
}

async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| PushError::Server(format!("Failed to bind to {addr}: {e}")))
}

/// Start the gateway and serve until Ctrl-C
pub async fn start(config: PushConfig) -> Result<()> {
    let gateway = Gateway::build(&config).await?;

    let http = bind(&config.http.bind_address()).await?;
    let debug = bind(&config.debug.bind_address()).await?;

    gateway.run(http, debug, shutdown_signal()).await?;
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}
