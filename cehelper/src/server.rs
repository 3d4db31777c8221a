use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use warp::Filter;
use warp::reply::Reply;

use crate::admission::{MutatingAdmissionHandler, mutate_route};
use crate::{Error, Result};

/// TLS webhook server exposing `POST /mutate` and `GET /healthz`
pub struct WebhookServer {
    addr: SocketAddr,
    tls_cert: PathBuf,
    tls_key: PathBuf,
}

impl WebhookServer {
    /// Start building a server
    #[must_use]
    pub fn builder() -> WebhookServerBuilder {
        WebhookServerBuilder::default()
    }

    /// Runs the server until Ctrl-C or SIGTERM
    ///
    /// The certificate and key are read before binding; a missing file is
    /// reported as [`Error::Tls`], unusable PEM content or a taken port as
    /// [`Error::Bind`].
    pub async fn run<H>(self, handler: Option<Arc<H>>) -> Result<()>
    where
        H: MutatingAdmissionHandler + 'static,
    {
        let cert = read_pem(&self.tls_cert).await?;
        let key = read_pem(&self.tls_key).await?;

        let (addr, server) = warp::serve(routes(handler))
            .tls()
            .cert(cert)
            .key(key)
            .try_bind_with_graceful_shutdown(self.addr, shutdown_signal())
            .map_err(Error::Bind)?;

        info!(%addr, "starting webhook server");
        server.await;
        info!("webhook server stopped");

        Ok(())
    }
}

#[doc(hidden)]
pub struct WebhookServerBuilder {
    addr: SocketAddr,
    tls_cert: PathBuf,
    tls_key: PathBuf,
}

impl Default for WebhookServerBuilder {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8443)),
            tls_cert: PathBuf::from("/tls/tls.crt"),
            tls_key: PathBuf::from("/tls/tls.key"),
        }
    }
}

impl WebhookServerBuilder {
    #[must_use]
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// PEM certificate and key paths
    #[must_use]
    pub fn tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls_cert = cert.into();
        self.tls_key = key.into();
        self
    }

    #[must_use]
    pub fn build(self) -> WebhookServer {
        WebhookServer {
            addr: self.addr,
            tls_cert: self.tls_cert,
            tls_key: self.tls_key,
        }
    }
}

/// All routes served by the webhook
pub fn routes<H>(
    handler: Option<Arc<H>>,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone
where
    H: MutatingAdmissionHandler + 'static,
{
    let healthz = warp::get()
        .and(warp::path("healthz"))
        .and(warp::path::end())
        .map(|| "ok");

    mutate_route(handler)
        .or(healthz)
        .with(warp::trace::request())
}

async fn read_pem(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| Error::Tls {
        path: path.to_path_buf(),
        source,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
