use std::future::Future;
use std::net::SocketAddr;

use crate::config::Settings;
use crate::middleware::{Middleware, MiddlewareStack};
use crate::observability::{TracingConfig, TracingInitError};
use crate::router::Router;
use crate::server::serve;
use crate::state::AppState;
use crate::store::Store;

/// Application builder: routes, shared state, and middleware.
///
/// ```ignore
/// App::new()
///     .with_tracing(TracingConfig::new())?
///     .middleware(RequestLogMiddleware::new())
///     .router(api::routes())
///     .listen("127.0.0.1:8000")
///     .await
/// ```
#[derive(Default)]
pub struct App {
    pub(crate) router: Router,
    pub(crate) state: AppState,
    pub(crate) middlewares: MiddlewareStack,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn store(mut self, store: Store) -> Self {
        self.state = self.state.with_store(store);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.state = self.state.with_settings(settings);
        self
    }

    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middlewares.add(middleware);
        self
    }

    /// Installs the global tracing subscriber.
    pub fn with_tracing(self, config: TracingConfig) -> Result<Self, TracingInitError> {
        config.init()?;
        Ok(self)
    }

    /// Serves until Ctrl-C.
    pub async fn listen(self, addr: &str) -> std::io::Result<()> {
        self.listen_with_shutdown(addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for ctrl-c");
            }
        })
        .await
    }

    /// Serves until `shutdown` resolves.
    pub async fn listen_with_shutdown(
        self,
        addr: &str,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        let addr: SocketAddr = addr.parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid address '{}': {}", addr, e),
            )
        })?;
        serve(self.router, self.state, self.middlewares, addr, shutdown).await
    }
}
