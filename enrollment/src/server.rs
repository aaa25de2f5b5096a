//! HTTP/1 server loop with graceful shutdown.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use crate::context::RequestContext;
use crate::middleware::MiddlewareStack;
use crate::response::BoxBody;
use crate::router::Router;
use crate::state::AppState;

/// How long in-flight connections get to finish after shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a connection needs to answer requests.
#[derive(Clone)]
pub(crate) struct Service {
    pub(crate) router: Arc<Router>,
    pub(crate) state: Arc<AppState>,
    pub(crate) middlewares: Arc<MiddlewareStack>,
}

impl Service {
    pub(crate) fn new(router: Router, state: AppState, middlewares: MiddlewareStack) -> Self {
        Self {
            router: Arc::new(router),
            state: Arc::new(state),
            middlewares: Arc::new(middlewares),
        }
    }

    /// Runs one request through the middleware stack and the router.
    pub(crate) async fn call(
        self,
        mut req: Request<Incoming>,
    ) -> Result<Response<BoxBody>, Infallible> {
        let ctx = RequestContext::from_headers(req.headers());
        req.extensions_mut().insert(ctx.clone());
        let response = self
            .middlewares
            .execute(req, &self.router, &self.state, &ctx)
            .await;
        Ok(response)
    }
}

/// Accepts connections on `addr` until `shutdown` resolves, then drains.
pub async fn serve(
    router: Router,
    state: AppState,
    middlewares: MiddlewareStack,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    let service = Service::new(router, state, middlewares);
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        tracing::warn!(error = %err, "accept failed");
                        continue;
                    }
                };
                let service = service.clone();
                let conn = http1::Builder::new().serve_connection(
                    TokioIo::new(stream),
                    service_fn(move |req| service.clone().call(req)),
                );
                let conn = graceful.watch(conn);
                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        tracing::debug!(%peer, error = %err, "connection closed with error");
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }

    drop(listener);
    tokio::select! {
        _ = graceful.shutdown() => tracing::info!("all connections drained"),
        _ = tokio::time::sleep(DRAIN_TIMEOUT) => tracing::warn!("drain timed out"),
    }
    Ok(())
}
