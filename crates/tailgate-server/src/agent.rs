//! Agent: wires log, store, policy and TLS together and runs the listeners.
//!
//! Lifecycle:
//! - `start` binds the RPC listener (mTLS gRPC) and, if configured, the ops listener (HTTP).
//! - `shutdown` marks draining, cancels the root token (ends every tail, stops accepting), then
//!   waits for the servers up to the grace period before aborting them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use tailgate_core::error::{Result, TailgateError};
use tailgate_core::{CommitLog, MemoryProfileStore, PolicyDecisionPoint, ProfileStore};

use crate::api::ProfileLogServer;
use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::policy::AclPolicy;
use crate::router::build_ops_router;
use crate::rpc::ProfileLogService;
use crate::transport::{AuthInterceptor, TlsMaterial};

/// Everything the agent needs, resolved from [`GatewayConfig`] (or built directly in tests).
#[derive(Clone)]
pub struct AgentConfig {
    pub rpc_listen: SocketAddr,
    pub ops_listen: Option<SocketAddr>,
    pub tls: TlsMaterial,
    pub policy: Arc<dyn PolicyDecisionPoint>,
    pub shutdown_grace: Duration,
    pub stream_buffer: usize,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("rpc_listen", &self.rpc_listen)
            .field("ops_listen", &self.ops_listen)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("stream_buffer", &self.stream_buffer)
            .finish_non_exhaustive()
    }
}

impl AgentConfig {
    pub fn from_gateway_config(cfg: &GatewayConfig) -> Result<Self> {
        let policy = AclPolicy::new(&cfg.acl)?;
        Ok(Self {
            rpc_listen: cfg.server.listen_addr()?,
            ops_listen: cfg.ops.as_ref().map(|o| o.listen_addr()).transpose()?,
            tls: TlsMaterial::from_files(&cfg.tls)?,
            policy: Arc::new(policy),
            shutdown_grace: Duration::from_millis(cfg.server.shutdown_grace_ms),
            stream_buffer: cfg.server.stream_buffer,
        })
    }
}

pub struct Agent {
    state: AppState,
    rpc_addr: SocketAddr,
    ops_addr: Option<SocketAddr>,
    shutdown: CancellationToken,
    grace: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Agent {
    /// Bind both listeners and start serving. Returns once the sockets are bound.
    pub async fn start(cfg: AgentConfig) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let profiles: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::new());
        let state = AppState::new(
            Arc::new(CommitLog::new()),
            profiles,
            Arc::clone(&cfg.policy),
            shutdown.clone(),
            cfg.stream_buffer,
        );

        let (rpc_addr, rpc_task) = serve_rpc(&cfg, state.clone(), shutdown.clone()).await?;
        let mut tasks = vec![rpc_task];

        let ops_addr = match cfg.ops_listen {
            Some(listen) => {
                let (addr, task) = serve_ops(listen, state.clone(), shutdown.clone()).await?;
                tasks.push(task);
                Some(addr)
            }
            None => None,
        };

        Ok(Self {
            state,
            rpc_addr,
            ops_addr,
            shutdown,
            grace: cfg.shutdown_grace,
            tasks: Mutex::new(tasks),
        })
    }

    /// Bound RPC address (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.rpc_addr
    }

    pub fn ops_addr(&self) -> Option<SocketAddr> {
        self.ops_addr
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Drain and stop. Safe to call more than once.
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock().await);
        if tasks.is_empty() {
            return;
        }

        tracing::info!(grace_ms = self.grace.as_millis() as u64, "agent draining");
        self.state.metrics().set_draining();
        self.shutdown.cancel();

        let aborts: Vec<_> = tasks.iter().map(|t| t.abort_handle()).collect();
        let joined = futures_util::future::join_all(tasks);
        if tokio::time::timeout(self.grace, joined).await.is_err() {
            tracing::warn!(
                grace_ms = self.grace.as_millis() as u64,
                "shutdown grace elapsed; aborting servers"
            );
            for a in aborts {
                a.abort();
            }
        }
        tracing::info!("agent stopped");
    }
}

async fn bind(addr: SocketAddr, what: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| TailgateError::Internal(format!("{what} bind {addr} failed: {e}")))
}

fn local_addr(listener: &TcpListener, what: &str) -> Result<SocketAddr> {
    listener
        .local_addr()
        .map_err(|e| TailgateError::Internal(format!("{what} local_addr failed: {e}")))
}

async fn serve_rpc(
    cfg: &AgentConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = bind(cfg.rpc_listen, "rpc").await?;
    let addr = local_addr(&listener, "rpc")?;

    let service =
        ProfileLogServer::with_interceptor(ProfileLogService::new(state), AuthInterceptor);
    let router = Server::builder()
        .tls_config(cfg.tls.server_config())
        .map_err(|e| {
            tracing::error!(error = %e, "tls configuration rejected");
            TailgateError::BadConfig(format!("tls: {e}"))
        })?
        .add_service(service);

    tracing::info!(%addr, "rpc listening");
    let task = tokio::spawn(async move {
        let incoming = TcpListenerStream::new(listener);
        if let Err(e) = router
            .serve_with_incoming_shutdown(incoming, shutdown.cancelled_owned())
            .await
        {
            tracing::error!(error = %e, "rpc server failed");
        }
    });
    Ok((addr, task))
}

async fn serve_ops(
    listen: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = bind(listen, "ops").await?;
    let addr = local_addr(&listener, "ops")?;
    let app = build_ops_router(state);

    tracing::info!(%addr, "ops listening");
    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
        {
            tracing::error!(error = %e, "ops server failed");
        }
    });
    Ok((addr, task))
}
