//! Ephemeral content server - serves the deck's static files over loopback

use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{E2eError, E2eResult};

/// How long `stop` waits for the serving task before giving up on it
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to a running content server
pub struct ContentServer {
    addr: SocketAddr,
    base_url: String,
    root_dir: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ContentServer {
    /// Bind a loopback listener and start serving `config.root_dir`
    pub async fn start(config: &ServerConfig) -> E2eResult<Self> {
        let root_dir = config.root_dir.canonicalize().map_err(|e| {
            E2eError::ServerStartup(format!(
                "root directory {} is not accessible: {}",
                config.root_dir.display(),
                e
            ))
        })?;
        if !root_dir.is_dir() {
            return Err(E2eError::ServerStartup(format!(
                "root {} is not a directory",
                root_dir.display()
            )));
        }

        let bind = format!("{}:{}", config.host, config.port.unwrap_or(0));
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .map_err(|e| E2eError::ServerStartup(format!("failed to bind {}: {}", bind, e)))?;
        let addr = listener.local_addr()?;
        let base_url = format!("http://{}", addr);

        // No per-request logging.
        let app = router(&root_dir);

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!("content server stopped with error: {}", e);
            }
        });

        info!("Serving {} at {}", root_dir.display(), base_url);

        Ok(Self {
            addr,
            base_url,
            root_dir,
            shutdown: Some(tx),
            task: Some(task),
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:49152`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// URL of a file below the served root
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop serving. Safe to call more than once.
    pub async fn stop(&mut self) {
        self.signal_shutdown();

        let Some(task) = self.task.take() else {
            return;
        };

        match tokio::time::timeout(STOP_JOIN_TIMEOUT, task).await {
            Ok(Ok(())) => debug!("content server on {} stopped", self.addr),
            Ok(Err(e)) => warn!("content server task failed: {}", e),
            Err(_) => warn!(
                "content server on {} did not stop within {:?}, detaching",
                self.addr, STOP_JOIN_TIMEOUT
            ),
        }
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ContentServer {
    fn drop(&mut self) {
        self.signal_shutdown();
    }
}

fn router(root_dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(root_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &Path) -> ServerConfig {
        ServerConfig {
            root_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_binds_os_assigned_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = ContentServer::start(&config_for(dir.path())).await.unwrap();

        assert!(server.port() > 0);
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert_eq!(
            server.url_for("/index.html"),
            format!("{}/index.html", server.base_url())
        );
        assert!(server.is_running());

        server.stop().await;
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = ContentServer::start(&config_for(dir.path())).await.unwrap();
        server.stop().await;
        server.stop().await;
    }

    #[tokio::test]
    async fn test_missing_root_is_setup_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = ContentServer::start(&config_for(&missing)).await.err().unwrap();
        assert!(matches!(err, E2eError::ServerStartup(_)));
    }

    #[tokio::test]
    async fn test_bind_conflict_is_setup_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ContentServer::start(&config_for(dir.path())).await.unwrap();

        let taken = ServerConfig {
            port: Some(first.port()),
            ..config_for(dir.path())
        };
        let err = ContentServer::start(&taken).await.err().unwrap();
        assert!(matches!(err, E2eError::ServerStartup(_)));

        first.stop().await;
    }
}
