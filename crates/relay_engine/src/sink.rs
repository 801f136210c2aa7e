// Image sink: receives pushed images over HTTP and stores them by name.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::post,
    Router,
};
use relay_logging::{relay_debug, relay_error, relay_info};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::persist::{ensure_output_dir, is_plain_file_name, AtomicFileWriter, PersistError};

/// Route prefix collectors expose; uploads go to `{prefix}/{name}`.
pub const SINK_ROUTE_PREFIX: &str = "/add/image";

#[derive(Debug, Clone)]
pub struct SinkSettings {
    pub host: String,
    pub port: u16,
    pub storage_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            storage_dir: PathBuf::from("received_images"),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("storage directory unavailable: {0}")]
    Storage(#[from] PersistError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start sink thread: {0}")]
    Runtime(#[source] io::Error),
    #[error("sink thread exited before it was ready")]
    ThreadExited,
}

/// Running sink. Dropping the handle leaves the server running until the process exits.
pub struct SinkHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    thread: Option<thread::JoinHandle<()>>,
}

impl SinkHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Collector base URL for this sink, suitable for a server list.
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.local_addr, SINK_ROUTE_PREFIX)
    }

    /// Stops accepting connections and waits for the server thread to exit.
    pub fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub struct SinkService;

impl SinkService {
    /// Starts the sink on its own thread and runtime.
    ///
    /// Returns once the listener is bound, so a port conflict is reported here
    /// rather than lost on the background thread.
    pub fn spawn(settings: SinkSettings) -> Result<SinkHandle, SinkError> {
        ensure_output_dir(&settings.storage_dir)?;

        let (ready_tx, ready_rx) = mpsc::channel::<Result<SocketAddr, SinkError>>();
        let shutdown = CancellationToken::new();
        let server_shutdown = shutdown.clone();

        let thread = thread::Builder::new()
            .name("image-sink".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = ready_tx.send(Err(SinkError::Runtime(err)));
                        return;
                    }
                };
                runtime.block_on(serve(settings, ready_tx, server_shutdown));
            })
            .map_err(SinkError::Runtime)?;

        match ready_rx.recv() {
            Ok(Ok(local_addr)) => Ok(SinkHandle {
                local_addr,
                shutdown,
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => Err(SinkError::ThreadExited),
        }
    }

    /// [`SinkService::spawn`] for async callers: waits for the bind on the
    /// blocking pool instead of parking a runtime worker.
    pub async fn start(settings: SinkSettings) -> Result<SinkHandle, SinkError> {
        tokio::task::spawn_blocking(move || Self::spawn(settings))
            .await
            .map_err(|_| SinkError::ThreadExited)?
    }
}

async fn serve(
    settings: SinkSettings,
    ready_tx: mpsc::Sender<Result<SocketAddr, SinkError>>,
    shutdown: CancellationToken,
) {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(source) => {
            let _ = ready_tx.send(Err(SinkError::Bind { addr, source }));
            return;
        }
    };
    let local_addr = match listener.local_addr() {
        Ok(local_addr) => local_addr,
        Err(source) => {
            let _ = ready_tx.send(Err(SinkError::Bind { addr, source }));
            return;
        }
    };
    let _ = ready_tx.send(Ok(local_addr));
    relay_info!(
        "Image sink listening on {} storing into {:?}",
        local_addr,
        settings.storage_dir
    );

    let app = router(settings.storage_dir, settings.max_upload_bytes);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;
    if let Err(err) = result {
        relay_error!("Image sink on {} stopped: {}", local_addr, err);
    }
}

/// `POST /add/image/{name}` stores the body; any other method gets `400`.
pub fn router(storage_dir: PathBuf, max_upload_bytes: usize) -> Router {
    let writer = Arc::new(AtomicFileWriter::new(storage_dir));
    Router::new()
        .route(
            &format!("{SINK_ROUTE_PREFIX}/{{name}}"),
            post(add_image).fallback(reject_method),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(writer)
}

async fn add_image(
    State(writer): State<Arc<AtomicFileWriter>>,
    Path(name): Path<String>,
    body: Bytes,
) -> StatusCode {
    if !is_plain_file_name(&name) {
        relay_error!("Rejected image name {:?}", name);
        return StatusCode::BAD_REQUEST;
    }

    let stored = tokio::task::spawn_blocking(move || writer.write(&name, &body)).await;
    match stored {
        Ok(Ok(path)) => {
            relay_debug!("Received image {:?}", path);
            StatusCode::OK
        }
        Ok(Err(err)) => {
            relay_error!("Error: {}. Skipping file storage.", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Err(err) => {
            relay_error!("Error: {}. Skipping file storage.", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn reject_method() -> StatusCode {
    StatusCode::BAD_REQUEST
}
