//! Relay engine: downloads, uploads, on-disk naming, the image sink and the cycle driver.
mod fetch;
mod filename;
mod loader;
mod persist;
mod pipeline;
mod publish;
mod scheduler;
mod sink;
mod types;

pub use fetch::{FetchSettings, Fetcher, NoopProgressSink, ProgressSink, ReqwestFetcher};
pub use filename::resolve_name;
pub use loader::{load_url_set, LoadError};
pub use persist::{claim_and_write, ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{distribute, fetch_all};
pub use publish::{Publisher, ReqwestPublisher};
pub use scheduler::{Scheduler, SchedulerSettings};
pub use sink::{router, SinkError, SinkHandle, SinkService, SinkSettings, SINK_ROUTE_PREFIX};
pub use types::{EngineEvent, FailureKind, FetchError, FetchReport, Phase, PhaseProgress};
