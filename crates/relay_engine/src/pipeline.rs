//! The two phases of a cycle: fetch every URL, then push every image to every server.
//!
//! Each phase polls its requests as one bounded `buffer_unordered` stream on
//! the calling task. Requests return outcome values and only the consumer loop
//! touches the counters and the result list.

use std::path::Path;

use futures_util::stream::{self, StreamExt};
use relay_core::{
    truncate_for_log, upload_endpoint, DistributionReport, FetchedImage, ServerSet, UrlSet,
};
use relay_logging::{relay_debug, relay_error, relay_info, relay_warn};

use crate::fetch::{FetchSettings, Fetcher, ProgressSink};
use crate::persist::{claim_and_write, ensure_output_dir};
use crate::publish::Publisher;
use crate::{EngineEvent, FailureKind, FetchError, FetchReport, Phase, PhaseProgress};

const LOG_URL_CHARS: usize = 50;
const LOG_ERROR_CHARS: usize = 100;

/// Downloads every URL into `target_dir`.
///
/// Failures are logged and counted per URL; they never stop the phase.
pub async fn fetch_all(
    fetcher: &dyn Fetcher,
    urls: &UrlSet,
    target_dir: &Path,
    settings: &FetchSettings,
    sink: &dyn ProgressSink,
) -> FetchReport {
    let mut report = FetchReport::new(urls.len());
    if urls.is_empty() {
        relay_error!("The list of urls is empty!");
        return report;
    }
    if let Err(err) = ensure_output_dir(target_dir) {
        relay_error!("Error creating target directory {:?}: {}", target_dir, err);
        return report;
    }

    relay_info!("Start image scraping...");
    sink.emit(EngineEvent::PhaseStarted {
        phase: Phase::Fetch,
        total: urls.len(),
    });

    let mut outcomes = stream::iter(urls.iter())
        .map(|url| fetch_one(fetcher, url, target_dir))
        .buffer_unordered(settings.max_in_flight.max(1));

    while let Some(outcome) = outcomes.next().await {
        match outcome {
            Ok(image) => {
                relay_debug!("Stored {:?}", image.path());
                report.images.push(image);
                sink.emit(EngineEvent::Progress(PhaseProgress {
                    phase: Phase::Fetch,
                    done: report.images.len(),
                    total: report.total_urls,
                }));
            }
            Err((url, err)) if err.kind.is_network() => {
                relay_error!(
                    "Error fetching url '{}': '{}'... Skipping this url.",
                    truncate_for_log(url, LOG_URL_CHARS),
                    truncate_for_log(&err.to_string(), LOG_ERROR_CHARS)
                );
                report.network_failures += 1;
                report.total_urls = report.total_urls.saturating_sub(1);
            }
            Err((url, err)) if err.kind == FailureKind::Storage => {
                relay_error!(
                    "Error storing fetched file from url {}: {}. Skipping this url.",
                    url,
                    err.message
                );
                report.storage_failures += 1;
            }
            Err((url, err)) => {
                relay_warn!("Can't fetch image {}: {}", url, err);
                report.http_failures += 1;
            }
        }
    }

    sink.emit(EngineEvent::PhaseFinished { phase: Phase::Fetch });
    relay_info!(
        "Finished scraping: {} stored, {} network errors, {} http errors, {} storage errors",
        report.images.len(),
        report.network_failures,
        report.http_failures,
        report.storage_failures
    );
    report
}

async fn fetch_one<'a>(
    fetcher: &dyn Fetcher,
    url: &'a str,
    target_dir: &Path,
) -> Result<FetchedImage, (&'a str, FetchError)> {
    let body = fetcher.fetch(url).await.map_err(|err| (url, err))?;

    let dir = target_dir.to_path_buf();
    let owned_url = url.to_string();
    let written = tokio::task::spawn_blocking(move || claim_and_write(&dir, &owned_url, &body))
        .await
        .map_err(|err| (url, FetchError::new(FailureKind::Storage, err.to_string())))?;

    written
        .map(FetchedImage::new)
        .map_err(|err| (url, FetchError::new(FailureKind::Storage, err.to_string())))
}

/// Pushes every image to every server: `servers.len() * images.len()` attempts.
///
/// Every attempt advances the progress counter, failed or not.
pub async fn distribute(
    publisher: &dyn Publisher,
    images: &[FetchedImage],
    servers: &ServerSet,
    settings: &FetchSettings,
    sink: &dyn ProgressSink,
) -> DistributionReport {
    if servers.is_empty() {
        relay_error!("Server list is empty!");
        return DistributionReport::default();
    }
    if images.is_empty() {
        relay_info!("No images to serve!");
        return DistributionReport::default();
    }

    let mut report = DistributionReport {
        total: servers.len() * images.len(),
        ..DistributionReport::default()
    };

    relay_info!("Started image serving...");
    sink.emit(EngineEvent::PhaseStarted {
        phase: Phase::Distribution,
        total: report.total,
    });

    let pairs = servers
        .iter()
        .flat_map(move |server| images.iter().map(move |image| (server, image)));
    let mut outcomes = stream::iter(pairs)
        .map(|(server, image)| serve_one(publisher, server, image))
        .buffer_unordered(settings.max_in_flight.max(1));

    while let Some(delivered) = outcomes.next().await {
        report.attempted += 1;
        if delivered {
            report.delivered += 1;
        } else {
            report.failed += 1;
        }
        sink.emit(EngineEvent::Progress(PhaseProgress {
            phase: Phase::Distribution,
            done: report.attempted,
            total: report.total,
        }));
    }

    sink.emit(EngineEvent::PhaseFinished {
        phase: Phase::Distribution,
    });
    relay_info!(
        "Finished image serving: {}/{} delivered",
        report.delivered,
        report.total
    );
    report
}

async fn serve_one(publisher: &dyn Publisher, server: &str, image: &FetchedImage) -> bool {
    let path = image.path();
    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(err) => {
            relay_error!(
                "Error serving {:?} to url '{}': {}. Skipping this serve.",
                path,
                server,
                err
            );
            return false;
        }
    };
    let Some(file_name) = image.file_name() else {
        relay_error!("Error serving {:?} to url '{}': no file name", path, server);
        return false;
    };

    let endpoint = upload_endpoint(server, file_name);
    match publisher.publish(&endpoint, body).await {
        Ok(()) => true,
        Err(err) if err.kind.is_network() => {
            relay_error!("Error sending {:?} to {}: {}", path, endpoint, err);
            false
        }
        Err(err) => {
            relay_error!("Error posting {:?} to {}: {}", path, endpoint, err);
            false
        }
    }
}
