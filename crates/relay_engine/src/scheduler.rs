use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use relay_core::{update, CycleSummary, Effect, Msg, SchedulerState, ServerSet, UrlSet};
use relay_logging::{relay_error, relay_info};
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchSettings, Fetcher, ProgressSink, ReqwestFetcher};
use crate::loader::load_url_set;
use crate::pipeline::{distribute, fetch_all};
use crate::publish::{Publisher, ReqwestPublisher};
use crate::FetchError;

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub urls_path: PathBuf,
    pub scraped_dir: PathBuf,
    pub servers: ServerSet,
    pub distribute: bool,
    pub interval: Duration,
    pub fetch: FetchSettings,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            urls_path: PathBuf::from("urls.txt"),
            scraped_dir: PathBuf::from("scraped_images"),
            servers: ServerSet::default(),
            distribute: true,
            interval: Duration::from_secs(5),
            fetch: FetchSettings::default(),
        }
    }
}

/// Drives [`relay_core::update`]: executes each effect and feeds the result back.
pub struct Scheduler {
    settings: SchedulerSettings,
    fetcher: Arc<dyn Fetcher>,
    publisher: Arc<dyn Publisher>,
    progress: Arc<dyn ProgressSink>,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(
        settings: SchedulerSettings,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(&settings.fetch)?);
        let publisher = Arc::new(ReqwestPublisher::new(&settings.fetch)?);
        Ok(Self::with_transport(settings, fetcher, publisher, progress))
    }

    pub fn with_transport(
        settings: SchedulerSettings,
        fetcher: Arc<dyn Fetcher>,
        publisher: Arc<dyn Publisher>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        if settings.distribute && settings.servers.is_empty() {
            relay_error!("Server list is empty!");
        }
        let state = SchedulerState::new(settings.distribute, settings.servers.len());
        Self {
            settings,
            fetcher,
            publisher,
            progress,
            state,
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Runs cycles until `cancel` fires, sleeping the configured interval in between.
    ///
    /// A running cycle is never interrupted; cancellation is observed between cycles.
    pub async fn run(&mut self, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            self.run_cycle().await;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
        relay_info!("Scheduler stopped after {} cycles", self.state.cycle());
    }

    /// Runs one load, fetch, distribute cycle and returns its summary.
    pub async fn run_cycle(&mut self) -> Option<CycleSummary> {
        let mut inbox = VecDeque::from([Msg::CycleDue]);
        let mut summary = None;

        while let Some(msg) = inbox.pop_front() {
            let (state, effects) = update(self.state.clone(), msg);
            self.state = state;
            for effect in effects {
                match effect {
                    Effect::LoadUrls => {
                        relay_info!("Start cycle {}", self.state.cycle());
                        inbox.push_back(Msg::UrlsLoaded(self.load_urls()));
                    }
                    Effect::FetchAll(urls) => {
                        let report = fetch_all(
                            self.fetcher.as_ref(),
                            &urls,
                            &self.settings.scraped_dir,
                            &self.settings.fetch,
                            self.progress.as_ref(),
                        )
                        .await;
                        inbox.push_back(Msg::FetchCompleted(report.images));
                    }
                    Effect::Distribute(images) => {
                        let report = distribute(
                            self.publisher.as_ref(),
                            &images,
                            &self.settings.servers,
                            &self.settings.fetch,
                            self.progress.as_ref(),
                        )
                        .await;
                        inbox.push_back(Msg::DistributionCompleted(report));
                    }
                    Effect::ReportCycle(finished) => {
                        log_summary(&finished);
                        summary = Some(finished);
                    }
                    // `run` waits the interval between cycles.
                    Effect::SleepInterval => {}
                }
            }
        }

        summary
    }

    fn load_urls(&self) -> UrlSet {
        match load_url_set(&self.settings.urls_path) {
            Ok(urls) => {
                if urls.is_empty() {
                    relay_error!("The list of urls is empty!");
                }
                urls
            }
            Err(err) => {
                relay_error!("{}. Aborting scraping", err);
                UrlSet::new()
            }
        }
    }
}

fn log_summary(summary: &CycleSummary) {
    match &summary.distribution {
        Some(report) => relay_info!(
            "Finished cycle {}: {} urls, {} fetched, {}/{} deliveries succeeded",
            summary.cycle,
            summary.url_count,
            summary.fetched,
            report.delivered,
            report.total
        ),
        None => relay_info!(
            "Finished cycle {}: {} urls, {} fetched, distribution skipped",
            summary.cycle,
            summary.url_count,
            summary.fetched
        ),
    }
}
