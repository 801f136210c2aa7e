//! Relay core: pure scheduler state machine, URL/server list parsing and naming rules.
mod effect;
mod msg;
mod naming;
mod progress;
mod report;
mod servers;
mod state;
mod update;
mod urls;

pub use effect::Effect;
pub use msg::Msg;
pub use naming::{candidate_name, disambiguate, truncate_for_log};
pub use progress::{render_progress_bar, DEFAULT_BAR_WIDTH};
pub use report::{CycleSummary, DistributionReport, FetchedImage};
pub use servers::{upload_endpoint, ConfigError, ServerSet, DEFAULT_SERVER};
pub use state::{CyclePhase, SchedulerState, Stage};
pub use update::update;
pub use urls::{parse_url_list, UrlSet};
