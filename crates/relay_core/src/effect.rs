use crate::{CycleSummary, FetchedImage, UrlSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadUrls,
    FetchAll(UrlSet),
    Distribute(Vec<FetchedImage>),
    ReportCycle(CycleSummary),
    /// Marks the end of a cycle. The driver waits the configured interval
    /// before it sends the next `Msg::CycleDue`.
    SleepInterval,
}
