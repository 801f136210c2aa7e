use crate::{DistributionReport, FetchedImage, UrlSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The interval elapsed (or the process just started); begin a cycle.
    CycleDue,
    /// The URL list file was read. Load errors arrive as an empty set.
    UrlsLoaded(UrlSet),
    /// The fetch phase finished with these stored images.
    FetchCompleted(Vec<FetchedImage>),
    /// The distribution phase finished.
    DistributionCompleted(DistributionReport),
}
