use std::collections::BTreeSet;

/// Deduplicated set of image URLs read from the URL list file.
///
/// Never contains blank entries. Iteration order is stable but carries no
/// meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlSet {
    urls: BTreeSet<String>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL after trimming it. Returns `false` for blank or duplicate input.
    pub fn insert(&mut self, url: impl AsRef<str>) -> bool {
        let url = url.as_ref().trim();
        if url.is_empty() {
            return false;
        }
        self.urls.insert(url.to_owned())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for UrlSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = UrlSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

/// Parses a line-delimited URL list. Blank lines are ignored; there is no comment syntax.
pub fn parse_url_list(raw: &str) -> UrlSet {
    raw.lines().collect()
}
