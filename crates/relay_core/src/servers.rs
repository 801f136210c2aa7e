use thiserror::Error;
use url::Url;

/// Collector endpoint used when no server list is configured.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000/add/image";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("server list is empty")]
    EmptyServerList,
    #[error("invalid server url '{entry}': {reason}")]
    InvalidServer { entry: String, reason: String },
}

/// Base URLs of the collectors every fetched image is pushed to.
///
/// Entries are unique, absolute `http`/`https` URLs without a trailing slash.
/// Insertion order is kept so logs follow the order given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSet {
    servers: Vec<String>,
}

impl ServerSet {
    /// An empty set. Distribution is skipped when this is all there is.
    pub fn empty() -> Self {
        Self {
            servers: Vec::new(),
        }
    }

    /// Parses a comma-separated list of collector base URLs.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        Self::from_urls(list.split(','))
    }

    pub fn from_urls<I, S>(urls: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut servers: Vec<String> = Vec::new();
        for entry in urls {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let normalized = normalize_server(entry)?;
            if !servers.contains(&normalized) {
                servers.push(normalized);
            }
        }
        if servers.is_empty() {
            return Err(ConfigError::EmptyServerList);
        }
        Ok(Self { servers })
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.servers.iter().map(String::as_str)
    }
}

impl Default for ServerSet {
    fn default() -> Self {
        Self {
            servers: vec![DEFAULT_SERVER.to_string()],
        }
    }
}

/// Destination for one upload: `{server}/{file_name}`, with the name percent-encoded.
pub fn upload_endpoint(server: &str, file_name: &str) -> String {
    format!("{}/{}", server, urlencoding::encode(file_name))
}

fn normalize_server(entry: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidServer {
        entry: entry.to_string(),
        reason,
    };
    let parsed = Url::parse(entry).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(entry.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::{upload_endpoint, ConfigError, ServerSet, DEFAULT_SERVER};

    #[test]
    fn parses_trims_and_dedupes() {
        let set = ServerSet::parse(" http://a:5000/add/image/ ,http://b/add/image,,http://a:5000/add/image")
            .unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["http://a:5000/add/image", "http://b/add/image"]
        );
    }

    #[test]
    fn rejects_non_http_entries() {
        let err = ServerSet::parse("http://ok/add/image,ftp://nope").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServer { ref entry, .. } if entry == "ftp://nope"));
        assert!(ServerSet::parse("not a url").is_err());
    }

    #[test]
    fn blank_list_is_an_error() {
        assert_eq!(ServerSet::parse(" , "), Err(ConfigError::EmptyServerList));
    }

    #[test]
    fn default_points_at_local_sink() {
        assert_eq!(ServerSet::default().iter().collect::<Vec<_>>(), vec![DEFAULT_SERVER]);
    }

    #[test]
    fn endpoint_encodes_file_name() {
        assert_eq!(
            upload_endpoint("http://h/add/image", "a b.png"),
            "http://h/add/image/a%20b.png"
        );
    }
}
