use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::fetch::{build_client, map_reqwest_error, FetchSettings};
use crate::{FailureKind, FetchError};

#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// POSTs `body` to `endpoint`. Anything but `200 OK` is an error.
    async fn publish(&self, endpoint: &str, body: Vec<u8>) -> Result<(), FetchError>;
}

/// Uploads images to collectors through one shared connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestPublisher {
    client: reqwest::Client,
}

impl ReqwestPublisher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(settings)?,
        })
    }
}

#[async_trait::async_trait]
impl Publisher for ReqwestPublisher {
    async fn publish(&self, endpoint: &str, body: Vec<u8>) -> Result<(), FetchError> {
        let parsed = reqwest::Url::parse(endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ))
        }
    }
}
