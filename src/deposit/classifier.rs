//! Classifier backend client: camera feed URL, `/predict`, `/deposit`.

use async_trait::async_trait;
use reqwest::Client;

use crate::core::model::{DepositRequest, DepositResponse, Prediction};
use crate::core::paths::{backend as paths, join};
use crate::error::{EcoError, EcoResult};

/// The externally owned material-classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Latest detection.
    async fn predict(&self) -> EcoResult<Prediction>;
    /// Charge one deposit to a wallet.
    async fn deposit(&self, request: &DepositRequest) -> EcoResult<DepositResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    /// MJPEG stream consumed directly by the camera view.
    pub fn video_feed_url(&self) -> String { join(&self.base_url, paths::VIDEO_FEED) }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self) -> EcoResult<Prediction> {
        let response = self.client.get(join(&self.base_url, paths::PREDICT)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EcoError::api(status.as_u16(), response.text().await.unwrap_or_default()));
        }
        Ok(response.json().await?)
    }

    async fn deposit(&self, request: &DepositRequest) -> EcoResult<DepositResponse> {
        let response = self
            .client
            .post(join(&self.base_url, paths::DEPOSIT))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EcoError::api(status.as_u16(), response.text().await.unwrap_or_default()));
        }
        Ok(response.json().await?)
    }
}
