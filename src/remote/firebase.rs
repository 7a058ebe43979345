//! Remote dataset stored in a Firebase Realtime Database, accessed through
//! its REST interface.
use crate::core::config::RemoteConfig;
use crate::core::store::{RemoteDocument, RemoteStore};
use crate::remote::util::with_retry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

pub struct FirebaseRemote {
    client: reqwest::Client,
    base_url: String,
    uid: String,
    auth_token: Option<String>,
}

impl FirebaseRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("ivt/0.1").build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            uid: config.uid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// `{base_url}/users/{uid}.json`, with the auth token when configured.
    fn document_url(&self) -> String {
        let url = format!("{}/users/{}.json", self.base_url, self.uid);
        match &self.auth_token {
            Some(token) => format!("{url}?auth={token}"),
            None => url,
        }
    }
}

#[async_trait]
impl RemoteStore for FirebaseRemote {
    async fn fetch(&self) -> Result<Option<RemoteDocument>> {
        let url = self.document_url();
        debug!("Fetching remote dataset for {}", self.uid);

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .with_context(|| format!("Failed to fetch remote dataset for user: {}", self.uid))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to read remote dataset for user: {}", self.uid))?;

        // A missing path is returned as a JSON null.
        let doc: Option<RemoteDocument> = serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse remote dataset for user: {}", self.uid))?;
        debug!(
            "Remote dataset {}",
            if doc.is_some() { "found" } else { "missing" }
        );
        Ok(doc)
    }

    async fn push(&self, doc: &RemoteDocument) -> Result<()> {
        let url = self.document_url();
        with_retry(
            || async {
                self.client
                    .put(&url)
                    .json(doc)
                    .send()
                    .await?
                    .error_for_status()
            },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .with_context(|| format!("Failed to push remote dataset for user: {}", self.uid))?;
        debug!("Pushed remote dataset stamped {}", doc.last_sync);
        Ok(())
    }
}
