//! Avatar resolution as an ordered fallback chain.
//!
//! Each [`AvatarStrategy`] either produces a URL or passes (`None`). The
//! [`AvatarResolver`] tries its strategies in order and stops at the first
//! hit; when every strategy passes it returns its fixed placeholder URL, so
//! [`AvatarResolver::resolve`] cannot fail.
//!
//! Default chain:
//!
//! 1. [`GravatarStrategy`]: hash-based lookup, asked to 404 on a miss.
//!    A hit is returned as the `identicon` variant of the same URL.
//! 2. [`RandomUserStrategy`]: first result's `picture.large`.
//! 3. Placeholder.
//!
//! Network and decode errors never escape a strategy. All requests share
//! a `reqwest::Client` with a bounded timeout, so a stalled service delays a
//! create or update by at most one timeout per strategy.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::config::AvatarConfig;

/// One step of the avatar fallback chain.
#[async_trait]
pub trait AvatarStrategy: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Return an avatar URL for `email`, or `None` to let the next step try.
    async fn resolve(&self, email: &str) -> Option<String>;
}

/// Lowercase hex SHA-256 of the trimmed, lowercased address.
pub fn email_hash(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Hash-based lookup (`<base>/avatar/<hash>?d=404&s=<size>`).
pub struct GravatarStrategy {
    client: Client,
    base_url: String,
    size: u32,
}

impl GravatarStrategy {
    pub fn new(client: Client, base_url: &str, size: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            size,
        }
    }

    fn url_with_default(&self, email: &str, default: &str) -> String {
        format!(
            "{}/avatar/{}?d={}&s={}",
            self.base_url,
            email_hash(email),
            default,
            self.size
        )
    }

    /// URL that answers 404 when no image is registered for `email`.
    pub fn lookup_url(&self, email: &str) -> String {
        self.url_with_default(email, "404")
    }

    /// URL handed back to callers: never 404s, falls back to an identicon.
    pub fn display_url(&self, email: &str) -> String {
        self.url_with_default(email, "identicon")
    }
}

#[async_trait]
impl AvatarStrategy for GravatarStrategy {
    fn name(&self) -> &str {
        "gravatar"
    }

    async fn resolve(&self, email: &str) -> Option<String> {
        if email.trim().is_empty() {
            return None;
        }

        match self.client.get(self.lookup_url(email)).send().await {
            Ok(resp) if resp.status().is_success() => Some(self.display_url(email)),
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "gravatar lookup missed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "gravatar lookup failed");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct RandomUserResponse {
    #[serde(default)]
    results: Vec<RandomUserResult>,
}

#[derive(Deserialize)]
struct RandomUserResult {
    picture: Option<RandomUserPicture>,
}

#[derive(Deserialize)]
struct RandomUserPicture {
    large: Option<String>,
}

/// Random-avatar service (`<base>/api/?inc=picture`).
pub struct RandomUserStrategy {
    client: Client,
    base_url: String,
}

impl RandomUserStrategy {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self) -> Result<Option<String>> {
        let resp = self
            .client
            .get(format!("{}/api/?inc=picture", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let body: RandomUserResponse = resp.json().await?;

        Ok(body
            .results
            .into_iter()
            .next()
            .and_then(|r| r.picture)
            .and_then(|p| p.large)
            .filter(|url| !url.is_empty()))
    }
}

#[async_trait]
impl AvatarStrategy for RandomUserStrategy {
    fn name(&self) -> &str {
        "randomuser"
    }

    async fn resolve(&self, _email: &str) -> Option<String> {
        match self.fetch().await {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(error = %e, "random avatar request failed");
                None
            }
        }
    }
}

/// Ordered strategies plus an infallible placeholder.
pub struct AvatarResolver {
    strategies: Vec<Box<dyn AvatarStrategy>>,
    placeholder: String,
}

impl AvatarResolver {
    pub fn new(strategies: Vec<Box<dyn AvatarStrategy>>, placeholder: impl Into<String>) -> Self {
        Self {
            strategies,
            placeholder: placeholder.into(),
        }
    }

    /// A resolver that never touches the network.
    pub fn disabled(placeholder: impl Into<String>) -> Self {
        Self::new(Vec::new(), placeholder)
    }

    /// Build the default chain from configuration.
    pub fn from_config(config: &AvatarConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::disabled(config.placeholder_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::new(
            vec![
                Box::new(GravatarStrategy::new(
                    client.clone(),
                    &config.gravatar_url,
                    config.size,
                )),
                Box::new(RandomUserStrategy::new(client, &config.random_user_url)),
            ],
            config.placeholder_url.clone(),
        ))
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub async fn resolve(&self, email: &str) -> String {
        for strategy in &self.strategies {
            if let Some(url) = strategy.resolve(email).await {
                tracing::debug!(strategy = strategy.name(), "avatar resolved");
                return url;
            }
            tracing::debug!(strategy = strategy.name(), "avatar strategy passed");
        }
        self.placeholder.clone()
    }
}
