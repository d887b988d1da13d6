// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Hacker News API client for [`headliner`].
//!
//! [`HnClient`] implements [`Upstream`] on top of the public Hacker News
//! Firebase API: `GET {base}/topstories.json` for the ranked list and
//! `GET {base}/item/{id}.json` for each record. Every method performs exactly
//! one HTTP request; racing and retries are left to `headliner`.
//!
//! # Examples
//!
//! ```no_run
//! use anyspawn::Spawner;
//! use headliner::{Coordinator, Options};
//! use headliner_hn::HnClient;
//! use tick::Clock;
//!
//! # async fn example() -> headliner::CallResult<()> {
//! let client = HnClient::hacker_news()?;
//! let headlines = Coordinator::start(client, &Options::default(), Clock::new_tokio(), Spawner::new_tokio());
//!
//! for story in headlines.current().await?.iter() {
//!     println!("{:>5} {} ({})", story.score.unwrap_or_default(), story.title.as_deref().unwrap_or_default(), story.host);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use headliner::{CallResult, Error, Record, RemoteId, Upstream};
use serde::de::DeserializeOwned;

/// Root of the public Hacker News API.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An [`Upstream`] backed by the Hacker News HTTP API.
///
/// The client is cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HnClient {
    http: reqwest::Client,
    base_url: String,
}

impl HnClient {
    /// Creates a client for the public Hacker News API with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn hacker_news() -> CallResult<Self> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Creates a client for the API rooted at `base_url`.
    ///
    /// A trailing `/` on `base_url` is ignored. `timeout` bounds each request
    /// from connect to the end of the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CallResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build().map_err(Error::upstream)?;
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }

    /// Returns the API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> CallResult<T> {
        let response = self.http.get(url).send().await.map_err(Error::upstream)?;

        let status = response.status();
        tracing::trace!(url, status = status.as_u16(), "upstream responded");
        if !status.is_success() {
            return Err(Error::upstream(format!("GET {url} returned status {status}")));
        }

        let body = response.bytes().await.map_err(Error::upstream)?;
        decode(&body)
    }
}

impl Upstream for HnClient {
    async fn top_ids(&self) -> CallResult<Vec<RemoteId>> {
        self.get_json(&format!("{}/topstories.json", self.base_url)).await
    }

    async fn record(&self, id: RemoteId) -> CallResult<Record> {
        let record: Option<Record> = self.get_json(&format!("{}/item/{id}.json", self.base_url)).await?;

        // Unknown and deleted items come back as a literal `null`.
        record.ok_or_else(|| Error::upstream(format!("item {id} does not exist")))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> CallResult<T> {
    serde_json::from_slice(body).map_err(Error::upstream)
}

#[cfg(test)]
mod tests {
    use headliner::ErrorKind;

    use super::*;

    #[test]
    fn decodes_ranked_ids() {
        let ids: Vec<RemoteId> = decode(b"[9129911, 9129199, 9127761]").expect("ids should decode");

        assert_eq!(ids, vec![RemoteId(9_129_911), RemoteId(9_129_199), RemoteId(9_127_761)]);
    }

    #[test]
    fn decodes_job_without_link() {
        let body = br#"{"by":"justin","id":192327,"score":6,"text":"Justin.tv is looking for a Lead Flash Engineer!","time":1210981217,"title":"Justin.tv is looking for a Lead Flash Engineer!","type":"job"}"#;

        let record: Option<Record> = decode(body).expect("record should decode");
        let record = record.expect("record is present");

        assert_eq!(record.id, RemoteId(192_327));
        assert_eq!(record.kind, "job");
        assert!(!record.qualifies());
    }

    #[test]
    fn null_item_decodes_to_none() {
        let record: Option<Record> = decode(b"null").expect("null should decode");

        assert!(record.is_none());
    }

    #[test]
    fn malformed_body_is_an_upstream_error() {
        let error = decode::<Vec<RemoteId>>(b"<html>rate limited</html>").expect_err("body is not JSON");

        assert_eq!(error.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let client = HnClient::new("http://localhost:8080/v0/", DEFAULT_TIMEOUT).expect("client should build");

        assert_eq!(client.base_url(), "http://localhost:8080/v0");
    }
}
