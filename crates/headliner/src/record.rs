// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Upstream identifiers and records, and the display form of qualifying records.

use std::fmt;
use std::ops::Deref;

use http::Uri;
use serde::{Deserialize, Serialize};

/// The record type tag that qualifies a record for display.
const STORY_KIND: &str = "story";

/// Opaque identifier of an upstream record.
///
/// Identifiers carry no ordering of their own; their rank is the position at
/// which they appear in the fetched ID list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub u64);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for RemoteId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A resolved upstream record.
///
/// Upstream records can be stories, comments, jobs and more. At most one of
/// [`url`](Self::url) and [`text`](Self::text) is expected to be set; this is
/// an upstream convention and is not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Identifier of the record.
    pub id: RemoteId,
    /// Author name.
    pub by: Option<String>,
    /// Total comment count.
    pub descendants: Option<u64>,
    /// Identifiers of direct children, in ranked display order.
    pub kids: Vec<RemoteId>,
    /// Score or votes.
    pub score: Option<i64>,
    /// Creation time in unix seconds.
    pub time: Option<i64>,
    /// Title text.
    pub title: Option<String>,
    /// Type tag, for example `"story"`, `"comment"` or `"job"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free text body.
    pub text: Option<String>,
    /// Link target.
    pub url: Option<String>,
}

impl Record {
    /// Returns `true` if this record is a story that carries a non-empty link.
    ///
    /// # Example
    ///
    /// ```
    /// use headliner::Record;
    ///
    /// let story = Record {
    ///     kind: "story".to_string(),
    ///     url: Some("https://example.com".to_string()),
    ///     ..Record::default()
    /// };
    /// assert!(story.qualifies());
    ///
    /// let ask = Record {
    ///     kind: "story".to_string(),
    ///     text: Some("Ask: anyone?".to_string()),
    ///     ..Record::default()
    /// };
    /// assert!(!ask.qualifies());
    /// ```
    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.kind == STORY_KIND && self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// A qualifying [`Record`] together with the host name derived from its link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    /// The record being displayed.
    #[serde(flatten)]
    pub record: Record,
    /// Host of the record link with any leading `www.` removed; empty if the
    /// link cannot be parsed.
    pub host: String,
}

impl DisplayItem {
    /// Builds the display form of a record.
    #[must_use]
    pub fn new(record: Record) -> Self {
        let host = record.url.as_deref().map(display_host).unwrap_or_default();
        Self { record, host }
    }
}

impl Deref for DisplayItem {
    type Target = Record;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl From<Record> for DisplayItem {
    fn from(record: Record) -> Self {
        Self::new(record)
    }
}

fn display_host(url: &str) -> String {
    url.parse::<Uri>()
        .ok()
        .and_then(|uri| uri.host().map(|host| host.strip_prefix("www.").unwrap_or(host).to_owned()))
        .unwrap_or_default()
}
