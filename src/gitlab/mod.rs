pub mod client;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{DailyRecapError, Result};

lazy_static! {
    /// Merge commits produced by GitLab merge requests, matched against the
    /// first line of the raw commit message.
    static ref MERGE_MESSAGE_RE: Regex =
        Regex::new(r"^Merge branch '.+' into '.+'").expect("valid merge-message regex");
}

/// A commit attributed to the configured author, tagged with its project
#[derive(Debug, Clone)]
pub struct Commit {
    /// Project id the commit was fetched from
    pub project_id: String,
    /// Human-readable project name (placeholder when lookup failed)
    pub project_name: String,
    /// First line of the commit message
    pub title: String,
    /// Full commit message
    pub message: String,
    /// Author timestamp as reported by GitLab
    pub created_at: DateTime<FixedOffset>,
    /// Short commit hash
    pub short_id: String,
    /// Web URL of the commit
    pub url: String,
}

/// Canonical identity of the configured account, resolved via `GET /user`.
///
/// Email and name are lowercased at construction. Both are `None` when the
/// lookup failed, in which case attribution degrades to username-substring
/// matching only.
#[derive(Debug, Clone)]
pub struct AuthorIdentity {
    pub email: Option<String>,
    pub name: Option<String>,
    /// Configured username, always present
    pub username: String,
}

impl AuthorIdentity {
    /// Build an identity from raw API fields, lowercasing both
    pub fn new(email: Option<String>, name: Option<String>, username: &str) -> Self {
        Self {
            email: email.map(|e| e.to_lowercase()),
            name: name.map(|n| n.to_lowercase()),
            username: username.to_string(),
        }
    }

    /// Identity with no resolved email/name, username matching only
    pub fn unresolved(username: &str) -> Self {
        Self::new(None, None, username)
    }

    /// Whether a raw commit belongs to this author.
    ///
    /// Matches on exact email, exact display name, or the configured username
    /// appearing as a case-insensitive substring of the author name.
    pub fn matches(&self, author_email: &str, author_name: &str) -> bool {
        let commit_email = author_email.to_lowercase();
        let commit_name = author_name.to_lowercase();

        let email_match = self.email.as_deref() == Some(commit_email.as_str());
        let name_match = self.name.as_deref() == Some(commit_name.as_str());
        let username_match = commit_name.contains(&self.username.to_lowercase());

        email_match || name_match || username_match
    }
}

/// Whether the raw commit message starts with a GitLab merge-request line
pub fn is_merge_message(message: &str) -> bool {
    MERGE_MESSAGE_RE.is_match(message)
}

/// Start and end of the given date in local time, serialized to RFC 3339.
///
/// The window covers 00:00:00.000 through 23:59:59.999.
pub fn day_window(date: NaiveDate) -> Result<(String, String)> {
    let start = date
        .and_hms_milli_opt(0, 0, 0, 0)
        .and_then(|ndt| Local.from_local_datetime(&ndt).earliest());
    let end = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .and_then(|ndt| Local.from_local_datetime(&ndt).latest());

    match (start, end) {
        (Some(since), Some(until)) => Ok((since.to_rfc3339(), until.to_rfc3339())),
        _ => Err(DailyRecapError::InvalidDate(date.to_string())),
    }
}

/// Raw commit record as returned by the GitLab commits endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
    pub short_id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    pub web_url: String,
}
