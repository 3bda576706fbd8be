use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

/// A user-delegated access token obtained by the OAuth handshake.
///
/// Lives for one run only and is never written to disk.
#[derive(Clone)]
pub struct AuthorizationSession {
    access_token: String,
    refresh_token: Option<String>,
    /// When the access token stops being accepted. `None` if the provider
    /// did not say.
    pub expires_at: Option<DateTime<Utc>>,
    /// Capabilities the provider actually granted.
    pub scopes: BTreeSet<String>,
}

impl AuthorizationSession {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        scopes: BTreeSet<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at,
            scopes,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl std::fmt::Debug for AuthorizationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationSession")
            .field("access_token", &"[redacted]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Handshake state between issuing the authorization URL and receiving the
/// callback.
#[derive(Debug)]
pub struct PendingAuthorization {
    state: String,
    result_code: Option<String>,
}

impl PendingAuthorization {
    pub(crate) fn new(state: String) -> Self {
        Self {
            state,
            result_code: None,
        }
    }

    /// The nonce embedded in the authorization URL.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    #[must_use]
    pub fn result_code(&self) -> Option<&str> {
        self.result_code.as_deref()
    }

    /// Stores the code delivered by the callback. Only the first write sticks.
    pub(crate) fn record_code(&mut self, code: String) -> bool {
        if self.result_code.is_some() {
            return false;
        }
        self.result_code = Some(code);
        true
    }

    pub(crate) fn into_code(self) -> Option<String> {
        self.result_code
    }
}

/// A post fetched from a community listing or search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub num_comments: u64,
    pub permalink: String,
}

impl SubmissionRecord {
    /// Reddit "fullname" (`t3_` + id), used as `link_id` by the API.
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }
}

/// A single comment, flattened out of its reply tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: String,
    pub body: String,
    /// Fullname of the parent: `t3_...` for top-level comments, `t1_...` for replies.
    pub parent_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::Hot => "hot",
            SortOrder::Top => "top",
            SortOrder::New => "new",
            SortOrder::Comments => "comments",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortOrder::Relevance),
            "hot" => Ok(SortOrder::Hot),
            "top" => Ok(SortOrder::Top),
            "new" => Ok(SortOrder::New),
            "comments" => Ok(SortOrder::Comments),
            other => Err(format!(
                "unknown sort order '{other}' (expected relevance, hot, top, new or comments)"
            )),
        }
    }
}

/// Provider-side coarse time filter (`t=` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            other => Err(format!(
                "unknown time filter '{other}' (expected hour, day, week, month, year or all)"
            )),
        }
    }
}

/// Half-open window `(start, end]` over post creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The `days` days leading up to `now`.
    ///
    /// Negative `days` give an empty window ending at `now`; spans reaching
    /// past the earliest representable time start there instead.
    #[must_use]
    pub fn last_days(days: i64, now: DateTime<Utc>) -> Self {
        let start = Duration::try_days(days.max(0))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at > self.start && at <= self.end
    }
}

/// Parameters for [`crate::RedditClient::search_posts`].
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// A post matches when its title contains any of these as whole words.
    pub keywords: Vec<String>,
    pub window: TimeWindow,
    pub sort: SortOrder,
    pub time_filter: TimeFilter,
    /// Cap on raw listing items consumed. `None` pages until the provider
    /// stops returning a cursor.
    pub max_results: Option<usize>,
}
