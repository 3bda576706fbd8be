//! Lazy, paginated submission listings.
//!
//! Both [`RedditClient::list_recent`] and [`RedditClient::search_posts`] return
//! a forward-only stream that requests the next page only once the current one
//! has been consumed. Re-invoking either issues a fresh query.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde::Deserialize;

use crate::client::RedditClient;
use crate::error::RedditError;
use crate::helpers::{build_match_terms, build_title_query, mentions_any};
use crate::types::{SearchRequest, SortOrder, SubmissionRecord};

/// Largest page the listing endpoints will serve.
const PAGE_LIMIT: usize = 100;

/// Reddit listing envelope: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub(crate) data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub(crate) children: Vec<Thing>,
    pub(crate) after: Option<String>,
}

/// One listing child; `data` is decoded according to `kind`.
#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub(crate) kind: String,
    pub(crate) data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    title: String,
    created_utc: f64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    permalink: String,
}

/// Converts a `t3` child into a [`SubmissionRecord`]. Other kinds, and posts
/// missing required fields, yield `None`.
fn parse_submission(thing: Thing) -> Option<SubmissionRecord> {
    if thing.kind != "t3" {
        return None;
    }
    let post: PostData = match serde_json::from_value(thing.data) {
        Ok(post) => post,
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed listing child");
            return None;
        }
    };
    if !post.created_utc.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let created_at = DateTime::<Utc>::from_timestamp(post.created_utc.trunc() as i64, 0)?;
    Some(SubmissionRecord {
        id: post.id,
        title: post.title,
        created_at,
        num_comments: post.num_comments,
        permalink: post.permalink,
    })
}

struct PageCursor<'a> {
    client: &'a RedditClient,
    path: String,
    params: Vec<(&'static str, String)>,
    after: Option<String>,
    buffer: VecDeque<SubmissionRecord>,
    consumed: usize,
    max_results: Option<usize>,
    exhausted: bool,
}

impl PageCursor<'_> {
    fn remaining(&self) -> Option<usize> {
        self.max_results.map(|max| max.saturating_sub(self.consumed))
    }

    async fn fetch_next_page(&mut self) -> Result<(), RedditError> {
        let page_limit = self.remaining().map_or(PAGE_LIMIT, |r| r.min(PAGE_LIMIT));
        let page_limit_str = page_limit.to_string();
        let mut params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        params.push(("limit", page_limit_str.as_str()));
        if let Some(after) = &self.after {
            params.push(("after", after.as_str()));
        }

        let url = self.client.endpoint(&self.path, &params)?;
        let body = self.client.get_json(&url).await?;
        let listing: Listing =
            serde_json::from_value(body).map_err(|e| RedditError::Deserialize {
                context: self.path.clone(),
                source: e,
            })?;

        let mut children = listing.data.children;
        if let Some(remaining) = self.remaining() {
            children.truncate(remaining);
        }
        let fetched = children.len();
        self.consumed += fetched;
        self.buffer
            .extend(children.into_iter().filter_map(parse_submission));

        tracing::debug!(
            path = %self.path,
            fetched,
            consumed = self.consumed,
            has_more = listing.data.after.is_some(),
            "fetched listing page"
        );

        self.after = listing.data.after;
        if fetched == 0 || self.after.is_none() || self.remaining() == Some(0) {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl RedditClient {
    fn paginate(
        &self,
        path: String,
        params: Vec<(&'static str, String)>,
        max_results: Option<usize>,
    ) -> impl Stream<Item = Result<SubmissionRecord, RedditError>> + '_ {
        let cursor = PageCursor {
            client: self,
            path,
            params,
            after: None,
            buffer: VecDeque::new(),
            consumed: 0,
            max_results,
            exhausted: max_results == Some(0),
        };

        stream::try_unfold(cursor, |mut cursor| async move {
            loop {
                if let Some(record) = cursor.buffer.pop_front() {
                    return Ok(Some((record, cursor)));
                }
                if cursor.exhausted {
                    return Ok(None);
                }
                cursor.fetch_next_page().await?;
            }
        })
    }

    /// Newest posts in `community`, up to `max_results` listing items.
    pub fn list_recent(
        &self,
        community: &str,
        max_results: Option<usize>,
    ) -> impl Stream<Item = Result<SubmissionRecord, RedditError>> + '_ {
        self.paginate(format!("r/{community}/new"), Vec::new(), max_results)
    }

    /// Posts in `community` whose title mentions any of the request's
    /// keywords and whose creation time falls inside the request window.
    ///
    /// The provider query is `title:A OR title:B`; titles are re-checked
    /// locally with a whole-word match. With [`SortOrder::New`] the stream
    /// ends at the first post older than the window.
    pub fn search_posts(
        &self,
        community: &str,
        request: &SearchRequest,
    ) -> impl Stream<Item = Result<SubmissionRecord, RedditError>> + '_ {
        let query = build_title_query(&request.keywords);
        let terms = build_match_terms(&request.keywords);
        if query.is_empty() || terms.is_empty() {
            return stream::once(future::ready(Err(RedditError::InvalidRequest(
                "search requires at least one non-blank keyword".to_string(),
            ))))
            .left_stream();
        }

        let params = vec![
            ("q", query),
            ("restrict_sr", "on".to_string()),
            ("sort", request.sort.as_str().to_string()),
            ("t", request.time_filter.as_str().to_string()),
            ("type", "link".to_string()),
        ];
        let window = request.window;
        let newest_first = request.sort == SortOrder::New;

        self.paginate(format!("r/{community}/search"), params, request.max_results)
            .try_take_while(move |post| {
                future::ready(Ok(!newest_first || post.created_at > window.start))
            })
            .try_filter(move |post| {
                future::ready(window.contains(post.created_at) && mentions_any(&post.title, &terms))
            })
            .right_stream()
    }
}

/// Consumes a submission stream into a `Vec`.
///
/// A non-fatal error ends the stream early with a warning and keeps what was
/// already gathered; fatal errors (see [`RedditError::is_fatal`]) propagate.
///
/// # Errors
///
/// Returns the first fatal [`RedditError`] the stream yields.
pub async fn drain_submissions<S>(stream: S) -> Result<Vec<SubmissionRecord>, RedditError>
where
    S: Stream<Item = Result<SubmissionRecord, RedditError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut submissions = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(submission) => submissions.push(submission),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    gathered = submissions.len(),
                    error = %e,
                    "submission listing failed, continuing with what was gathered"
                );
                break;
            }
        }
    }
    Ok(submissions)
}
