//! Comment-tree retrieval.
//!
//! A submission's comments arrive as a nested reply tree sprinkled with
//! "load more" markers. [`RedditClient::fetch_comments`] walks that tree
//! breadth-first, expanding markers through `/api/morechildren` in place, until
//! `limit` comments have been gathered or the tree is exhausted.

use std::collections::{HashMap, VecDeque};

use serde::Deserialize;

use crate::client::RedditClient;
use crate::error::RedditError;
use crate::listing::{Listing, Thing};
use crate::types::{CommentRecord, SubmissionRecord};

/// Comments gathered per submission unless the caller says otherwise.
pub const DEFAULT_COMMENT_LIMIT: usize = 100;

/// `/api/morechildren` accepts at most this many ids per call.
const MORE_CHILDREN_BATCH: usize = 100;

/// Comments gathered for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionComments {
    pub submission_id: String,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    id: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    parent_id: String,
    /// Either `""` (no replies) or a nested listing.
    #[serde(default)]
    replies: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct MoreMarker {
    #[serde(default)]
    id: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    count: u64,
}

#[derive(Debug)]
enum TreeNode {
    Comment {
        record: CommentRecord,
        replies: Vec<TreeNode>,
    },
    More(MoreMarker),
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

fn build_node(thing: Thing) -> Option<TreeNode> {
    match thing.kind.as_str() {
        "t1" => {
            let data: CommentData = match serde_json::from_value(thing.data) {
                Ok(data) => data,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed comment");
                    return None;
                }
            };
            let replies = match data.replies {
                serde_json::Value::Object(_) => serde_json::from_value::<Listing>(data.replies)
                    .map(|listing| build_nodes(listing.data.children))
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            Some(TreeNode::Comment {
                record: CommentRecord {
                    id: data.id,
                    body: data.body,
                    parent_id: data.parent_id,
                },
                replies,
            })
        }
        "more" => serde_json::from_value(thing.data).ok().map(TreeNode::More),
        _ => None,
    }
}

fn build_nodes(children: Vec<Thing>) -> Vec<TreeNode> {
    children.into_iter().filter_map(build_node).collect()
}

fn node_parent(node: &TreeNode) -> &str {
    match node {
        TreeNode::Comment { record, .. } => &record.parent_id,
        TreeNode::More(marker) => &marker.parent_id,
    }
}

/// Rebuilds the flat, depth-first `things` list returned by `/api/morechildren`
/// into subtrees rooted at `parent_id` (the marker's own parent).
///
/// Nodes whose parent is not in the batch are kept as extra roots.
fn rebuild_subtrees(things: Vec<Thing>, parent_id: &str) -> Vec<TreeNode> {
    let mut pending: HashMap<String, Vec<TreeNode>> = HashMap::new();
    let mut roots = Vec::new();

    // Walking backwards means every child is built before its parent.
    for thing in things.into_iter().rev() {
        let Some(mut node) = build_node(thing) else {
            continue;
        };
        if let TreeNode::Comment { record, replies } = &mut node {
            if let Some(mut children) = pending.remove(&format!("t1_{}", record.id)) {
                children.reverse();
                replies.extend(children);
            }
        }
        if node_parent(&node) == parent_id {
            roots.push(node);
        } else {
            pending
                .entry(node_parent(&node).to_string())
                .or_default()
                .push(node);
        }
    }

    roots.reverse();
    let mut orphans: Vec<(String, Vec<TreeNode>)> = pending.into_iter().collect();
    orphans.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, mut nodes) in orphans {
        nodes.reverse();
        roots.extend(nodes);
    }
    roots
}

impl RedditClient {
    /// Fetches up to `limit` comments of `submission`, flattened breadth-first.
    ///
    /// "Load more" markers are expanded while fewer than `limit` comments have
    /// been gathered. If an expansion fails with a non-fatal error the comments
    /// gathered so far are returned.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError`] if the initial comment page cannot be fetched or
    /// parsed, or a fatal error occurs during expansion.
    pub async fn fetch_comments(
        &self,
        submission: &SubmissionRecord,
        limit: usize,
    ) -> Result<Vec<CommentRecord>, RedditError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit_str = limit.to_string();
        let url = self.endpoint(
            &format!("comments/{}", submission.id),
            &[("limit", limit_str.as_str())],
        )?;
        let body = self.get_json(&url).await?;
        let context = format!("comments/{}", submission.id);
        let listings: Vec<Listing> =
            serde_json::from_value(body).map_err(|e| RedditError::Deserialize {
                context: context.clone(),
                source: e,
            })?;
        let Some(comment_listing) = listings.into_iter().nth(1) else {
            return Err(RedditError::InvalidRequest(format!(
                "{context}: response carried no comment listing"
            )));
        };

        let mut queue: VecDeque<TreeNode> = build_nodes(comment_listing.data.children).into();
        let mut comments = Vec::with_capacity(limit.min(submission_capacity(submission)));

        while comments.len() < limit {
            let Some(node) = queue.pop_front() else {
                break;
            };
            match node {
                TreeNode::Comment { record, replies } => {
                    comments.push(record);
                    queue.extend(replies);
                }
                TreeNode::More(marker) if marker.children.is_empty() => {
                    // "continue this thread" link; nothing to expand inline.
                }
                TreeNode::More(marker) => match self.expand_more(submission, &marker).await {
                    Ok(subtrees) => {
                        for node in subtrees.into_iter().rev() {
                            queue.push_front(node);
                        }
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            submission = %submission.id,
                            marker = %marker.id,
                            gathered = comments.len(),
                            error = %e,
                            "load-more expansion failed, keeping comments gathered so far"
                        );
                        break;
                    }
                },
            }
        }

        tracing::debug!(
            submission = %submission.id,
            comments = comments.len(),
            limit,
            "fetched comments"
        );
        Ok(comments)
    }

    async fn expand_more(
        &self,
        submission: &SubmissionRecord,
        marker: &MoreMarker,
    ) -> Result<Vec<TreeNode>, RedditError> {
        let link_id = submission.fullname();
        let mut things = Vec::new();

        for batch in marker.children.chunks(MORE_CHILDREN_BATCH) {
            let children = batch.join(",");
            let url = self.endpoint(
                "api/morechildren",
                &[
                    ("api_type", "json"),
                    ("link_id", link_id.as_str()),
                    ("children", children.as_str()),
                ],
            )?;
            let body = self.get_json(&url).await?;
            let response: MoreChildrenResponse =
                serde_json::from_value(body).map_err(|e| RedditError::Deserialize {
                    context: format!("api/morechildren(link_id={link_id})"),
                    source: e,
                })?;
            if !response.json.errors.is_empty() {
                return Err(RedditError::InvalidRequest(format!(
                    "api/morechildren(link_id={link_id}) returned errors: {:?}",
                    response.json.errors
                )));
            }
            if let Some(data) = response.json.data {
                things.extend(data.things);
            }
        }

        tracing::debug!(
            submission = %submission.id,
            marker = %marker.id,
            requested = marker.children.len(),
            advertised = marker.count,
            returned = things.len(),
            "expanded load-more marker"
        );
        Ok(rebuild_subtrees(things, &marker.parent_id))
    }

    /// Fetches comments for each submission in order, one at a time.
    ///
    /// A submission whose comments cannot be fetched contributes an empty list
    /// and collection moves on. Fatal errors stop the whole collection.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`RedditError`] (see [`RedditError::is_fatal`]).
    pub async fn collect_comments(
        &self,
        submissions: &[SubmissionRecord],
        limit: usize,
    ) -> Result<Vec<SubmissionComments>, RedditError> {
        let mut collected = Vec::with_capacity(submissions.len());
        for (index, submission) in submissions.iter().enumerate() {
            tracing::info!(
                submission = %submission.id,
                position = index + 1,
                total = submissions.len(),
                title = %submission.title,
                "processing post"
            );
            let comments = match self.fetch_comments(submission, limit).await {
                Ok(comments) => comments,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        submission = %submission.id,
                        error = %e,
                        "comment fetch failed, skipping submission"
                    );
                    Vec::new()
                }
            };
            collected.push(SubmissionComments {
                submission_id: submission.id.clone(),
                comments,
            });
        }
        Ok(collected)
    }
}

fn submission_capacity(submission: &SubmissionRecord) -> usize {
    usize::try_from(submission.num_comments).unwrap_or(usize::MAX)
}
