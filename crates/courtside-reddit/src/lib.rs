//! Reddit access for courtside.
//!
//! Obtains a user-delegated OAuth token through a browser redirect handled by a
//! short-lived loopback listener, then walks community listings and comment
//! trees while honouring the API's rate-limit signals.

pub mod auth;
pub mod client;
pub mod comments;
pub mod error;
pub mod listing;
pub mod types;

mod helpers;
mod retry;

pub use auth::{AuthorizationCoordinator, CallbackListener, OAuthSettings};
pub use client::RedditClient;
pub use comments::{SubmissionComments, DEFAULT_COMMENT_LIMIT};
pub use error::{AuthorizationError, RedditError};
pub use listing::drain_submissions;
pub use retry::RateLimitPolicy;
pub use types::{
    AuthorizationSession, CommentRecord, PendingAuthorization, SearchRequest, SortOrder,
    SubmissionRecord, TimeFilter, TimeWindow,
};
