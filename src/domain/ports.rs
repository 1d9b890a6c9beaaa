use crate::domain::model::{DiscussionPost, PublishedDiscussion, TrendItem};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Text-generation capability behind the pipeline.
#[async_trait]
pub trait TrendGenerator: Send + Sync {
    /// Request exactly `count` trend items as structured data. Empty or
    /// malformed output is an error; the caller decides whether to retry.
    async fn fetch_trends(&self, count: usize) -> Result<Vec<TrendItem>>;

    /// Ask for a single replacement URL for a dead link, constrained to the
    /// given domains. Returns the bare URL.
    async fn suggest_replacement(&self, topic: &str, allowed_domains: &[&str]) -> Result<String>;
}

/// Liveness probe for a URL: HEAD first, GET as fallback.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn is_alive(&self, url: &str) -> bool;
}

/// Discussion-publishing transport. Swappable so token/app auth variants and
/// future transports share one pipeline.
#[async_trait]
pub trait DiscussionBackend: Send + Sync {
    /// Resolve the opaque repository node id for `owner/repo`.
    async fn resolve_repository_id(&self, owner: &str, repo: &str) -> Result<String>;

    /// Resolve the category named `name`, failing if absent. Never creates one.
    async fn resolve_category_id(&self, owner: &str, repo: &str, name: &str) -> Result<String>;

    async fn create_discussion(&self, post: &DiscussionPost) -> Result<PublishedDiscussion>;
}

/// Credential strategy: personal token or app installation token.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}
