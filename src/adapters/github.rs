use crate::adapters::auth::USER_AGENT;
use crate::domain::model::{DiscussionCategory, DiscussionPost, PublishedDiscussion};
use crate::domain::ports::{CredentialProvider, DiscussionBackend};
use crate::utils::error::{Result, TrendError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const REPOSITORY_ID_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) { id }
}"#;

const CATEGORIES_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    discussionCategories(first: 100) {
      nodes { id name }
    }
  }
}"#;

const CREATE_DISCUSSION_MUTATION: &str = r#"
mutation($repositoryId: ID!, $categoryId: ID!, $title: String!, $body: String!) {
  createDiscussion(input: {repositoryId: $repositoryId, categoryId: $categoryId, title: $title, body: $body}) {
    discussion { id url }
  }
}"#;

/// GraphQL transport for discussions. Auth is delegated to the injected
/// credential provider so token and app installations share one client.
pub struct GitHubDiscussions {
    client: Client,
    api_base: String,
    credentials: Box<dyn CredentialProvider>,
}

impl GitHubDiscussions {
    pub fn new(api_base: impl Into<String>, credentials: Box<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            credentials,
        }
    }

    async fn graphql(&self, query: &str, variables: serde_json::Value) -> Result<serde_json::Value> {
        let token = self.credentials.bearer_token().await?;
        let response = self
            .client
            .post(format!("{}/graphql", self.api_base))
            .bearer_auth(token)
            .header("User-Agent", USER_AGENT)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendError::platform(format!(
                "GraphQL endpoint returned {}: {}",
                status, body
            )));
        }

        let envelope: GraphQlEnvelope = response.json().await?;
        if let Some(errors) = envelope.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(TrendError::platform(messages.join("; ")));
        }
        envelope
            .data
            .ok_or_else(|| TrendError::platform("GraphQL response had no data"))
    }
}

#[async_trait]
impl DiscussionBackend for GitHubDiscussions {
    async fn resolve_repository_id(&self, owner: &str, repo: &str) -> Result<String> {
        let data = self
            .graphql(REPOSITORY_ID_QUERY, json!({ "owner": owner, "name": repo }))
            .await?;
        data["repository"]["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TrendError::platform(format!("repository {}/{} not found", owner, repo)))
    }

    async fn resolve_category_id(&self, owner: &str, repo: &str, name: &str) -> Result<String> {
        let data = self
            .graphql(CATEGORIES_QUERY, json!({ "owner": owner, "name": repo }))
            .await?;

        let nodes = data["repository"]["discussionCategories"]["nodes"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut categories: Vec<DiscussionCategory> = Vec::with_capacity(nodes.len());
        for node in nodes {
            match serde_json::from_value(node.clone()) {
                Ok(category) => categories.push(category),
                Err(e) => {
                    tracing::warn!(error = %e, node = %node, "skipping malformed category node")
                }
            }
        }
        tracing::debug!(count = categories.len(), "fetched discussion categories");

        categories
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .ok_or_else(|| TrendError::CategoryNotFoundError {
                name: name.to_string(),
            })
    }

    async fn create_discussion(&self, post: &DiscussionPost) -> Result<PublishedDiscussion> {
        let data = self
            .graphql(
                CREATE_DISCUSSION_MUTATION,
                json!({
                    "repositoryId": post.repository_id,
                    "categoryId": post.category_id,
                    "title": post.title,
                    "body": post.body,
                }),
            )
            .await?;

        let discussion = &data["createDiscussion"]["discussion"];
        match (discussion["id"].as_str(), discussion["url"].as_str()) {
            (Some(id), Some(url)) => Ok(PublishedDiscussion {
                id: id.to_string(),
                url: url.to_string(),
            }),
            _ => Err(TrendError::platform(
                "createDiscussion returned no discussion node",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}
