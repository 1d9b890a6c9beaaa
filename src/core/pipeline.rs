use crate::core::links::LinkValidator;
use crate::core::retry::{retry, RetryPolicy};
use crate::domain::model::{DiscussionPost, PublishedDiscussion, TrendItem};
use crate::domain::ports::{DiscussionBackend, LinkProbe, TrendGenerator};
use crate::utils::error::Result;
use chrono::Local;

pub const DISCUSSION_CATEGORY: &str = "Tech Trends";
pub const TITLE_PREFIX: &str = "Tech Trends Report";
pub const DEFAULT_TREND_COUNT: usize = 5;

/// Everything the pipeline needs to know about the target, resolved from the
/// validated startup configuration.
#[derive(Debug, Clone)]
pub struct PublishTarget {
    pub owner: String,
    pub repo: String,
    /// Skips the category-by-name lookup when preconfigured.
    pub category_id: Option<String>,
}

/// Linear run: GENERATING -> VALIDATING -> PUBLISHING -> DONE. Any stage error
/// aborts the run; only the generation call itself is retried. Link problems
/// degrade the body but never abort.
pub struct TrendPipeline {
    generator: Box<dyn TrendGenerator>,
    probe: Box<dyn LinkProbe>,
    backend: Box<dyn DiscussionBackend>,
    target: PublishTarget,
    trend_count: usize,
    retry_policy: RetryPolicy,
}

impl TrendPipeline {
    pub fn new(
        generator: Box<dyn TrendGenerator>,
        probe: Box<dyn LinkProbe>,
        backend: Box<dyn DiscussionBackend>,
        target: PublishTarget,
    ) -> Self {
        Self {
            generator,
            probe,
            backend,
            target,
            trend_count: DEFAULT_TREND_COUNT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub async fn generate(&self) -> Result<Vec<TrendItem>> {
        tracing::info!(count = self.trend_count, "generating trends");
        retry(self.retry_policy, || {
            self.generator.fetch_trends(self.trend_count)
        })
        .await
    }

    pub async fn validate(&self, body: &str) -> Result<String> {
        tracing::info!("validating links");
        LinkValidator::new(self.generator.as_ref(), self.probe.as_ref())
            .validate(body)
            .await
    }

    pub async fn publish(&self, body: String) -> Result<PublishedDiscussion> {
        tracing::info!(owner = %self.target.owner, repo = %self.target.repo, "publishing discussion");
        let repository_id = self
            .backend
            .resolve_repository_id(&self.target.owner, &self.target.repo)
            .await?;

        let category_id = match &self.target.category_id {
            Some(id) => id.clone(),
            None => {
                self.backend
                    .resolve_category_id(&self.target.owner, &self.target.repo, DISCUSSION_CATEGORY)
                    .await?
            }
        };

        let post = DiscussionPost {
            repository_id,
            category_id,
            title: discussion_title(),
            body,
        };
        self.backend.create_discussion(&post).await
    }

    /// Full run. Returns the body instead of publishing when `dry_run` is set.
    pub async fn run(&self, dry_run: bool) -> Result<RunOutcome> {
        let trends = self.generate().await?;
        let body = render_body(&trends);
        let body = self.validate(&body).await?;

        if dry_run {
            tracing::info!("dry run, skipping publish");
            return Ok(RunOutcome::DryRun { body });
        }

        let published = self.publish(body).await?;
        tracing::info!(url = %published.url, "discussion created");
        Ok(RunOutcome::Published(published))
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Published(PublishedDiscussion),
    DryRun { body: String },
}

pub fn discussion_title() -> String {
    format!("{} - {}", TITLE_PREFIX, Local::now().date_naive())
}

pub fn render_body(trends: &[TrendItem]) -> String {
    let mut body = String::new();
    for (i, trend) in trends.iter().enumerate() {
        body.push_str(&format!("## {}. {}\n\n{}\n", i + 1, trend.title, trend.description));
        if let Some(url) = &trend.url {
            let label = trend.example_title.as_deref().unwrap_or("Read more");
            body.push_str(&format!("\nExample: [{}]({})\n", label, url));
        }
        body.push('\n');
    }
    body.trim_end().to_string()
}
