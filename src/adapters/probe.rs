use crate::domain::ports::LinkProbe;
use async_trait::async_trait;
use reqwest::Client;

/// HEAD-then-GET liveness probe. Any transport error or non-2xx status on
/// both methods counts as dead.
pub struct HttpLinkProbe {
    client: Client,
}

impl HttpLinkProbe {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpLinkProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkProbe for HttpLinkProbe {
    async fn is_alive(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => return true,
            Ok(response) => {
                tracing::debug!(url, status = %response.status(), "HEAD not successful, trying GET");
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "HEAD failed, trying GET");
            }
        }

        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url, error = %e, "GET failed");
                false
            }
        }
    }
}
