use crate::domain::model::LinkCheckOutcome;
use crate::domain::ports::{LinkProbe, TrendGenerator};
use crate::utils::error::Result;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// Domains a replacement link may point at. Anything else from the generator
/// is rejected and the link degrades to plain text.
pub const ALLOWED_LINK_DOMAINS: &[&str] = &[
    "github.com",
    "github.blog",
    "developer.mozilla.org",
    "en.wikipedia.org",
    "arxiv.org",
    "infoq.com",
    "martinfowler.com",
    "thenewstack.io",
];

/// One `[text](url)` occurrence, addressed by byte span so the rewrite never
/// has to locate it again by pattern.
#[derive(Debug, Clone)]
struct LinkOccurrence {
    start: usize,
    end: usize,
    text: String,
    url: String,
}

pub struct LinkValidator<'a> {
    generator: &'a dyn TrendGenerator,
    probe: &'a dyn LinkProbe,
    allowed_domains: &'a [&'a str],
}

impl<'a> LinkValidator<'a> {
    pub fn new(generator: &'a dyn TrendGenerator, probe: &'a dyn LinkProbe) -> Self {
        Self {
            generator,
            probe,
            allowed_domains: ALLOWED_LINK_DOMAINS,
        }
    }

    #[cfg(test)]
    fn with_allowed_domains(mut self, domains: &'a [&'a str]) -> Self {
        self.allowed_domains = domains;
        self
    }

    /// Probe every unique link in `body` once, decide replacement or strip for
    /// the dead ones, then apply all decisions in a single span-based rewrite.
    /// Degradation is logged and absorbed; this never fails the run.
    pub async fn validate(&self, body: &str) -> Result<String> {
        let occurrences = extract_links(body);
        if occurrences.is_empty() {
            tracing::debug!("no markdown links in body");
            return Ok(body.to_string());
        }

        let mut outcomes: HashMap<String, LinkCheckOutcome> = HashMap::new();
        for occ in &occurrences {
            if outcomes.contains_key(&occ.url) {
                continue;
            }
            let outcome = self.check_one(&occ.text, &occ.url).await?;
            outcomes.insert(occ.url.clone(), outcome);
        }

        Ok(rewrite(body, &occurrences, &outcomes))
    }

    async fn check_one(&self, text: &str, url: &str) -> Result<LinkCheckOutcome> {
        if self.probe.is_alive(url).await {
            tracing::debug!(url, "link alive");
            return Ok(LinkCheckOutcome::Alive);
        }

        tracing::warn!(url, "dead link, asking for a replacement");
        match self.generator.suggest_replacement(text, self.allowed_domains).await {
            Ok(candidate) => {
                let candidate = candidate.trim().to_string();
                if domain_allowed(&candidate, self.allowed_domains)
                    && self.probe.is_alive(&candidate).await
                {
                    tracing::info!(url, replacement = %candidate, "link replaced");
                    Ok(LinkCheckOutcome::Replaced { new_url: candidate })
                } else {
                    tracing::warn!(url, candidate = %candidate, "replacement rejected, stripping link");
                    Ok(LinkCheckOutcome::Stripped)
                }
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "replacement lookup failed, stripping link");
                Ok(LinkCheckOutcome::Stripped)
            }
        }
    }
}

fn extract_links(body: &str) -> Vec<LinkOccurrence> {
    // Anchor text and URL may contain regex metacharacters; spans make that a
    // non-issue because we never search for the match text again. The URL part
    // accepts balanced parenthesis runs so Wikipedia-style URLs like
    // .../Rust_(programming_language) are captured whole instead of being cut
    // at the first `)`.
    let re = Regex::new(r"\[([^\]]*)\]\((https?://[^\s)]*(?:\([^\s)]*\)[^\s)]*)*)\)")
        .expect("link regex is valid");
    re.captures_iter(body)
        .map(|caps| {
            let whole = caps.get(0).expect("capture 0 always present");
            LinkOccurrence {
                start: whole.start(),
                end: whole.end(),
                text: caps[1].to_string(),
                url: caps[2].to_string(),
            }
        })
        .collect()
}

fn rewrite(
    body: &str,
    occurrences: &[LinkOccurrence],
    outcomes: &HashMap<String, LinkCheckOutcome>,
) -> String {
    let mut out = String::with_capacity(body.len());
    let mut cursor = 0;

    for occ in occurrences {
        out.push_str(&body[cursor..occ.start]);
        match outcomes.get(&occ.url) {
            Some(LinkCheckOutcome::Replaced { new_url }) => {
                out.push_str(&format!("[{}]({})", occ.text, new_url));
            }
            Some(LinkCheckOutcome::Stripped) => {
                out.push_str(&occ.text);
            }
            _ => {
                out.push_str(&body[occ.start..occ.end]);
            }
        }
        cursor = occ.end;
    }
    out.push_str(&body[cursor..]);
    out
}

fn domain_allowed(url_str: &str, allowed: &[&str]) -> bool {
    let Ok(url) = Url::parse(url_str) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    allowed
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrendItem;
    use crate::utils::error::TrendError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockProbe {
        alive: HashMap<String, bool>,
        calls: Mutex<Vec<String>>,
    }

    impl MockProbe {
        fn new(entries: &[(&str, bool)]) -> Self {
            Self {
                alive: entries
                    .iter()
                    .map(|(u, a)| (u.to_string(), *a))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl LinkProbe for MockProbe {
        async fn is_alive(&self, url: &str) -> bool {
            self.calls.lock().unwrap().push(url.to_string());
            *self.alive.get(url).unwrap_or(&false)
        }
    }

    struct MockGenerator {
        replacement: Option<String>,
    }

    #[async_trait]
    impl TrendGenerator for MockGenerator {
        async fn fetch_trends(&self, _count: usize) -> crate::utils::error::Result<Vec<TrendItem>> {
            unreachable!("not used by link tests")
        }

        async fn suggest_replacement(
            &self,
            _topic: &str,
            _allowed_domains: &[&str],
        ) -> crate::utils::error::Result<String> {
            self.replacement
                .clone()
                .ok_or_else(|| TrendError::generation("no replacement available"))
        }
    }

    const DOMAINS: &[&str] = &["example.com"];

    #[tokio::test]
    async fn test_alive_links_untouched() {
        let probe = MockProbe::new(&[("https://example.com/a", true)]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = "See [docs](https://example.com/a) for details.";
        let result = validator.validate(body).await.unwrap();
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_duplicate_url_probed_once() {
        let probe = MockProbe::new(&[("https://example.com/a", true)]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = "[one](https://example.com/a) and [two](https://example.com/a)";
        validator.validate(body).await.unwrap();
        assert_eq!(probe.call_count("https://example.com/a"), 1);
    }

    #[tokio::test]
    async fn test_dead_link_rebound_to_live_replacement() {
        let probe = MockProbe::new(&[
            ("https://example.com/dead", false),
            ("https://example.com/new", true),
        ]);
        let gen = MockGenerator {
            replacement: Some("https://example.com/new".to_string()),
        };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = "Read [the post](https://example.com/dead) today.";
        let result = validator.validate(body).await.unwrap();
        assert_eq!(result, "Read [the post](https://example.com/new) today.");
    }

    #[tokio::test]
    async fn test_dead_link_and_dead_replacement_strips_markup() {
        let probe = MockProbe::new(&[
            ("https://example.com/dead", false),
            ("https://example.com/also-dead", false),
        ]);
        let gen = MockGenerator {
            replacement: Some("https://example.com/also-dead".to_string()),
        };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = "Read [the post](https://example.com/dead) today.";
        let result = validator.validate(body).await.unwrap();
        assert_eq!(result, "Read the post today.");
    }

    #[tokio::test]
    async fn test_replacement_off_allow_list_is_rejected() {
        let probe = MockProbe::new(&[
            ("https://example.com/dead", false),
            ("https://evil.test/x", true),
        ]);
        let gen = MockGenerator {
            replacement: Some("https://evil.test/x".to_string()),
        };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let result = validator
            .validate("[anchor](https://example.com/dead)")
            .await
            .unwrap();
        assert_eq!(result, "anchor");
    }

    #[tokio::test]
    async fn test_replacement_failure_strips_link() {
        let probe = MockProbe::new(&[("https://example.com/dead", false)]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let result = validator
            .validate("x [anchor](https://example.com/dead) y")
            .await
            .unwrap();
        assert_eq!(result, "x anchor y");
    }

    #[tokio::test]
    async fn test_regex_metacharacters_in_anchor_and_url() {
        let url = "https://example.com/a?b=(1)&c=[2]";
        let probe = MockProbe::new(&[(url, false)]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = format!("see [C++ (lang)]({}) here", url);
        let result = validator.validate(&body).await.unwrap();
        assert_eq!(result, "see C++ (lang) here");
    }

    #[tokio::test]
    async fn test_parenthesized_url_probed_whole_and_kept() {
        let url = "https://example.com/wiki/Rust_(programming_language)";
        let probe = MockProbe::new(&[(url, true)]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = format!("see [Rust]({}) here", url);
        let result = validator.validate(&body).await.unwrap();

        // the full URL must be probed, not a prefix cut at the inner `)`
        assert_eq!(probe.call_count(url), 1);
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_dead_parenthesized_url_strips_without_residue() {
        let url = "https://example.com/wiki/Rust_(programming_language)";
        let probe = MockProbe::new(&[(url, false)]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = format!("see [Rust]({}) here", url);
        let result = validator.validate(&body).await.unwrap();
        assert_eq!(result, "see Rust here");
    }

    #[tokio::test]
    async fn test_same_anchor_text_different_urls_do_not_collide() {
        let probe = MockProbe::new(&[
            ("https://example.com/live", true),
            ("https://example.com/dead", false),
        ]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = "[here](https://example.com/live) vs [here](https://example.com/dead)";
        let result = validator.validate(body).await.unwrap();
        assert_eq!(result, "[here](https://example.com/live) vs here");
    }

    #[tokio::test]
    async fn test_body_without_links_is_unchanged() {
        let probe = MockProbe::new(&[]);
        let gen = MockGenerator { replacement: None };
        let validator = LinkValidator::new(&gen, &probe).with_allowed_domains(DOMAINS);

        let body = "plain text, no links at all";
        assert_eq!(validator.validate(body).await.unwrap(), body);
    }

    #[test]
    fn test_domain_allowed_subdomains() {
        assert!(domain_allowed("https://example.com/x", DOMAINS));
        assert!(domain_allowed("https://docs.example.com/x", DOMAINS));
        assert!(!domain_allowed("https://notexample.com/x", DOMAINS));
        assert!(!domain_allowed("ftp://example.com/x", DOMAINS));
        assert!(!domain_allowed("not a url", DOMAINS));
    }
}
