//! Live Search Client
//!
//! Thin adapter over the configured web-search provider (SerpAPI or a
//! Google Custom Search Engine). Results are capped to the top three and
//! rendered as bullet snippets for prompt grounding. An unconfigured
//! backend yields an empty result set, not an error.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::SearchConfig;

const RESULT_LIMIT: usize = 3;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One search result row
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// Search client bound to the configured provider
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    config: SearchConfig,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
    answer_box: Option<serde_json::Value>,
    knowledge_graph: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

#[derive(Debug, Deserialize)]
struct GoogleCseResponse {
    #[serde(default)]
    items: Vec<GoogleCseItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleCseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Top results for a query. Empty when no provider is configured.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        match self.config.provider.as_str() {
            "serpapi" if !self.config.serpapi_key.is_empty() => self.search_serpapi(query).await,
            "google"
                if !self.config.google_api_key.is_empty()
                    && !self.config.google_cse_id.is_empty() =>
            {
                self.search_google(query).await
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn search_serpapi(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get("https://serpapi.com/search")
            .query(&[
                ("q", query),
                ("engine", "google"),
                ("api_key", self.config.serpapi_key.as_str()),
                ("num", "3"),
            ])
            .send()
            .await?;

        let data: SerpApiResponse = response.json().await?;

        let mut hits: Vec<SearchHit> = data
            .organic_results
            .into_iter()
            .take(RESULT_LIMIT)
            .map(|r| SearchHit {
                title: r.title.trim().to_string(),
                snippet: r.snippet.trim().to_string(),
                link: r.link,
            })
            .collect();

        // Answer box / knowledge graph fallback when nothing organic came back
        if hits.is_empty() {
            let kb = data.answer_box.or(data.knowledge_graph);
            if let Some(kb) = kb {
                let text = kb["description"]
                    .as_str()
                    .or_else(|| kb["answer"].as_str())
                    .unwrap_or_default()
                    .to_string();
                if !text.is_empty() {
                    hits.push(SearchHit {
                        title: String::new(),
                        snippet: text,
                        link: String::new(),
                    });
                }
            }
        }

        debug!("SerpAPI returned {} hits for {:?}", hits.len(), query);
        Ok(hits)
    }

    async fn search_google(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get("https://www.googleapis.com/customsearch/v1")
            .query(&[
                ("q", query),
                ("key", self.config.google_api_key.as_str()),
                ("cx", self.config.google_cse_id.as_str()),
                ("num", "3"),
            ])
            .send()
            .await?;

        let data: GoogleCseResponse = response.json().await?;
        let hits = data
            .items
            .into_iter()
            .take(RESULT_LIMIT)
            .map(|item| SearchHit {
                title: item.title.trim().to_string(),
                snippet: item.snippet.trim().to_string(),
                link: item.link,
            })
            .collect();

        Ok(hits)
    }
}

/// Render hits as the bullet summary used for prompt grounding and
/// user-facing result lists.
pub fn summarize(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            if hit.title.is_empty() {
                format!("• {}", hit.snippet)
            } else if hit.snippet.is_empty() {
                format!("• {}", hit.title)
            } else {
                format!("• {} — {}", hit.title, hit.snippet)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
