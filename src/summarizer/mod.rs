//! LLM summaries for documentation search results.
//!
//! Talks to an OpenAI-compatible chat completions endpoint chosen from
//! the model config table. Summaries are best-effort: any failure along
//! the way yields `None` and the search response ships without one.

use crate::database::DatabaseManager;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// One search hit as presented to the summarizer.
#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub title: String,
    pub path: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct SearchSummarizer {
    http: reqwest::Client,
}

impl SearchSummarizer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Summarize search matches for the user's question. Returns `None`
    /// when no model config is available or the upstream call fails.
    pub async fn summarize(
        &self,
        database: &dyn DatabaseManager,
        owner: &str,
        repo: &str,
        query: &str,
        matches: &[SearchMatch],
    ) -> Option<String> {
        let config = match database.model_configs().resolve_summarizer_config().await {
            Ok(Some(config)) => config,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to resolve summarizer model config: {}", e);
                return None;
            }
        };

        let prompt = build_prompt(owner, repo, query, matches);
        let url = format!("{}/chat/completions", config.endpoint.trim_end_matches('/'));

        let body = json!({
            "model": config.model_id,
            "max_tokens": 12000,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert repository documentation assistant for developers. \
                                Your role is to provide clear, comprehensive, and actionable answers \
                                based on repository documentation search results. Prioritize accuracy, \
                                completeness, and practical guidance. Structure your responses \
                                professionally and cite relevant documentation paths when applicable."
                },
                { "role": "user", "content": prompt }
            ]
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Summarizer request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Summarizer returned status {}", response.status());
            return None;
        }

        let parsed: ChatCompletionResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Summarizer response was not valid JSON: {}", e);
                return None;
            }
        };

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }
}

impl Default for SearchSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_prompt(owner: &str, repo: &str, query: &str, matches: &[SearchMatch]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("Repository: {}/{}\n", owner, repo));
    prompt.push_str(&format!("User Question: {}\n\n", query));
    prompt.push_str("Search Results:\n");
    for m in matches {
        prompt.push_str(&format!("- {} ({})\n", m.title, m.path));
        if !m.snippet.trim().is_empty() {
            prompt.push_str(&format!("  Snippet: {}\n", m.snippet));
        }
    }
    prompt.push_str("\n=== INSTRUCTIONS ===\n");
    prompt.push_str(
        "You are an expert repository documentation assistant. Analyze the search results above \
         and provide a comprehensive, well-structured answer to the user's question.\n\n",
    );
    prompt.push_str("Your response MUST include the following sections:\n\n");
    prompt.push_str("1. **Executive Summary** (2-3 sentences)\n");
    prompt.push_str("   - Provide a concise, direct answer to the user's question.\n");
    prompt.push_str("   - Highlight the most critical information or conclusion.\n\n");
    prompt.push_str("2. **Detailed Explanation**\n");
    prompt.push_str(
        "   - Break down key concepts, configurations, or implementation steps in separate paragraphs.\n",
    );
    prompt.push_str(
        "   - Reference specific document paths from the search results when applicable.\n",
    );
    prompt.push_str(
        "   - Include code examples, configuration snippets, or command-line instructions if relevant.\n\n",
    );
    prompt.push_str("3. **Recommended Next Steps**\n");
    prompt.push_str(
        "   - Suggest specific documents or sections the user should read for deeper understanding.\n",
    );
    prompt.push_str("   - Provide actionable follow-up tasks or verification steps.\n\n");
    prompt.push_str("=== GUIDELINES ===\n");
    prompt.push_str("- Use clear, professional technical writing suitable for developers.\n");
    prompt.push_str(
        "- If the search results don't fully answer the question, acknowledge the gaps and explain \
         what additional context would help.\n",
    );
    prompt.push_str(
        "- If multiple search results are relevant, synthesize information from all of them rather \
         than treating them separately.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_repository_query_and_matches() {
        let matches = vec![
            SearchMatch {
                title: "Getting Started".to_string(),
                path: "docs/start.md".to_string(),
                snippet: "install with cargo".to_string(),
            },
            SearchMatch {
                title: "Config".to_string(),
                path: "docs/config.md".to_string(),
                snippet: String::new(),
            },
        ];
        let prompt = build_prompt("acme", "widgets", "how do I install?", &matches);
        assert!(prompt.contains("Repository: acme/widgets"));
        assert!(prompt.contains("User Question: how do I install?"));
        assert!(prompt.contains("- Getting Started (docs/start.md)"));
        assert!(prompt.contains("  Snippet: install with cargo"));
        // Blank snippets are omitted.
        assert!(prompt.contains("- Config (docs/config.md)"));
        assert!(!prompt.contains("Snippet: \n"));
    }
}
