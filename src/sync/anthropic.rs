use reqwest::Client;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Returned when no API key is configured so the feature still does something visible.
pub const FALLBACK_SUBTASKS: [&str; 3] = ["Plan the task", "Execute step 1", "Review results"];

const MAX_SUBTASKS: usize = 5;

const SYSTEM_PROMPT: &str = "You break tasks down into subtasks. Return ONLY a JSON array of \
     3 to 5 strings, no explanation. Each string is a concise imperative action \
     (e.g. \"Draft the outline\", \"Email the vendor\").";

/// Asks the Anthropic Messages API to decompose a task into subtasks.
#[derive(Clone)]
pub struct SubtaskSuggester {
    api_key: Option<String>,
    base_url: String,
    model: String,
    http: Client,
}

impl SubtaskSuggester {
    pub fn new(api_key: Option<String>, base_url: &str, model: &str) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http: Client::new(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Best effort: 0..5 subtasks, the fixed fallback without a key, empty on any failure.
    pub async fn suggest_subtasks(&self, task_text: &str) -> Vec<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            log::warn!("Anthropic API key is missing, using placeholder subtasks");
            return FALLBACK_SUBTASKS.iter().map(|s| s.to_string()).collect();
        };

        match self.request_subtasks(api_key, task_text).await {
            Ok(subtasks) => {
                log::debug!("AI suggested {} subtasks", subtasks.len());
                subtasks
            }
            Err(e) => {
                log::error!("AI subtask generation failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn request_subtasks(
        &self,
        api_key: &str,
        task_text: &str,
    ) -> Result<Vec<String>, String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 300,
            "system": SYSTEM_PROMPT,
            "messages": [
                { "role": "user", "content": format!("Task: \"{}\"", task_text) }
            ]
        });

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("API request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("API error {}: {}", status, text));
        }

        let api_resp: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse API response: {}", e))?;

        let text = api_resp["content"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|block| block["text"].as_str())
            .ok_or_else(|| "No text in API response".to_string())?;

        parse_subtask_list(text)
    }
}

/// Parse the model's reply as a JSON array of strings, tolerating markdown code fences.
pub fn parse_subtask_list(text: &str) -> Result<Vec<String>, String> {
    let json_str = text
        .trim()
        .strip_prefix("```json")
        .or_else(|| text.trim().strip_prefix("```"))
        .unwrap_or(text.trim());
    let json_str = json_str.strip_suffix("```").unwrap_or(json_str).trim();

    let items: Vec<String> = serde_json::from_str(json_str)
        .map_err(|e| format!("Failed to parse subtasks: {} (raw: {})", e, text))?;

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_SUBTASKS)
        .collect())
}
