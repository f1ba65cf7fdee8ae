use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Instructs the model to return strictly structured invoice data.
const SYSTEM_PROMPT: &str = r#"You are a restaurant invoice assistant.
The user will describe an order in natural language, possibly followed by
extra context from a web search. Return ONLY a valid JSON object - no
markdown fences, no commentary. The object must match this schema:
{
  "invoice_date": string ("Today" if unspecified),
  "business": { "name", "address", "phone", "tax_id", "reg_no": string or omitted },
  "staff": { "served_by", "staff_id": string or omitted },
  "items": [
    {
      "date": string (e.g. "Today"),
      "category": string (Breakfast/Lunch/Dinner/Snacks/Beverages/Other),
      "description": string,
      "qty": number,
      "unit_price": number,
      "gst_pct": number (use 5 for food items unless stated otherwise)
    }
  ]
}
Omit any business or staff field the user did not mention."#;

fn default_date() -> String {
    "Today".to_string()
}

fn default_qty() -> f64 {
    1.0
}

fn default_gst() -> f64 {
    5.0
}

/// Business fields the model managed to extract. Absent fields must not
/// overwrite anything the caller already has.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub reg_no: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffPatch {
    pub served_by: Option<String>,
    pub staff_id: Option<String>,
}

/// One extracted order line. Amounts are not part of the payload — the
/// caller recomputes them from qty/price/GST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedItem {
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default)]
    pub category: String,
    pub description: String,
    #[serde(default = "default_qty")]
    pub qty: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default = "default_gst")]
    pub gst_pct: f64,
}

/// The structured result of one extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// "Today" is the unspecified sentinel; callers keep their own date.
    #[serde(default = "default_date")]
    pub invoice_date: String,
    #[serde(default)]
    pub business: BusinessPatch,
    #[serde(default)]
    pub staff: StaffPatch,
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no API key configured - set one before using autofill")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty response from model")]
    EmptyResponse,

    #[error("model returned invalid JSON: {message}\nraw response:\n{raw}")]
    InvalidJson { message: String, raw: String },
}

/// The narrow seam the UI layer talks through. The core never sees this
/// trait; swapping the backing service touches nothing else.
pub trait OrderExtractor {
    /// Parse a free-text order description into structured invoice data.
    /// `enrichment` is optional extra context (e.g. a web-search result)
    /// appended to the request.
    fn extract(
        &self,
        description: &str,
        enrichment: Option<&str>,
    ) -> Result<ExtractedInvoice, ExtractError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Extractor backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatExtractor {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl ChatExtractor {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        ChatExtractor {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("build http client"),
        }
    }
}

impl OrderExtractor for ChatExtractor {
    fn extract(
        &self,
        description: &str,
        enrichment: Option<&str>,
    ) -> Result<ExtractedInvoice, ExtractError> {
        if self.api_key.trim().is_empty() {
            return Err(ExtractError::MissingApiKey);
        }

        let mut user_content = description.to_string();
        if let Some(context) = enrichment {
            user_content.push_str("\n\nContext from web search:\n");
            user_content.push_str(context);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_content,
                },
            ],
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        info!(url = %url, model = %self.model, "requesting order extraction");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.trim()))
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json()?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or(ExtractError::EmptyResponse)?;

        let extracted = parse_response(content)?;
        info!(items = extracted.items.len(), "extraction complete");
        Ok(extracted)
    }
}

/// Parse the model's reply: strip markdown fences, cut surrounding prose
/// down to the outermost JSON value, then deserialize. A bare array is
/// accepted as an items-only result.
pub(crate) fn parse_response(raw: &str) -> Result<ExtractedInvoice, ExtractError> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let json = json_slice(trimmed).ok_or_else(|| ExtractError::InvalidJson {
        message: "no JSON object found".to_string(),
        raw: raw.to_string(),
    })?;
    if json.len() < trimmed.len() {
        warn!("model wrapped its JSON in extra prose");
    }

    if json.starts_with('[') {
        let items: Vec<ExtractedItem> =
            serde_json::from_str(json).map_err(|e| ExtractError::InvalidJson {
                message: e.to_string(),
                raw: raw.to_string(),
            })?;
        return Ok(ExtractedInvoice {
            invoice_date: default_date(),
            business: BusinessPatch::default(),
            staff: StaffPatch::default(),
            items,
        });
    }

    serde_json::from_str(json).map_err(|e| ExtractError::InvalidJson {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

/// The outermost `{...}` or `[...]` slice of `s`, if any.
fn json_slice(s: &str) -> Option<&str> {
    let obj = s.find('{').and_then(|start| s.rfind('}').map(|end| (start, end)));
    let arr = s.find('[').and_then(|start| s.rfind(']').map(|end| (start, end)));
    let (start, end) = match (obj, arr) {
        (Some(o), Some(a)) => {
            if a.0 < o.0 {
                a
            } else {
                o
            }
        }
        (Some(o), None) => o,
        (None, Some(a)) => a,
        (None, None) => return None,
    };
    if end <= start {
        return None;
    }
    Some(&s[start..=end])
}
