use serde::{Deserialize, Deserializer};

/// One mention as the API returns it. Everything beyond `id` is optional;
/// the normalizer decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMention {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// `%Y-%m-%d %H:%M:%S`, e.g. "2026-02-14 09:30:00".
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub text_summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

/// One page of the paginated mentions listing. An absent `nextCursor`
/// signals the end of the result set.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionsPage {
    #[serde(default)]
    pub mentions: Vec<RawMention>,
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "expiresIn", default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// The API is inconsistent about numeric fields: ids and sentiment scores
/// arrive as either JSON strings or numbers depending on the source platform.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
