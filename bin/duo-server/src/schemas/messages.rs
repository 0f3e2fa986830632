use duo_store::ChatMessage;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 64))]
    pub sender: String,
    #[validate(length(min = 1, max = 4096))]
    pub content: String,
    /// `"CHAT"` (default) or `"SYSTEM"`.
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    /// RFC 3339 creation time; the server clock is used when omitted.
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub sender: String,
    pub content: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            timestamp: duo_store::timestamp::format(&m.timestamp),
            message_type: m.message_type.to_string(),
            sender: m.sender,
            content: m.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    /// Inclusive lower bound that was applied.
    pub since: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub before: String,
}

/// `?since=` window start, RFC 3339 (use `Z`, a literal `+` decodes as a space).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SinceQuery {
    pub since: Option<String>,
}

/// `?before=` retention cutoff, RFC 3339.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BeforeQuery {
    pub before: Option<String>,
}
