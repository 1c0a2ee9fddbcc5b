//! Okta event hook payloads and derived user records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder for identity fields Okta did not supply.
pub const SENTINEL: &str = "N/A";

/// Top-level Okta event hook delivery.
#[derive(Debug, Deserialize)]
pub struct EventHookPayload {
    #[serde(default)]
    pub data: Option<EventHookData>,
}

#[derive(Debug, Deserialize)]
pub struct EventHookData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<EventRecord>,
}

/// One membership event inside a delivery.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_targets")]
    pub target: Vec<TargetObject>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Okta sends `"target": null` on events without targets. A target that does
/// not fit any known shape, including one with no `type`, becomes `Other`.
fn lenient_targets<'de, D>(deserializer: D) -> Result<Vec<TargetObject>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = null_as_empty(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or(TargetObject::Other))
        .collect())
}

/// Entity referenced by an event, discriminated on Okta's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum TargetObject {
    #[serde(rename_all = "camelCase")]
    User {
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        alternate_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UserGroup {
        #[serde(default)]
        display_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AppInstance {
        #[serde(default)]
        display_name: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// A user pending provisioning, derived from a `User` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateUser {
    pub alternate_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl CandidateUser {
    /// Derive a candidate, splitting the display name on whitespace.
    ///
    /// The first token becomes the first name. The last token becomes the
    /// last name only when there are at least two tokens.
    pub fn new(alternate_id: Option<&str>, display_name: Option<&str>) -> Self {
        let display_name = display_name.unwrap_or_default();
        let tokens: Vec<&str> = display_name.split_whitespace().collect();

        let first_name = tokens.first().copied().unwrap_or(SENTINEL);
        let last_name = match tokens.as_slice() {
            [_, .., last] => *last,
            _ => SENTINEL,
        };

        Self {
            alternate_id: alternate_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(SENTINEL)
                .to_string(),
            display_name: display_name.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    /// Whether Okta supplied a usable username.
    pub fn has_username(&self) -> bool {
        self.alternate_id != SENTINEL
    }
}

/// Body of a successful verification handshake.
#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub verification: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of a successful provisioning run.
#[derive(Debug, Serialize)]
pub struct ProvisionedBody {
    pub message: String,
    pub results: Vec<UserResult>,
}

/// Outcome for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Created,
    Duplicate,
    Skipped,
    Failed,
}

/// Per-candidate entry of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResult {
    pub username: String,
    pub status: UserStatus,
}
