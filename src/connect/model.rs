//! Connect data model — founders, account references, onboarding links.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque Stripe account identifier (`acct_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection state stored on the founder row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStatus {
    /// Account created, onboarding not yet finished.
    Pending,
}

impl std::fmt::Display for ConnectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// The slice of a founder record this service reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Founder {
    pub id: Uuid,
    #[serde(default)]
    pub stripe_account_id: Option<String>,
}

impl Founder {
    /// The stored account reference. Null and `""` count as absent, matching
    /// the filter the conditional PATCH writes under, so any value this
    /// returns `None` for can also be overwritten.
    pub fn account_id(&self) -> Option<AccountId> {
        self.stripe_account_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(AccountId::new)
    }
}

/// Partial update written after a new account is provisioned.
#[derive(Debug, Clone, Serialize)]
pub struct AccountPatch<'a> {
    pub stripe_account_id: &'a str,
    pub stripe_connect_status: ConnectStatus,
}

/// Where Stripe sends the founder after onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    /// Visited when the link expired or was already used.
    pub refresh_url: String,
    /// Visited once the founder finishes the hosted flow.
    pub return_url: String,
}

impl CallbackUrls {
    /// Derive both callbacks from the app's public base URL.
    pub fn from_base(app_base_url: &str) -> Self {
        let base = app_base_url.trim_end_matches('/');
        Self {
            refresh_url: format!("{base}/connect/refresh"),
            return_url: format!("{base}/connect/success"),
        }
    }
}

/// A freshly issued onboarding link. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingLink {
    pub account_id: AccountId,
    pub url: String,
    /// Unix timestamp after which Stripe rejects the link, when reported.
    pub expires_at: Option<i64>,
}

/// Body of `POST /founder/connect-stripe`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConnectRequest {
    /// Founder id in hyphenated form (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`).
    #[serde(deserialize_with = "hyphenated_uuid")]
    pub founder_id: Uuid,
}

/// Successful response body.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConnectResponse {
    /// Processor-hosted onboarding URL.
    pub url: String,
}

/// Error body for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

const HYPHENATED_UUID_LEN: usize = 36;

/// Accept only the canonical hyphenated UUID text. `Uuid::parse_str` also
/// takes the simple, braced and `urn:uuid:` forms.
fn hyphenated_uuid<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.len() != HYPHENATED_UUID_LEN {
        return Err(serde::de::Error::custom(format!(
            "founder_id must be a hyphenated UUID, got '{raw}'"
        )));
    }
    Uuid::parse_str(&raw).map_err(serde::de::Error::custom)
}
