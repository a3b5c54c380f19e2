//! Error types for founder-connect.

use uuid::Uuid;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Founder data store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    MalformedResponse(String),

    #[error("No founder row updated for {id}")]
    NotUpdated { id: Uuid },
}

/// Payment processor errors.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment processor request failed: {reason}")]
    RequestFailed { reason: String },

    /// The processor answered with an error object; `message` is its own text.
    #[error("{message}")]
    Api {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    #[error("Invalid response from payment processor: {reason}")]
    InvalidResponse { reason: String },
}

/// Outcome of the find-or-create onboarding flow.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Founder {0} not found")]
    FounderNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The processor account exists but the founder row does not reference it.
    #[error("Account {account_id} was created for founder {founder_id} but not recorded: {source}")]
    AccountNotRecorded {
        founder_id: Uuid,
        account_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Onboarding link is not an absolute URL: {0}")]
    InvalidLink(String),
}

impl ConnectError {
    /// Whether this error maps to the caller-facing "not found" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnectError::FounderNotFound(_))
    }
}
