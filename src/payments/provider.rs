//! Payment provider trait — the two Connect calls the onboarding flow makes.

use async_trait::async_trait;

use crate::connect::model::{AccountId, CallbackUrls};
use crate::error::PaymentError;

/// Kind of connected account to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Standard,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
        }
    }
}

/// Purpose of an account link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    AccountOnboarding,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountOnboarding => "account_onboarding",
        }
    }
}

/// Parameters for creating an account link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLinkRequest {
    pub account: AccountId,
    pub refresh_url: String,
    pub return_url: String,
    pub kind: LinkKind,
}

impl AccountLinkRequest {
    /// An onboarding link for `account` using the app's callbacks.
    pub fn onboarding(account: AccountId, callbacks: &CallbackUrls) -> Self {
        Self {
            account,
            refresh_url: callbacks.refresh_url.clone(),
            return_url: callbacks.return_url.clone(),
            kind: LinkKind::AccountOnboarding,
        }
    }
}

/// A link issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLink {
    pub url: String,
    pub expires_at: Option<i64>,
}

/// Payment processor operations used by the connect flow.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Create a new connected account and return its id.
    async fn create_account(&self, kind: AccountKind) -> Result<AccountId, PaymentError>;

    /// Issue a one-time account link.
    async fn create_account_link(
        &self,
        request: &AccountLinkRequest,
    ) -> Result<AccountLink, PaymentError>;
}
