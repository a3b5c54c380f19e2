//! Find-or-create flow — resolves a founder's Stripe account and issues an
//! onboarding link for it.
//!
//! The sequence is strictly linear: look up the founder, create and record an
//! account only when none is stored, then ask Stripe for a link. Recording is
//! a required step; when the conditional write loses a race the stored
//! winner is used instead of the account this request created.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{AccountId, CallbackUrls, ConnectStatus, OnboardingLink};
use crate::error::{ConnectError, StoreError};
use crate::payments::{AccountKind, AccountLinkRequest, PaymentProvider};
use crate::store::{FounderStore, RecordOutcome};

/// Onboarding flow with its collaborators injected.
pub struct ConnectFlow {
    store: Arc<dyn FounderStore>,
    payments: Arc<dyn PaymentProvider>,
    callbacks: CallbackUrls,
}

impl ConnectFlow {
    pub fn new(
        store: Arc<dyn FounderStore>,
        payments: Arc<dyn PaymentProvider>,
        callbacks: CallbackUrls,
    ) -> Self {
        Self {
            store,
            payments,
            callbacks,
        }
    }

    /// Ensure `founder_id` has a connected account and return a fresh
    /// onboarding link for it.
    pub async fn onboarding_link(&self, founder_id: Uuid) -> Result<OnboardingLink, ConnectError> {
        let founder = self
            .store
            .get_founder(founder_id)
            .await?
            .ok_or(ConnectError::FounderNotFound(founder_id))?;

        let account_id = match founder.account_id() {
            Some(existing) => {
                debug!(founder_id = %founder_id, account_id = %existing, "Founder already has an account");
                existing
            }
            None => self.provision_account(founder_id).await?,
        };

        let request = AccountLinkRequest::onboarding(account_id.clone(), &self.callbacks);
        let link = self.payments.create_account_link(&request).await?;

        match Url::parse(&link.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConnectError::InvalidLink(link.url)),
        }

        info!(
            founder_id = %founder_id,
            account_id = %account_id,
            expires_at = ?link.expires_at,
            "Onboarding link issued"
        );

        Ok(OnboardingLink {
            account_id,
            url: link.url,
            expires_at: link.expires_at,
        })
    }

    /// Create an account and record it on the founder row.
    async fn provision_account(&self, founder_id: Uuid) -> Result<AccountId, ConnectError> {
        let created = self.payments.create_account(AccountKind::Standard).await?;
        info!(
            founder_id = %founder_id,
            account_id = %created,
            provider = self.payments.name(),
            "Connected account created"
        );

        let outcome = self
            .store
            .record_account(founder_id, &created, ConnectStatus::Pending)
            .await
            .map_err(|source| ConnectError::AccountNotRecorded {
                founder_id,
                account_id: created.to_string(),
                source,
            })?;

        match outcome {
            RecordOutcome::Recorded => Ok(created),
            RecordOutcome::NotApplied => self.resolve_lost_race(founder_id, created).await,
        }
    }

    /// The conditional write matched nothing. Re-read and adopt whatever
    /// account is stored now.
    async fn resolve_lost_race(
        &self,
        founder_id: Uuid,
        created: AccountId,
    ) -> Result<AccountId, ConnectError> {
        let not_recorded = |source: StoreError| ConnectError::AccountNotRecorded {
            founder_id,
            account_id: created.to_string(),
            source,
        };

        let winner = self
            .store
            .get_founder(founder_id)
            .await
            .map_err(not_recorded)?
            .and_then(|f| f.account_id());

        match winner {
            Some(winner) => {
                warn!(
                    founder_id = %founder_id,
                    account_id = %winner,
                    orphaned_account_id = %created,
                    "Another request recorded an account first; created account is orphaned"
                );
                Ok(winner)
            }
            None => Err(not_recorded(StoreError::NotUpdated { id: founder_id })),
        }
    }
}
