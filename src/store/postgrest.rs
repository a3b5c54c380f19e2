//! PostgREST backend — `FounderStore` over Supabase's `/rest/v1` interface.
//!
//! Reads project only the columns the connect flow uses. The account write is
//! filtered on the reference still being unset, so two racing requests cannot
//! both store an account; PostgREST echoes the updated rows
//! (`Prefer: return=representation`) and an empty echo means the filter
//! matched nothing.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::connect::model::{AccountId, AccountPatch, ConnectStatus, Founder};
use crate::error::StoreError;
use crate::store::traits::{FounderStore, RecordOutcome};

const FOUNDERS_TABLE: &str = "founders";
const FOUNDER_COLUMNS: &str = "id,stripe_account_id";
/// Matches rows whose reference is null or the empty string, the same values
/// `Founder::account_id` reads as absent.
const UNSET_ACCOUNT_FILTER: &str = "(stripe_account_id.is.null,stripe_account_id.eq.)";

/// Founder store backed by a Supabase project's PostgREST endpoint.
pub struct PostgrestFounderStore {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
}

impl PostgrestFounderStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, service_key: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{FOUNDERS_TABLE}", self.base_url)
    }

    /// Attach the service-role key as both `apikey` and bearer token.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        builder.header("apikey", key).bearer_auth(key)
    }

    async fn founder_rows(response: Response) -> Result<Vec<Founder>, StoreError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| StoreError::RequestFailed {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl FounderStore for PostgrestFounderStore {
    async fn get_founder(&self, id: Uuid) -> Result<Option<Founder>, StoreError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("id", format!("eq.{id}")), ("select", FOUNDER_COLUMNS.to_string())])
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed {
                reason: e.to_string(),
            })?;

        let rows = Self::founder_rows(response).await?;
        if rows.len() > 1 {
            warn!(founder_id = %id, rows = rows.len(), "Multiple founder rows for one id");
        }

        let founder = rows.into_iter().next();
        debug!(founder_id = %id, found = founder.is_some(), "Founder lookup");
        Ok(founder)
    }

    async fn record_account(
        &self,
        id: Uuid,
        account_id: &AccountId,
        status: ConnectStatus,
    ) -> Result<RecordOutcome, StoreError> {
        let patch = AccountPatch {
            stripe_account_id: account_id.as_str(),
            stripe_connect_status: status,
        };

        let response = self
            .authorized(self.client.patch(self.table_url()))
            .query(&[("id", format!("eq.{id}")), ("or", UNSET_ACCOUNT_FILTER.to_string())])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed {
                reason: e.to_string(),
            })?;

        let updated = Self::founder_rows(response).await?;
        debug!(founder_id = %id, account_id = %account_id, rows = updated.len(), "Account write");

        if updated.is_empty() {
            Ok(RecordOutcome::NotApplied)
        } else {
            Ok(RecordOutcome::Recorded)
        }
    }
}
