//! In-memory fakes of the store and payment provider for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{AccountId, ConnectStatus, Founder};
use crate::error::{PaymentError, StoreError};
use crate::payments::{AccountKind, AccountLink, AccountLinkRequest, PaymentProvider};
use crate::store::{FounderStore, RecordOutcome};

#[derive(Default)]
struct Row {
    account: Option<String>,
    status: Option<ConnectStatus>,
}

#[derive(Default)]
struct StoreState {
    rows: HashMap<Uuid, Row>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
    /// Account another request stores just before our write lands.
    race_winner: Option<String>,
}

/// Founder store held in memory, with switches for failure paths.
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_founder(id: Uuid, account: Option<&str>) -> Arc<Self> {
        let store = Self::default();
        store.state.lock().unwrap().rows.insert(
            id,
            Row {
                account: account.map(str::to_string),
                status: None,
            },
        );
        Arc::new(store)
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn race_with(&self, winner: &str) {
        self.state.lock().unwrap().race_winner = Some(winner.to_string());
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn stored_account(&self, id: Uuid) -> Option<String> {
        self.state.lock().unwrap().rows.get(&id)?.account.clone()
    }

    pub fn stored_status(&self, id: Uuid) -> Option<ConnectStatus> {
        self.state.lock().unwrap().rows.get(&id)?.status
    }
}

#[async_trait]
impl FounderStore for FakeStore {
    async fn get_founder(&self, id: Uuid) -> Result<Option<Founder>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(StoreError::RequestFailed {
                reason: "connection refused".into(),
            });
        }
        Ok(state.rows.get(&id).map(|row| Founder {
            id,
            stripe_account_id: row.account.clone(),
        }))
    }

    async fn record_account(
        &self,
        id: Uuid,
        account_id: &AccountId,
        status: ConnectStatus,
    ) -> Result<RecordOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        if state.fail_writes {
            return Err(StoreError::Status {
                status: 503,
                body: "service unavailable".into(),
            });
        }

        let winner = state.race_winner.take();
        let Some(row) = state.rows.get_mut(&id) else {
            return Ok(RecordOutcome::NotApplied);
        };
        if let Some(winner) = winner {
            row.account = Some(winner);
            row.status = Some(ConnectStatus::Pending);
        }
        if row.account.as_deref().is_some_and(|a| !a.is_empty()) {
            return Ok(RecordOutcome::NotApplied);
        }

        row.account = Some(account_id.to_string());
        row.status = Some(status);
        Ok(RecordOutcome::Recorded)
    }
}

#[derive(Default)]
struct PaymentsState {
    accounts_created: usize,
    link_requests: Vec<AccountLinkRequest>,
    account_error: Option<String>,
    link_error: Option<String>,
    fixed_link_url: Option<String>,
}

/// Payment provider that records calls and mints sequential ids.
#[derive(Default)]
pub(crate) struct FakePayments {
    state: Mutex<PaymentsState>,
}

impl FakePayments {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_accounts(&self, message: &str) {
        self.state.lock().unwrap().account_error = Some(message.to_string());
    }

    pub fn fail_links(&self, message: &str) {
        self.state.lock().unwrap().link_error = Some(message.to_string());
    }

    pub fn link_url(&self, url: &str) {
        self.state.lock().unwrap().fixed_link_url = Some(url.to_string());
    }

    pub fn accounts_created(&self) -> usize {
        self.state.lock().unwrap().accounts_created
    }

    pub fn link_requests(&self) -> Vec<AccountLinkRequest> {
        self.state.lock().unwrap().link_requests.clone()
    }
}

fn api_error(message: &str) -> PaymentError {
    PaymentError::Api {
        status: 400,
        kind: Some("invalid_request_error".into()),
        message: message.to_string(),
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    fn name(&self) -> &str {
        "fake"
    }

    async fn create_account(&self, _kind: AccountKind) -> Result<AccountId, PaymentError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.account_error {
            return Err(api_error(message));
        }
        state.accounts_created += 1;
        Ok(AccountId::new(format!("acct_fake_{}", state.accounts_created)))
    }

    async fn create_account_link(
        &self,
        request: &AccountLinkRequest,
    ) -> Result<AccountLink, PaymentError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.link_error {
            return Err(api_error(message));
        }
        state.link_requests.push(request.clone());
        let url = state.fixed_link_url.clone().unwrap_or_else(|| {
            format!(
                "https://connect.stripe.com/setup/s/{}/{}",
                request.account,
                state.link_requests.len()
            )
        });
        Ok(AccountLink {
            url,
            expires_at: Some(1_700_000_300),
        })
    }
}
