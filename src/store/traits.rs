//! `FounderStore` trait — the two founder-row operations the connect flow needs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::connect::model::{AccountId, ConnectStatus, Founder};
use crate::error::StoreError;

/// Result of a conditional account write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The row had no account reference and now holds ours.
    Recorded,
    /// No row matched: either another request stored a reference first, or
    /// the founder row is gone.
    NotApplied,
}

/// Backend-agnostic access to founder records.
#[async_trait]
pub trait FounderStore: Send + Sync {
    /// Fetch a founder by id. `Ok(None)` means no matching row.
    async fn get_founder(&self, id: Uuid) -> Result<Option<Founder>, StoreError>;

    /// Store `account_id` and `status` on the founder, but only while its
    /// account reference is still unset.
    async fn record_account(
        &self,
        id: Uuid,
        account_id: &AccountId,
        status: ConnectStatus,
    ) -> Result<RecordOutcome, StoreError>;
}
