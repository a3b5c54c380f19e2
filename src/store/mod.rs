//! Persistence layer — founder rows behind the Supabase REST interface.

pub mod postgrest;
pub mod traits;

pub use postgrest::PostgrestFounderStore;
pub use traits::{FounderStore, RecordOutcome};
