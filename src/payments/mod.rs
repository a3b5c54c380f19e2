//! Payment processor integration.
//!
//! Only Stripe Connect is supported. The flow talks to it through the
//! `PaymentProvider` trait so tests can substitute a fake.

pub mod provider;
pub mod stripe;

pub use provider::{AccountKind, AccountLink, AccountLinkRequest, LinkKind, PaymentProvider};
pub use stripe::{STRIPE_API_VERSION, StripeClient};
