//! Founder Connect — Stripe Connect onboarding links for founders.

pub mod config;
pub mod connect;
pub mod error;
pub mod payments;
pub mod server;
pub mod store;
