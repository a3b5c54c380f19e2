//! Stripe Connect onboarding for founders.
//!
//! A founder gets at most one connected account. The first request creates
//! it and records it on the founder row; every request (first or not) gets a
//! fresh, short-lived onboarding link from Stripe.

pub mod flow;
pub mod model;
pub mod routes;
#[cfg(test)]
pub(crate) mod testing;

pub use flow::ConnectFlow;
pub use model::{
    AccountId, CallbackUrls, ConnectRequest, ConnectResponse, ConnectStatus, ErrorBody, Founder,
    OnboardingLink,
};
pub use routes::{ConnectRouteState, connect_routes};
