//! Stripe Connect client — form-encoded calls against the REST API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::connect::model::AccountId;
use crate::error::PaymentError;
use crate::payments::provider::{AccountKind, AccountLink, AccountLinkRequest, PaymentProvider};

/// API version pinned on every request.
pub const STRIPE_API_VERSION: &str = "2023-10-16";

/// Stripe's error envelope: `{"error": {"type": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AccountLinkObject {
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Stripe client bound to one secret key.
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

impl StripeClient {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, secret_key: SecretString) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.api_base)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, PaymentError> {
        let response = self
            .client
            .post(self.api_url(path))
            .bearer_auth(self.secret_key.expose_secret())
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(form)
            .send()
            .await
            .map_err(|e| PaymentError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| PaymentError::RequestFailed {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(path, status = status.as_u16(), "Stripe request rejected");
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| PaymentError::InvalidResponse {
            reason: format!("{path}: {e}"),
        })
    }
}

/// Turn a non-2xx Stripe response into a `PaymentError`, keeping Stripe's text.
fn api_error(status: u16, body: &str) -> PaymentError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => PaymentError::Api {
            status,
            kind: envelope.error.kind,
            message: envelope
                .error
                .message
                .unwrap_or_else(|| format!("Stripe returned HTTP {status}")),
        },
        Err(_) => PaymentError::Api {
            status,
            kind: None,
            message: format!("Stripe returned HTTP {status}: {body}"),
        },
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    fn name(&self) -> &str {
        "stripe"
    }

    async fn create_account(&self, kind: AccountKind) -> Result<AccountId, PaymentError> {
        let account: AccountObject = self
            .post_form("accounts", &[("type", kind.as_str())])
            .await?;

        if account.id.trim().is_empty() {
            return Err(PaymentError::InvalidResponse {
                reason: "account id is empty".into(),
            });
        }

        debug!(account_id = %account.id, "Stripe account created");
        Ok(AccountId::new(account.id))
    }

    async fn create_account_link(
        &self,
        request: &AccountLinkRequest,
    ) -> Result<AccountLink, PaymentError> {
        let link: AccountLinkObject = self
            .post_form(
                "account_links",
                &[
                    ("account", request.account.as_str()),
                    ("refresh_url", request.refresh_url.as_str()),
                    ("return_url", request.return_url.as_str()),
                    ("type", request.kind.as_str()),
                ],
            )
            .await?;

        Ok(AccountLink {
            url: link.url,
            expires_at: link.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Form, Router};
    use tokio::net::TcpListener;

    use super::*;
    use crate::connect::model::CallbackUrls;

    type Seen = Arc<Mutex<Vec<(HeaderMap, HashMap<String, String>)>>>;

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        body: &'static str,
        seen: Seen,
    }

    async fn stub_handler(
        State(stub): State<Stub>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        stub.seen.lock().unwrap().push((headers, form));
        (stub.status, stub.body)
    }

    async fn start_stub(status: StatusCode, body: &'static str) -> (StripeClient, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let stub = Stub {
            status,
            body,
            seen: Arc::clone(&seen),
        };
        let app = Router::new()
            .route("/v1/accounts", post(stub_handler))
            .route("/v1/account_links", post(stub_handler))
            .with_state(stub);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = StripeClient::new(
            reqwest::Client::new(),
            format!("http://127.0.0.1:{port}"),
            SecretString::from("sk_test_abc"),
        );
        (client, seen)
    }

    #[tokio::test]
    async fn create_account_posts_standard_type() {
        let (client, seen) = start_stub(StatusCode::OK, r#"{"id":"acct_1Nv0","object":"account"}"#).await;

        let id = client.create_account(AccountKind::Standard).await.unwrap();
        assert_eq!(id, AccountId::new("acct_1Nv0"));

        let seen = seen.lock().unwrap();
        let (headers, form) = &seen[0];
        assert_eq!(headers["authorization"], "Bearer sk_test_abc");
        assert_eq!(headers["stripe-version"], STRIPE_API_VERSION);
        assert_eq!(form.len(), 1);
        assert_eq!(form["type"], "standard");
    }

    #[tokio::test]
    async fn create_account_link_sends_callbacks() {
        let (client, seen) = start_stub(
            StatusCode::OK,
            r#"{"object":"account_link","url":"https://connect.stripe.com/setup/s/abc","expires_at":1700000300,"created":1700000000}"#,
        )
        .await;

        let request = AccountLinkRequest::onboarding(
            AccountId::new("acct_1Nv0"),
            &CallbackUrls::from_base("https://app.example.com"),
        );
        let link = client.create_account_link(&request).await.unwrap();
        assert_eq!(link.url, "https://connect.stripe.com/setup/s/abc");
        assert_eq!(link.expires_at, Some(1_700_000_300));

        let seen = seen.lock().unwrap();
        let (_, form) = &seen[0];
        assert_eq!(form["account"], "acct_1Nv0");
        assert_eq!(form["refresh_url"], "https://app.example.com/connect/refresh");
        assert_eq!(form["return_url"], "https://app.example.com/connect/success");
        assert_eq!(form["type"], "account_onboarding");
    }

    #[tokio::test]
    async fn stripe_error_message_is_preserved() {
        let (client, _seen) = start_stub(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"type":"invalid_request_error","message":"You must complete your platform profile to use Connect."}}"#,
        )
        .await;

        match client.create_account(AccountKind::Standard).await {
            Err(PaymentError::Api { status, kind, message }) => {
                assert_eq!(status, 400);
                assert_eq!(kind.as_deref(), Some("invalid_request_error"));
                assert_eq!(message, "You must complete your platform profile to use Connect.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_still_reports_status() {
        let (client, _seen) = start_stub(StatusCode::BAD_GATEWAY, "upstream hiccup").await;
        let err = client.create_account(AccountKind::Standard).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("502"));
        assert!(text.contains("upstream hiccup"));
    }

    #[tokio::test]
    async fn link_without_url_is_invalid_response() {
        let (client, _seen) = start_stub(StatusCode::OK, r#"{"object":"account_link"}"#).await;
        let request = AccountLinkRequest::onboarding(
            AccountId::new("acct_1"),
            &CallbackUrls::from_base("https://app.example.com"),
        );
        let err = client.create_account_link(&request).await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidResponse { .. }));
    }

    #[test]
    fn api_url_trims_trailing_slash() {
        let client = StripeClient::new(
            reqwest::Client::new(),
            "https://api.stripe.com/",
            SecretString::from("sk"),
        );
        assert_eq!(client.api_url("accounts"), "https://api.stripe.com/v1/accounts");
    }
}
