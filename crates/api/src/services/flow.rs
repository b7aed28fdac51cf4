//! Flow payment gateway client.
//!
//! Flow (flow.cl) signs every request with an HMAC-SHA256 over the
//! alphabetically sorted `name||value` concatenation of the parameters,
//! hex-encoded and appended as the `s` parameter.
//!
//! Without credentials the client runs in mock mode: payment sessions get
//! a `MOCK-` token and every status check reports the payment as paid,
//! which keeps local development working without a Flow account.

use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use cerveceria_core::{PaymentStatus, Pesos};

use crate::config::FlowConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from the Flow gateway client.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Credentials are required for live calls but absent.
    #[error("flow credentials not configured")]
    MissingCredentials,

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Flow returned a non-success status.
    #[error("flow returned {status}: {body}")]
    Gateway { status: u16, body: String },

    /// Flow's response body did not parse.
    #[error("invalid flow response: {0}")]
    InvalidResponse(String),
}

/// A created payment session: where to send the customer.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// Flow's opaque transaction token.
    pub token: String,
    /// Flow's numeric order identifier, absent in mock mode.
    pub flow_order: Option<i64>,
    /// Full URL to redirect the customer to.
    pub redirect_url: String,
}

/// The gateway's view of a payment.
#[derive(Debug, Clone)]
pub struct GatewayStatus {
    pub status: PaymentStatus,
    pub flow_order: Option<i64>,
    pub amount: Option<Pesos>,
}

/// Parameters for creating a payment.
#[derive(Debug)]
pub struct CreatePayment {
    /// Our order number, shown in the Flow dashboard.
    pub commerce_order: String,
    /// Human-readable description.
    pub subject: String,
    pub amount: Pesos,
    /// Payer email, required by Flow.
    pub email: String,
    /// Webhook Flow POSTs the token to when the payment settles.
    pub url_confirmation: String,
    /// Where the customer lands after paying.
    pub url_return: String,
}

#[derive(Deserialize)]
struct CreateResponse {
    url: String,
    token: String,
    #[serde(rename = "flowOrder")]
    flow_order: Option<i64>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: i64,
    #[serde(rename = "flowOrder")]
    flow_order: Option<i64>,
    amount: Option<i64>,
}

/// Flow gateway client.
#[derive(Debug, Clone)]
pub struct FlowClient {
    config: FlowConfig,
    http: Client,
}

impl FlowClient {
    /// Create a client from the loaded configuration.
    #[must_use]
    pub fn new(config: FlowConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Whether this client simulates payments instead of calling Flow.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        self.config.is_mock()
    }

    /// Create a payment session and return the redirect target.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` on transport failures or unparseable responses.
    pub async fn create_payment(&self, request: CreatePayment) -> Result<PaymentSession, FlowError> {
        if self.is_mock() {
            let token = format!("MOCK-{}", Uuid::new_v4().simple());
            let redirect_url = format!("{}?token={token}", request.url_return);
            return Ok(PaymentSession {
                token,
                flow_order: None,
                redirect_url,
            });
        }

        let api_key = self.api_key()?;
        let mut params = vec![
            ("apiKey", api_key.to_string()),
            ("amount", request.amount.amount().to_string()),
            ("commerceOrder", request.commerce_order),
            ("currency", "CLP".to_string()),
            ("email", request.email),
            ("subject", request.subject),
            ("urlConfirmation", request.url_confirmation),
            ("urlReturn", request.url_return),
        ];
        let signature = self.sign(&params)?;
        params.push(("s", signature));

        let response = self
            .http
            .post(format!("{}/payment/create", self.config.api_url))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FlowError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreateResponse =
            serde_json::from_str(&body).map_err(|e| FlowError::InvalidResponse(e.to_string()))?;

        Ok(PaymentSession {
            redirect_url: format!("{}?token={}", created.url, created.token),
            token: created.token,
            flow_order: created.flow_order,
        })
    }

    /// Query the gateway for a payment's current status.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` on transport failures or unparseable responses.
    pub async fn payment_status(&self, token: &str) -> Result<GatewayStatus, FlowError> {
        if self.is_mock() || token.starts_with("MOCK-") {
            // Simulated payments settle immediately.
            return Ok(GatewayStatus {
                status: PaymentStatus::Paid,
                flow_order: None,
                amount: None,
            });
        }

        let api_key = self.api_key()?;
        let mut params = vec![
            ("apiKey", api_key.to_string()),
            ("token", token.to_string()),
        ];
        let signature = self.sign(&params)?;
        params.push(("s", signature));

        let response = self
            .http
            .get(format!("{}/payment/getStatus", self.config.api_url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FlowError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StatusResponse =
            serde_json::from_str(&body).map_err(|e| FlowError::InvalidResponse(e.to_string()))?;

        Ok(GatewayStatus {
            status: PaymentStatus::from_flow_code(parsed.status),
            flow_order: parsed.flow_order,
            amount: parsed.amount.map(Pesos::new),
        })
    }

    fn api_key(&self) -> Result<&str, FlowError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(FlowError::MissingCredentials)
    }

    fn secret_key(&self) -> Result<&SecretString, FlowError> {
        self.config
            .secret_key
            .as_ref()
            .ok_or(FlowError::MissingCredentials)
    }

    /// Sign parameters the Flow way: sort by name, concatenate `name||value`,
    /// HMAC-SHA256 with the secret key, hex-encode.
    fn sign(&self, params: &[(&str, String)]) -> Result<String, FlowError> {
        let secret = self.secret_key()?;

        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by_key(|(name, _)| *name);

        let mut payload = String::new();
        for (name, value) in sorted {
            payload.push_str(name);
            payload.push_str(value);
        }

        #[allow(clippy::expect_used)] // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_with_credentials() -> FlowClient {
        FlowClient::new(FlowConfig {
            api_key: Some("test-api-key".to_string()),
            secret_key: Some(SecretString::from("test-signing-secret")),
            api_url: "https://sandbox.flow.cl/api".to_string(),
        })
    }

    fn mock_client() -> FlowClient {
        FlowClient::new(FlowConfig {
            api_key: None,
            secret_key: None,
            api_url: "https://sandbox.flow.cl/api".to_string(),
        })
    }

    #[test]
    fn test_signature_is_order_independent() {
        let client = client_with_credentials();
        let a = client
            .sign(&[
                ("apiKey", "k".to_string()),
                ("amount", "1000".to_string()),
                ("token", "t".to_string()),
            ])
            .unwrap();
        let b = client
            .sign(&[
                ("token", "t".to_string()),
                ("apiKey", "k".to_string()),
                ("amount", "1000".to_string()),
            ])
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_is_hex_sha256() {
        let client = client_with_credentials();
        let sig = client.sign(&[("apiKey", "k".to_string())]).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_values() {
        let client = client_with_credentials();
        let a = client.sign(&[("amount", "1000".to_string())]).unwrap();
        let b = client.sign(&[("amount", "1001".to_string())]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_without_secret_fails() {
        let client = mock_client();
        let result = client.sign(&[("apiKey", "k".to_string())]);
        assert!(matches!(result, Err(FlowError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_mock_create_payment() {
        let client = mock_client();
        let session = client
            .create_payment(CreatePayment {
                commerce_order: "ORD-1".to_string(),
                subject: "Pedido ORD-1".to_string(),
                amount: Pesos(12_000),
                email: "cliente@example.com".to_string(),
                url_confirmation: "http://localhost:3000/api/pagos/flow/confirm".to_string(),
                url_return: "http://localhost:3000/api/pagos/flow/return".to_string(),
            })
            .await
            .unwrap();

        assert!(session.token.starts_with("MOCK-"));
        assert!(session.redirect_url.contains(&session.token));
        assert!(session.flow_order.is_none());
    }

    #[tokio::test]
    async fn test_mock_status_is_paid() {
        let client = mock_client();
        let status = client.payment_status("MOCK-abc123").await.unwrap();
        assert_eq!(status.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_mock_token_short_circuits_live_client() {
        // A MOCK- token must never reach the real gateway, even with
        // credentials configured.
        let client = client_with_credentials();
        let status = client.payment_status("MOCK-abc123").await.unwrap();
        assert_eq!(status.status, PaymentStatus::Paid);
    }
}
