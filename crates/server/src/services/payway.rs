//! ABA `PayWay` KHQR payment request signing.
//!
//! The gateway verifies an HMAC-SHA512 digest over a fixed concatenation of
//! request fields:
//!
//! ```text
//! req_time + merchant_id + tran_id + amount + items + payment_option
//! ```
//!
//! Any change to the field order produces a digest the gateway rejects, and
//! nothing on this side can detect that. The signing key never leaves the
//! server; only the digest is returned to the client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha512;
use thiserror::Error;
use tracing::{instrument, warn};
use url::Url;

use roomservice_core::{OrderId, format_amount};

use crate::config::PaywayConfig;

/// Payment option tag for KHQR payments.
pub const PAYMENT_OPTION_KHQR: &str = "abapay_khqr";

/// Item name the gateway shows for every order.
const SUMMARY_ITEM_NAME: &str = "Hotel Order";

/// Errors that can occur while signing a payment request.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to encode item summary: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid callback url: {0}")]
    CallbackUrl(#[from] url::ParseError),
}

/// Signed checkout payload handed to the client for the gateway redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPayload {
    /// Epoch milliseconds, as text.
    pub req_time: String,
    pub merchant_id: String,
    /// Order id, used by the gateway as the transaction id.
    pub tran_id: String,
    /// Total with exactly two decimal places.
    pub amount: String,
    /// Base64 of the item summary JSON.
    pub items: String,
    /// Base64 HMAC-SHA512 digest.
    pub hash: String,
    pub payment_option: String,
    pub return_url: String,
    pub continue_success_url: String,
}

/// Marker returned when no gateway credentials are configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedPayment {
    pub simulated: bool,
    pub order_id: OrderId,
}

/// What the client receives as `abaData` for a KHQR order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PaymentRequest {
    /// Real payload; the client redirects to the gateway.
    Checkout(CheckoutPayload),
    /// No gateway call will happen; the client takes the immediate-success path.
    Simulated(SimulatedPayment),
}

impl PaymentRequest {
    #[must_use]
    pub const fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

#[derive(Serialize)]
struct SummaryItem<'a> {
    name: &'a str,
    quantity: &'a str,
    price: &'a str,
}

#[derive(Clone)]
struct Credentials {
    merchant_id: String,
    api_key: SecretString,
}

/// Builds and signs KHQR payment requests.
#[derive(Clone)]
pub struct PaywaySigner {
    credentials: Option<Credentials>,
    return_url: Url,
    continue_success_url: Url,
}

impl std::fmt::Debug for PaywaySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaywaySigner")
            .field(
                "merchant_id",
                &self.credentials.as_ref().map(|c| c.merchant_id.as_str()),
            )
            .field("return_url", &self.return_url.as_str())
            .field("continue_success_url", &self.continue_success_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PaywaySigner {
    /// Create a signer from gateway configuration and the guest app origin.
    ///
    /// Without both merchant id and key the signer runs in simulated mode.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::CallbackUrl` if the callback URLs cannot be built.
    pub fn new(config: &PaywayConfig, frontend_url: &Url) -> Result<Self, SigningError> {
        let credentials = match (&config.merchant_id, &config.api_key) {
            (Some(merchant_id), Some(api_key)) => Some(Credentials {
                merchant_id: merchant_id.clone(),
                api_key: api_key.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            credentials,
            return_url: callback_url(frontend_url, "checkout/success")?,
            continue_success_url: callback_url(frontend_url, "admin")?,
        })
    }

    /// Whether real payloads will be signed.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Build the payment request for an order.
    ///
    /// # Errors
    ///
    /// Returns `SigningError` if the key is rejected or the summary cannot be encoded.
    #[instrument(skip(self), fields(simulated = !self.is_configured()))]
    pub fn payment_request(
        &self,
        order_id: OrderId,
        total: Decimal,
        requested_at: DateTime<Utc>,
    ) -> Result<PaymentRequest, SigningError> {
        let Some(credentials) = &self.credentials else {
            warn!(%order_id, "Gateway credentials missing, returning simulated payment");
            return Ok(PaymentRequest::Simulated(SimulatedPayment {
                simulated: true,
                order_id,
            }));
        };

        let req_time = requested_at.timestamp_millis().to_string();
        let tran_id = order_id.to_string();
        let amount = format_amount(total);
        let items = encode_item_summary(&amount)?;

        let canonical = canonical_string(
            &req_time,
            &credentials.merchant_id,
            &tran_id,
            &amount,
            &items,
            PAYMENT_OPTION_KHQR,
        );
        let hash = sign(&credentials.api_key, &canonical)?;

        Ok(PaymentRequest::Checkout(CheckoutPayload {
            req_time,
            merchant_id: credentials.merchant_id.clone(),
            tran_id,
            amount,
            items,
            hash,
            payment_option: PAYMENT_OPTION_KHQR.to_string(),
            return_url: self.return_url.to_string(),
            continue_success_url: self.continue_success_url.to_string(),
        }))
    }
}

/// Base64 of `[{"name":"Hotel Order","quantity":"1","price":<amount>}]`.
///
/// # Errors
///
/// Returns `SigningError::Encode` if serialization fails.
pub fn encode_item_summary(amount: &str) -> Result<String, SigningError> {
    let summary = [SummaryItem {
        name: SUMMARY_ITEM_NAME,
        quantity: "1",
        price: amount,
    }];
    let json = serde_json::to_string(&summary)?;
    Ok(STANDARD.encode(json))
}

/// The exact string the gateway digests.
#[must_use]
pub fn canonical_string(
    req_time: &str,
    merchant_id: &str,
    tran_id: &str,
    amount: &str,
    items: &str,
    payment_option: &str,
) -> String {
    format!("{req_time}{merchant_id}{tran_id}{amount}{items}{payment_option}")
}

/// HMAC-SHA512 of `message`, base64 encoded.
///
/// # Errors
///
/// Returns `SigningError::InvalidKey` if the key is rejected.
pub fn sign(api_key: &SecretString, message: &str) -> Result<String, SigningError> {
    let mut mac = Hmac::<Sha512>::new_from_slice(api_key.expose_secret().as_bytes())
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// `<frontend>/<path>` without doubling slashes.
fn callback_url(frontend_url: &Url, path: &str) -> Result<Url, url::ParseError> {
    let base = frontend_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{path}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn configured() -> PaywaySigner {
        let config = PaywayConfig {
            merchant_id: Some("ec000123".to_string()),
            api_key: Some(SecretString::from("9f8c2a7e41b03d6f5e1a8c4b2d7f0e93")),
        };
        PaywaySigner::new(&config, &Url::parse("https://hotel.example.com").unwrap()).unwrap()
    }

    fn order_id() -> OrderId {
        "3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60".parse().unwrap()
    }

    #[test]
    fn test_item_summary_shape() {
        let items = encode_item_summary("12.00").unwrap();
        let decoded = String::from_utf8(STANDARD.decode(items).unwrap()).unwrap();
        assert_eq!(
            decoded,
            r#"[{"name":"Hotel Order","quantity":"1","price":"12.00"}]"#
        );
    }

    #[test]
    fn test_canonical_string_field_order() {
        assert_eq!(
            canonical_string("1", "m", "t", "12.00", "aXRlbXM=", "abapay_khqr"),
            "1mt12.00aXRlbXM=abapay_khqr"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let key = SecretString::from("key");
        let first = sign(&key, "message").unwrap();
        let second = sign(&key, "message").unwrap();
        assert_eq!(first, second);
        // 64-byte digest, padded base64
        assert_eq!(STANDARD.decode(&first).unwrap().len(), 64);
        assert_ne!(first, sign(&key, "message2").unwrap());
    }

    #[test]
    fn test_sign_known_vector() {
        // RFC 4231 test case 2, HMAC-SHA-512
        let key = SecretString::from("Jefe");
        let digest = sign(&key, "what do ya want for nothing?").unwrap();
        let expected = "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737";
        assert_eq!(hex::encode(STANDARD.decode(digest).unwrap()), expected);
    }

    #[test]
    fn test_payment_request_signed_payload() {
        let signer = configured();
        let at = Utc.timestamp_millis_opt(1_760_000_123_456).unwrap();
        let request = signer
            .payment_request(order_id(), Decimal::new(1200, 2), at)
            .unwrap();

        let PaymentRequest::Checkout(payload) = request else {
            panic!("expected a signed payload");
        };
        assert_eq!(payload.req_time, "1760000123456");
        assert_eq!(payload.tran_id, "3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60");
        assert_eq!(payload.amount, "12.00");
        assert_eq!(payload.payment_option, "abapay_khqr");
        assert_eq!(
            payload.return_url,
            "https://hotel.example.com/checkout/success"
        );
        assert_eq!(payload.continue_success_url, "https://hotel.example.com/admin");

        let expected = sign(
            &SecretString::from("9f8c2a7e41b03d6f5e1a8c4b2d7f0e93"),
            &canonical_string(
                &payload.req_time,
                "ec000123",
                &payload.tran_id,
                "12.00",
                &payload.items,
                "abapay_khqr",
            ),
        )
        .unwrap();
        assert_eq!(payload.hash, expected);
    }

    #[test]
    fn test_whole_dollar_total_has_two_decimals() {
        let signer = configured();
        let request = signer
            .payment_request(order_id(), Decimal::from(9), Utc::now())
            .unwrap();
        let PaymentRequest::Checkout(payload) = request else {
            panic!("expected a signed payload");
        };
        assert_eq!(payload.amount, "9.00");
    }

    #[test]
    fn test_missing_credentials_simulates() {
        let config = PaywayConfig {
            merchant_id: Some("ec000123".to_string()),
            api_key: None,
        };
        let signer =
            PaywaySigner::new(&config, &Url::parse("http://localhost:5173").unwrap()).unwrap();
        assert!(!signer.is_configured());

        let request = signer
            .payment_request(order_id(), Decimal::new(1200, 2), Utc::now())
            .unwrap();
        assert!(request.is_simulated());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["simulated"], true);
        assert_eq!(json["orderId"], "3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60");
    }

    #[test]
    fn test_debug_hides_key() {
        let output = format!("{:?}", configured());
        assert!(output.contains("ec000123"));
        assert!(!output.contains("9f8c2a7e41b03d6f5e1a8c4b2d7f0e93"));
    }
}
