//! Snap-style hosted checkout gateway (Midtrans API).

use crate::config::PaymentConfig;
use crate::entities::EnrollmentStatus;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use utoipa::ToSchema;

const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com";
const ITEM_NAME_MAX: usize = 50;

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct ItemDetail {
    id: String,
    price: i64,
    quantity: u32,
    name: String,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Callbacks {
    finish: String,
}

#[derive(Debug, Serialize)]
struct SnapTransactionRequest<'a> {
    transaction_details: TransactionDetails<'a>,
    item_details: Vec<ItemDetail>,
    customer_details: CustomerDetails<'a>,
    callbacks: Callbacks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapTransaction {
    pub token: String,
    pub redirect_url: String,
}

/// What the gateway needs to open a hosted checkout for one course.
pub struct CheckoutOrder<'a> {
    pub order_id: &'a str,
    pub amount: i64,
    pub course_id: i64,
    pub course_title: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub finish_url: String,
}

/// HTTP notification posted by the gateway whenever a transaction changes state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Clone)]
pub struct PaymentGateway {
    client: Client,
    config: PaymentConfig,
}

impl PaymentGateway {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> &'static str {
        if self.config.is_production {
            PRODUCTION_BASE_URL
        } else {
            SANDBOX_BASE_URL
        }
    }

    pub fn client_key(&self) -> &str {
        &self.config.client_key
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Browser script that opens the hosted payment popup.
    pub fn snap_script_url(&self) -> String {
        format!("{}/snap/snap.js", self.base_url())
    }

    pub async fn create_transaction(&self, order: &CheckoutOrder<'_>) -> AppResult<SnapTransaction> {
        let url = format!("{}/snap/v1/transactions", self.base_url());

        let body = SnapTransactionRequest {
            transaction_details: TransactionDetails {
                order_id: order.order_id,
                gross_amount: order.amount,
            },
            item_details: vec![ItemDetail {
                id: format!("COURSE-{}", order.course_id),
                price: order.amount,
                quantity: 1,
                name: order.course_title.chars().take(ITEM_NAME_MAX).collect(),
            }],
            customer_details: CustomerDetails {
                first_name: order.customer_name,
                email: order.customer_email,
            },
            callbacks: Callbacks {
                finish: order.finish_url.clone(),
            },
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.server_key, None::<&str>)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            let transaction: SnapTransaction = response.json().await?;
            Ok(transaction)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "failed to create payment transaction: {error_text}"
            )))
        }
    }

    pub fn verify_notification(&self, notification: &PaymentNotification) -> AppResult<()> {
        let expected = notification_signature(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            &self.config.server_key,
        );

        if expected != notification.signature_key.to_ascii_lowercase() {
            return Err(AppError::PermissionDenied(
                "Invalid notification signature".to_string(),
            ));
        }

        Ok(())
    }
}

/// `hex(sha512(order_id + status_code + gross_amount + server_key))`
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Maps a gateway transaction state onto an enrollment status; `None` for states that
/// carry no enrollment change.
pub fn map_transaction_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> Option<EnrollmentStatus> {
    match transaction_status {
        "capture" => match fraud_status {
            Some("challenge") => Some(EnrollmentStatus::Pending),
            Some("deny") => Some(EnrollmentStatus::Failed),
            _ => Some(EnrollmentStatus::Completed),
        },
        "settlement" => Some(EnrollmentStatus::Completed),
        "pending" => Some(EnrollmentStatus::Pending),
        "deny" | "failure" => Some(EnrollmentStatus::Failed),
        "cancel" | "expire" | "refund" | "partial_refund" => Some(EnrollmentStatus::Cancelled),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(is_production: bool) -> PaymentGateway {
        PaymentGateway::new(PaymentConfig {
            server_key: "SB-Mid-server-test".to_string(),
            client_key: "SB-Mid-client-test".to_string(),
            is_production,
            currency: "IDR".to_string(),
        })
    }

    fn notification(signature_key: String) -> PaymentNotification {
        PaymentNotification {
            order_id: "ENR-1-1700000000".to_string(),
            status_code: "200".to_string(),
            gross_amount: "150000.00".to_string(),
            signature_key,
            transaction_status: "settlement".to_string(),
            fraud_status: Some("accept".to_string()),
            payment_type: Some("bank_transfer".to_string()),
            transaction_id: None,
        }
    }

    #[test]
    fn test_base_url_follows_environment() {
        assert_eq!(gateway(false).base_url(), "https://app.sandbox.midtrans.com");
        assert_eq!(gateway(true).base_url(), "https://app.midtrans.com");
        assert_eq!(
            gateway(false).snap_script_url(),
            "https://app.sandbox.midtrans.com/snap/snap.js"
        );
    }

    #[test]
    fn test_signature_is_sha512_hex() {
        let sig = notification_signature("a", "200", "1.00", "key");
        assert_eq!(sig.len(), 128);
        assert_eq!(sig, hex::encode(Sha512::digest(b"a2001.00key")));
    }

    #[test]
    fn test_verify_notification() {
        let gw = gateway(false);
        let good = notification_signature("ENR-1-1700000000", "200", "150000.00", "SB-Mid-server-test");
        assert!(gw.verify_notification(&notification(good)).is_ok());
        assert!(matches!(
            gw.verify_notification(&notification("deadbeef".to_string())),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_map_transaction_status() {
        assert_eq!(
            map_transaction_status("capture", Some("accept")),
            Some(EnrollmentStatus::Completed)
        );
        assert_eq!(
            map_transaction_status("capture", Some("challenge")),
            Some(EnrollmentStatus::Pending)
        );
        assert_eq!(
            map_transaction_status("settlement", None),
            Some(EnrollmentStatus::Completed)
        );
        assert_eq!(
            map_transaction_status("expire", None),
            Some(EnrollmentStatus::Cancelled)
        );
        assert_eq!(map_transaction_status("deny", None), Some(EnrollmentStatus::Failed));
        assert_eq!(map_transaction_status("authorize", None), None);
    }
}
