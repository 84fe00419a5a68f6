use crate::entities::{EnrollmentStatus, enrollment_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub course_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub enrollment_id: i64,
    pub status: EnrollmentStatus,
    pub order_id: Option<String>,
    /// Token for the gateway's popup; absent for free courses.
    pub payment_token: Option<String>,
    pub redirect_url: Option<String>,
    pub client_key: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentStatusQuery {
    pub enrollment_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub enrollment_id: i64,
    pub course_id: i64,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentStatusRequest {
    pub status: EnrollmentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub course_title: Option<String>,
    pub status: EnrollmentStatus,
    pub amount: i64,
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of the checkout and payment pages once every precondition holds.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPageResponse {
    pub course_id: i64,
    pub course_title: String,
    pub thumbnail_url: Option<String>,
    pub price: i64,
    pub currency: String,
    pub client_key: String,
    pub snap_script_url: String,
    pub pending_enrollment: Option<EnrollmentResponse>,
    /// Set on the payment page once a gateway transaction exists.
    pub payment_token: Option<String>,
    pub payment_url: Option<String>,
}

impl EnrollmentResponse {
    pub fn from_model(m: enrollment_entity::Model, course_title: Option<String>) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            course_id: m.course_id,
            course_title,
            status: m.status,
            amount: m.amount,
            order_id: m.order_id,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<&enrollment_entity::Model> for PaymentStatusResponse {
    fn from(m: &enrollment_entity::Model) -> Self {
        Self {
            enrollment_id: m.id,
            course_id: m.course_id,
            status: m.status,
        }
    }
}
