use crate::entities::certificate_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    pub course_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub id: i64,
    pub course_id: i64,
    pub certificate_number: String,
    pub pdf_url: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<certificate_entity::Model> for CertificateResponse {
    fn from(m: certificate_entity::Model) -> Self {
        let issued_at = m.issued_at.unwrap_or_else(Utc::now);
        Self {
            id: m.id,
            course_id: m.course_id,
            certificate_number: m.certificate_number,
            pdf_url: m.pdf_url,
            issued_at,
            updated_at: m.updated_at.unwrap_or(issued_at),
        }
    }
}
