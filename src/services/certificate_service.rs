use crate::entities::{
    EnrollmentStatus, certificate_entity as cert, course_entity as course,
    enrollment_entity as enrollment, student_profile_entity as student,
    teacher_profile_entity as teacher, user_entity as users,
};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::external::StorageService;
use crate::models::*;
use crate::services::access::require_student;
use crate::utils::generate_unique_certificate_number;
use crate::utils::pdf::{Font, PdfPage};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct CertificateDocument<'a> {
    pub student_name: &'a str,
    pub course_title: &'a str,
    pub teacher_name: Option<&'a str>,
    pub issued_at: DateTime<Utc>,
    pub certificate_number: &'a str,
}

pub fn render_certificate(doc: &CertificateDocument<'_>) -> Vec<u8> {
    let mut page = PdfPage::a4_landscape()
        .border(24.0)
        .centered_text(Font::Bold, 36.0, 470.0, "Certificate of Completion")
        .centered_text(Font::Regular, 16.0, 410.0, "This certifies that")
        .centered_text(Font::Bold, 30.0, 360.0, doc.student_name)
        .centered_text(Font::Regular, 16.0, 310.0, "has successfully completed the course")
        .centered_text(Font::Bold, 22.0, 270.0, doc.course_title);

    if let Some(name) = doc.teacher_name {
        page = page.centered_text(Font::Regular, 14.0, 220.0, &format!("Instructor: {name}"));
    }

    page.text(
        Font::Regular,
        12.0,
        60.0,
        70.0,
        &format!("Issued on {}", doc.issued_at.format("%B %-d, %Y")),
    )
    .text(
        Font::Regular,
        12.0,
        560.0,
        70.0,
        &format!("Certificate No. {}", doc.certificate_number),
    )
    .render()
}

fn certificate_key() -> String {
    format!("certificates/{}.pdf", Uuid::new_v4())
}

#[derive(Clone)]
pub struct CertificateService {
    pool: Arc<DatabaseConnection>,
    storage: StorageService,
}

impl CertificateService {
    pub fn new(pool: Arc<DatabaseConnection>, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    async fn owned_certificate(
        &self,
        user_id: i64,
        certificate_id: i64,
    ) -> AppResult<(cert::Model, student::Model)> {
        let found = cert::Entity::find_by_id(certificate_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;
        let profile = require_student(self.pool.as_ref(), user_id).await?;
        if profile.id != found.student_id {
            return Err(AppError::Forbidden);
        }
        Ok((found, profile))
    }

    async fn find_issued(&self, student_id: i64, course_id: i64) -> AppResult<Option<cert::Model>> {
        Ok(cert::Entity::find()
            .filter(cert::Column::StudentId.eq(student_id))
            .filter(cert::Column::CourseId.eq(course_id))
            .one(self.pool.as_ref())
            .await?)
    }

    /// Renders the PDF for a certificate and uploads it under a fresh key.
    async fn render_and_upload(
        &self,
        profile: &student::Model,
        course_id: i64,
        certificate_number: &str,
        issued_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let student_user = users::Entity::find_by_id(profile.user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let found_course = course::Entity::find_by_id(course_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
        let teacher_name = match teacher::Entity::find_by_id(found_course.teacher_id)
            .one(self.pool.as_ref())
            .await?
        {
            Some(t) => users::Entity::find_by_id(t.user_id)
                .one(self.pool.as_ref())
                .await?
                .map(|u| u.name),
            None => None,
        };

        let bytes = render_certificate(&CertificateDocument {
            student_name: &student_user.name,
            course_title: &found_course.title,
            teacher_name: teacher_name.as_deref(),
            issued_at,
            certificate_number,
        });

        self.storage
            .put_object(&certificate_key(), "application/pdf", bytes)
            .await
    }

    /// Issues the certificate for a completed enrollment, or returns the one already issued.
    pub async fn issue(
        &self,
        user_id: i64,
        request: IssueCertificateRequest,
    ) -> AppResult<CertificateResponse> {
        let profile = require_student(self.pool.as_ref(), user_id).await?;

        let completed = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(profile.id))
            .filter(enrollment::Column::CourseId.eq(request.course_id))
            .one(self.pool.as_ref())
            .await?
            .filter(|e| e.status == EnrollmentStatus::Completed)
            .ok_or_else(|| {
                AppError::PermissionDenied("Course purchase is not completed".to_string())
            })?;

        if let Some(existing) = self.find_issued(profile.id, request.course_id).await? {
            return Ok(CertificateResponse::from(existing));
        }

        let issued_at = Utc::now();
        let number = generate_unique_certificate_number(self.pool.as_ref()).await?;
        let pdf_url = self
            .render_and_upload(&profile, request.course_id, &number, issued_at)
            .await?;

        let inserted = cert::ActiveModel {
            student_id: Set(profile.id),
            course_id: Set(request.course_id),
            enrollment_id: Set(completed.id),
            certificate_number: Set(number),
            pdf_url: Set(Some(pdf_url)),
            issued_at: Set(Some(issued_at)),
            updated_at: Set(Some(issued_at)),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await;
        let created = match inserted {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => {
                // a concurrent request for the same course won the insert
                let winner = self.find_issued(profile.id, request.course_id).await?;
                return match winner {
                    Some(w) => Ok(CertificateResponse::from(w)),
                    None => Err(AppError::from_insert(e, "Certificate already issued")),
                };
            }
            Err(e) => return Err(e.into()),
        };

        log::info!(
            "Certificate issued: id={}, number={}, student_id={}",
            created.id,
            created.certificate_number,
            profile.id
        );
        Ok(CertificateResponse::from(created))
    }

    pub async fn list(&self, user_id: i64) -> AppResult<Vec<CertificateResponse>> {
        let profile = require_student(self.pool.as_ref(), user_id).await?;
        let certificates = cert::Entity::find()
            .filter(cert::Column::StudentId.eq(profile.id))
            .order_by_desc(cert::Column::IssuedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(certificates.into_iter().map(CertificateResponse::from).collect())
    }

    pub async fn get(&self, user_id: i64, certificate_id: i64) -> AppResult<CertificateResponse> {
        let (found, _) = self.owned_certificate(user_id, certificate_id).await?;
        Ok(CertificateResponse::from(found))
    }

    /// Re-renders the PDF and overwrites the stored URL. The previous object is left in place.
    pub async fn regenerate(
        &self,
        user_id: i64,
        certificate_id: i64,
    ) -> AppResult<CertificateResponse> {
        let (found, profile) = self.owned_certificate(user_id, certificate_id).await?;

        let issued_at = found.issued_at.unwrap_or_else(Utc::now);
        let pdf_url = self
            .render_and_upload(&profile, found.course_id, &found.certificate_number, issued_at)
            .await?;

        let mut active: cert::ActiveModel = found.into();
        active.pdf_url = Set(Some(pdf_url));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.pool.as_ref()).await?;

        log::info!("Certificate regenerated: id={certificate_id}");
        Ok(CertificateResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_render_certificate_contains_details() {
        let issued_at = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
        let bytes = render_certificate(&CertificateDocument {
            student_name: "Ada Lovelace",
            course_title: "Analytical Engines (Part 1)",
            teacher_name: Some("Charles Babbage"),
            issued_at,
            certificate_number: "CERT-20250901-ABCDEF",
        });
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("(Ada Lovelace)"));
        assert!(text.contains("Analytical Engines \\(Part 1\\)"));
        assert!(text.contains("Instructor: Charles Babbage"));
        assert!(text.contains("Issued on September 1, 2025"));
        assert!(text.contains("CERT-20250901-ABCDEF"));
    }

    #[test]
    fn test_certificate_keys_are_unique_pdfs() {
        let a = certificate_key();
        let b = certificate_key();
        assert!(a.starts_with("certificates/") && a.ends_with(".pdf"));
        assert_ne!(a, b);
    }

    fn service(db: DatabaseConnection) -> CertificateService {
        CertificateService::new(Arc::new(db), StorageService::new(StorageConfig::default()))
    }

    fn certificate_row(student_id: i64) -> cert::Model {
        cert::Model {
            id: 8,
            student_id,
            course_id: 5,
            enrollment_id: 42,
            certificate_number: "CERT-20250901-ABCDEF".to_string(),
            pdf_url: Some("http://localhost:9000/learnhub/certificates/a.pdf".to_string()),
            issued_at: None,
            updated_at: None,
        }
    }

    fn student_row() -> student::Model {
        student::Model {
            id: 3,
            user_id: 1,
            created_at: None,
        }
    }

    fn enrollment_row(status: EnrollmentStatus) -> enrollment::Model {
        enrollment::Model {
            id: 42,
            student_id: 3,
            course_id: 5,
            status,
            amount: 150_000,
            order_id: Some("ENR-42-1700000000".to_string()),
            payment_token: None,
            payment_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[actix_web::test]
    async fn test_regenerate_someone_elses_certificate_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![certificate_row(99)]])
            .append_query_results([vec![student_row()]])
            .into_connection();

        let result = service(db).regenerate(1, 8).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[actix_web::test]
    async fn test_issue_without_completed_purchase_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_row()]])
            .append_query_results([vec![enrollment_row(EnrollmentStatus::Pending)]])
            .into_connection();

        let result = service(db)
            .issue(1, IssueCertificateRequest { course_id: 5 })
            .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[actix_web::test]
    async fn test_issue_twice_returns_existing_certificate() {
        // no further rows are queued, so rendering a new PDF would fail
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_row()]])
            .append_query_results([vec![enrollment_row(EnrollmentStatus::Completed)]])
            .append_query_results([vec![certificate_row(3)]])
            .into_connection();

        let issued = service(db)
            .issue(1, IssueCertificateRequest { course_id: 5 })
            .await
            .unwrap();

        assert_eq!(issued.id, 8);
        assert_eq!(issued.certificate_number, "CERT-20250901-ABCDEF");
    }
}
