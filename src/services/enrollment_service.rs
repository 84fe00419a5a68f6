use crate::entities::{
    EnrollmentStatus, course_entity as course, enrollment_entity as enrollment,
    student_profile_entity as student, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutOrder, PaymentGateway, PaymentNotification, map_transaction_status};
use crate::models::*;
use crate::services::access::{find_student, owned_course, require_student};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the checkout and payment pages need once the guard lets the request through.
#[derive(Debug)]
pub struct CheckoutContext {
    pub user_id: i64,
    pub student: student::Model,
    pub course: course::Model,
    pub enrollment: Option<enrollment::Model>,
}

/// Outcome of the checkout guard. Page routes never surface errors for a missing
/// precondition; they send the browser somewhere useful instead.
#[derive(Debug)]
pub enum CheckoutGate {
    Redirect(String),
    Allow(Box<CheckoutContext>),
}

#[derive(Debug)]
pub enum PageOutcome {
    Redirect(String),
    Render(CheckoutPageResponse),
}

pub fn signin_redirect(path: &str) -> String {
    format!("/auth/signin?callbackUrl={}", urlencoding::encode(path))
}

pub fn onboarding_redirect(path: &str) -> String {
    format!("/onboarding?callbackUrl={}", urlencoding::encode(path))
}

pub fn order_id_for(enrollment_id: i64, timestamp: i64) -> String {
    format!("ENR-{enrollment_id}-{timestamp}")
}

/// Status to store after a gateway notification, or `None` when nothing changes.
/// A completed purchase is only undone by a cancellation (refund).
pub fn next_status(
    current: EnrollmentStatus,
    incoming: EnrollmentStatus,
) -> Option<EnrollmentStatus> {
    if current == incoming {
        return None;
    }
    if current == EnrollmentStatus::Completed && incoming != EnrollmentStatus::Cancelled {
        return None;
    }
    Some(incoming)
}

/// The gateway transaction still open on a pending enrollment, if its amount matches
/// the current price.
fn open_transaction(existing: &enrollment::Model, price: i64) -> Option<CheckoutResponse> {
    if existing.status != EnrollmentStatus::Pending || existing.amount != price {
        return None;
    }
    match (&existing.order_id, &existing.payment_token, &existing.payment_url) {
        (Some(order_id), Some(token), Some(url)) => Some(CheckoutResponse {
            enrollment_id: existing.id,
            status: existing.status,
            order_id: Some(order_id.clone()),
            payment_token: Some(token.clone()),
            redirect_url: Some(url.clone()),
            client_key: String::new(),
        }),
        _ => None,
    }
}

#[derive(Clone)]
pub struct EnrollmentService {
    pool: Arc<DatabaseConnection>,
    gateway: PaymentGateway,
    public_base_url: String,
}

impl EnrollmentService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        gateway: PaymentGateway,
        public_base_url: String,
    ) -> Self {
        Self {
            pool,
            gateway,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn find_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> AppResult<Option<enrollment::Model>> {
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(self.pool.as_ref())
            .await?)
    }

    /// The one guard in front of both checkout pages: session, student profile,
    /// published course and no completed purchase, checked in that order.
    pub async fn checkout_gate(
        &self,
        user_id: Option<i64>,
        course_id: i64,
        path: &str,
    ) -> AppResult<CheckoutGate> {
        let Some(user_id) = user_id else {
            return Ok(CheckoutGate::Redirect(signin_redirect(path)));
        };

        let Some(student) = find_student(self.pool.as_ref(), user_id).await? else {
            return Ok(CheckoutGate::Redirect(onboarding_redirect(path)));
        };

        let course = match course::Entity::find_by_id(course_id).one(self.pool.as_ref()).await? {
            Some(c) if c.is_published => c,
            _ => return Ok(CheckoutGate::Redirect("/courses".to_string())),
        };

        let enrollment = self.find_enrollment(student.id, course.id).await?;
        if enrollment
            .as_ref()
            .is_some_and(|e| e.status == EnrollmentStatus::Completed)
        {
            return Ok(CheckoutGate::Redirect(format!("/courses/{}", course.id)));
        }

        Ok(CheckoutGate::Allow(Box::new(CheckoutContext {
            user_id,
            student,
            course,
            enrollment,
        })))
    }

    fn page_response(&self, context: CheckoutContext) -> CheckoutPageResponse {
        let course_title = context.course.title.clone();
        let (payment_token, payment_url) = match &context.enrollment {
            Some(e) => (e.payment_token.clone(), e.payment_url.clone()),
            None => (None, None),
        };

        CheckoutPageResponse {
            course_id: context.course.id,
            course_title: course_title.clone(),
            thumbnail_url: context.course.thumbnail_url,
            price: context.course.price,
            currency: self.gateway.currency().to_string(),
            client_key: self.gateway.client_key().to_string(),
            snap_script_url: self.gateway.snap_script_url(),
            pending_enrollment: context
                .enrollment
                .map(|e| EnrollmentResponse::from_model(e, Some(course_title))),
            payment_token,
            payment_url,
        }
    }

    pub async fn checkout_page(
        &self,
        user_id: Option<i64>,
        course_id: i64,
        path: &str,
    ) -> AppResult<PageOutcome> {
        match self.checkout_gate(user_id, course_id, path).await? {
            CheckoutGate::Redirect(location) => Ok(PageOutcome::Redirect(location)),
            CheckoutGate::Allow(context) => Ok(PageOutcome::Render(self.page_response(*context))),
        }
    }

    /// Same guard as the checkout page; without an open gateway transaction the
    /// browser is sent back to checkout.
    pub async fn payment_page(
        &self,
        user_id: Option<i64>,
        course_id: i64,
        path: &str,
    ) -> AppResult<PageOutcome> {
        match self.checkout_gate(user_id, course_id, path).await? {
            CheckoutGate::Redirect(location) => Ok(PageOutcome::Redirect(location)),
            CheckoutGate::Allow(context) => {
                let has_transaction = context
                    .enrollment
                    .as_ref()
                    .is_some_and(|e| e.payment_token.is_some());
                if !has_transaction {
                    return Ok(PageOutcome::Redirect(format!("/checkout/{course_id}")));
                }
                Ok(PageOutcome::Render(self.page_response(*context)))
            }
        }
    }

    pub async fn create_checkout(
        &self,
        user_id: i64,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutResponse> {
        let student = require_student(self.pool.as_ref(), user_id).await?;
        let course = course::Entity::find_by_id(request.course_id)
            .one(self.pool.as_ref())
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let existing = self.find_enrollment(student.id, course.id).await?;
        if existing
            .as_ref()
            .is_some_and(|e| e.status == EnrollmentStatus::Completed)
        {
            return Err(AppError::ValidationError(
                "Course already purchased".to_string(),
            ));
        }

        // an open transaction stays payable; minting another would orphan its order id
        if let Some(open) = existing.as_ref().and_then(|e| open_transaction(e, course.price)) {
            log::info!(
                "Checkout reused: enrollment_id={}, order_id={}",
                open.enrollment_id,
                open.order_id.as_deref().unwrap_or_default()
            );
            return Ok(CheckoutResponse {
                client_key: self.gateway.client_key().to_string(),
                ..open
            });
        }

        let now = Utc::now();
        let initial_status = if course.price == 0 {
            EnrollmentStatus::Completed
        } else {
            EnrollmentStatus::Pending
        };

        let saved = match existing {
            Some(e) => {
                let mut active: enrollment::ActiveModel = e.into();
                active.status = Set(initial_status);
                active.amount = Set(course.price);
                active.payment_token = Set(None);
                active.payment_url = Set(None);
                active.updated_at = Set(Some(now));
                active.update(self.pool.as_ref()).await?
            }
            None => enrollment::ActiveModel {
                student_id: Set(student.id),
                course_id: Set(course.id),
                status: Set(initial_status),
                amount: Set(course.price),
                ..Default::default()
            }
            .insert(self.pool.as_ref())
            .await
            .map_err(|e| AppError::from_insert(e, "Checkout already in progress"))?,
        };

        if initial_status == EnrollmentStatus::Completed {
            log::info!(
                "Free enrollment completed: enrollment_id={}, course_id={}",
                saved.id,
                course.id
            );
            return Ok(CheckoutResponse {
                enrollment_id: saved.id,
                status: saved.status,
                order_id: None,
                payment_token: None,
                redirect_url: None,
                client_key: self.gateway.client_key().to_string(),
            });
        }

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let order_id = order_id_for(saved.id, now.timestamp());
        let transaction = self
            .gateway
            .create_transaction(&CheckoutOrder {
                order_id: &order_id,
                amount: course.price,
                course_id: course.id,
                course_title: &course.title,
                customer_name: &user.name,
                customer_email: &user.email,
                finish_url: format!("{}/payment/{}", self.public_base_url, course.id),
            })
            .await?;

        let mut active: enrollment::ActiveModel = saved.into();
        active.order_id = Set(Some(order_id.clone()));
        active.payment_token = Set(Some(transaction.token.clone()));
        active.payment_url = Set(Some(transaction.redirect_url.clone()));
        active.updated_at = Set(Some(Utc::now()));
        let saved = active.update(self.pool.as_ref()).await?;

        log::info!(
            "Checkout created: enrollment_id={}, order_id={order_id}, amount={}",
            saved.id,
            saved.amount
        );

        Ok(CheckoutResponse {
            enrollment_id: saved.id,
            status: saved.status,
            order_id: Some(order_id),
            payment_token: Some(transaction.token),
            redirect_url: Some(transaction.redirect_url),
            client_key: self.gateway.client_key().to_string(),
        })
    }

    /// Locally stored status only; the gateway reports changes through the webhook.
    pub async fn payment_status(
        &self,
        user_id: i64,
        enrollment_id: i64,
    ) -> AppResult<PaymentStatusResponse> {
        let found = enrollment::Entity::find_by_id(enrollment_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        let owns = find_student(self.pool.as_ref(), user_id)
            .await?
            .is_some_and(|s| s.id == found.student_id);
        if !owns {
            return Err(AppError::Forbidden);
        }

        Ok(PaymentStatusResponse::from(&found))
    }

    pub async fn list_my_enrollments(&self, user_id: i64) -> AppResult<Vec<EnrollmentResponse>> {
        let Some(student) = find_student(self.pool.as_ref(), user_id).await? else {
            return Ok(Vec::new());
        };

        let enrollments = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student.id))
            .order_by_desc(enrollment::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        if enrollments.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = enrollments.iter().map(|e| e.course_id).collect();
        let titles: HashMap<i64, String> = course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();

        Ok(enrollments
            .into_iter()
            .map(|e| {
                let title = titles.get(&e.course_id).cloned();
                EnrollmentResponse::from_model(e, title)
            })
            .collect())
    }

    /// Manual override by the teacher who owns the course.
    pub async fn update_status(
        &self,
        user_id: i64,
        enrollment_id: i64,
        request: UpdateEnrollmentStatusRequest,
    ) -> AppResult<EnrollmentResponse> {
        let found = enrollment::Entity::find_by_id(enrollment_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;
        let owned = owned_course(self.pool.as_ref(), user_id, found.course_id).await?;

        let mut active: enrollment::ActiveModel = found.into();
        active.status = Set(request.status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.pool.as_ref()).await?;

        log::info!(
            "Enrollment status set manually: enrollment_id={enrollment_id}, status={}",
            updated.status
        );
        Ok(EnrollmentResponse::from_model(updated, Some(owned.title)))
    }

    pub async fn handle_notification(
        &self,
        notification: PaymentNotification,
    ) -> AppResult<PaymentStatusResponse> {
        self.gateway.verify_notification(&notification)?;

        let found = enrollment::Entity::find()
            .filter(enrollment::Column::OrderId.eq(notification.order_id.clone()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let incoming = map_transaction_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );
        let Some(status) = incoming.and_then(|s| next_status(found.status, s)) else {
            log::info!(
                "Payment notification ignored: order_id={}, transaction_status={}, current={}",
                notification.order_id,
                notification.transaction_status,
                found.status
            );
            return Ok(PaymentStatusResponse::from(&found));
        };

        let mut active: enrollment::ActiveModel = found.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.pool.as_ref()).await?;

        log::info!(
            "Payment notification applied: order_id={}, transaction_status={}, status={}",
            notification.order_id,
            notification.transaction_status,
            updated.status
        );
        Ok(PaymentStatusResponse::from(&updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentConfig;
    use crate::external::notification_signature;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: DatabaseConnection) -> EnrollmentService {
        EnrollmentService::new(
            Arc::new(db),
            PaymentGateway::new(PaymentConfig::default()),
            "http://localhost:3000/".to_string(),
        )
    }

    fn student_profile(id: i64) -> student::Model {
        student::Model {
            id,
            user_id: 1,
            created_at: None,
        }
    }

    fn published_course(id: i64) -> course::Model {
        course::Model {
            id,
            teacher_id: 2,
            category_id: None,
            title: "Async Rust".to_string(),
            description: Some("Futures and executors".to_string()),
            price: 150_000,
            thumbnail_url: None,
            is_published: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn enrollment_row(student_id: i64, status: EnrollmentStatus) -> enrollment::Model {
        enrollment::Model {
            id: 42,
            student_id,
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
    async fn test_guard_without_session_redirects_to_signin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let gate = service(db)
            .checkout_gate(None, 5, "/checkout/5?coupon=x")
            .await
            .unwrap();

        match gate {
            CheckoutGate::Redirect(location) => assert_eq!(
                location,
                "/auth/signin?callbackUrl=%2Fcheckout%2F5%3Fcoupon%3Dx"
            ),
            CheckoutGate::Allow(_) => panic!("expected a redirect"),
        }
    }

    #[actix_web::test]
    async fn test_guard_without_student_profile_redirects_to_onboarding() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<student::Model>::new()])
            .into_connection();

        let gate = service(db).checkout_gate(Some(1), 5, "/checkout/5").await.unwrap();

        assert!(matches!(
            gate,
            CheckoutGate::Redirect(ref l) if l == "/onboarding?callbackUrl=%2Fcheckout%2F5"
        ));
    }

    #[actix_web::test]
    async fn test_guard_with_completed_enrollment_redirects_to_course() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_profile(3)]])
            .append_query_results([vec![published_course(5)]])
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Completed)]])
            .into_connection();

        let outcome = service(db).payment_page(Some(1), 5, "/payment/5").await.unwrap();

        assert!(matches!(outcome, PageOutcome::Redirect(ref l) if l == "/courses/5"));
    }

    #[actix_web::test]
    async fn test_guard_allows_pending_enrollment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_profile(3)]])
            .append_query_results([vec![published_course(5)]])
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Pending)]])
            .into_connection();

        let outcome = service(db).checkout_page(Some(1), 5, "/checkout/5").await.unwrap();

        match outcome {
            PageOutcome::Render(page) => {
                assert_eq!(page.course_id, 5);
                assert_eq!(page.price, 150_000);
                assert_eq!(page.pending_enrollment.map(|e| e.id), Some(42));
            }
            PageOutcome::Redirect(l) => panic!("unexpected redirect to {l}"),
        }
    }

    #[actix_web::test]
    async fn test_payment_status_of_someone_elses_enrollment_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![enrollment_row(9, EnrollmentStatus::Pending)]])
            .append_query_results([vec![student_profile(3)]])
            .into_connection();

        let result = service(db).payment_status(1, 42).await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[actix_web::test]
    async fn test_payment_status_returns_stored_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Pending)]])
            .append_query_results([vec![student_profile(3)]])
            .into_connection();

        let status = service(db).payment_status(1, 42).await.unwrap();

        assert_eq!(status.status, EnrollmentStatus::Pending);
        assert_eq!(status.course_id, 5);
    }

    #[test]
    fn test_next_status() {
        use EnrollmentStatus::*;
        assert_eq!(next_status(Pending, Completed), Some(Completed));
        assert_eq!(next_status(Pending, Pending), None);
        assert_eq!(next_status(Completed, Pending), None);
        assert_eq!(next_status(Completed, Failed), None);
        assert_eq!(next_status(Completed, Cancelled), Some(Cancelled));
        assert_eq!(next_status(Failed, Pending), Some(Pending));
    }

    #[test]
    fn test_order_id_format() {
        assert_eq!(order_id_for(42, 1_700_000_000), "ENR-42-1700000000");
    }

    fn notification(order_id: &str, transaction_status: &str) -> PaymentNotification {
        PaymentNotification {
            order_id: order_id.to_string(),
            status_code: "200".to_string(),
            gross_amount: "150000.00".to_string(),
            // the default config has an empty server key
            signature_key: notification_signature(order_id, "200", "150000.00", ""),
            transaction_status: transaction_status.to_string(),
            fraud_status: None,
            payment_type: Some("bank_transfer".to_string()),
            transaction_id: None,
        }
    }

    #[actix_web::test]
    async fn test_checkout_of_free_course_completes_immediately() {
        let mut free = published_course(5);
        free.price = 0;
        let mut completed = enrollment_row(3, EnrollmentStatus::Completed);
        completed.amount = 0;
        completed.order_id = None;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_profile(3)]])
            .append_query_results([vec![free]])
            .append_query_results([Vec::<enrollment::Model>::new()])
            .append_query_results([vec![completed]])
            .into_connection();

        let response = service(db)
            .create_checkout(1, CheckoutRequest { course_id: 5 })
            .await
            .unwrap();

        assert_eq!(response.status, EnrollmentStatus::Completed);
        assert!(response.payment_token.is_none());
        assert!(response.order_id.is_none());
    }

    #[actix_web::test]
    async fn test_checkout_of_purchased_course_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_profile(3)]])
            .append_query_results([vec![published_course(5)]])
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Completed)]])
            .into_connection();

        let result = service(db)
            .create_checkout(1, CheckoutRequest { course_id: 5 })
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_checkout_without_student_profile_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<student::Model>::new()])
            .into_connection();

        let result = service(db)
            .create_checkout(1, CheckoutRequest { course_id: 5 })
            .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[actix_web::test]
    async fn test_checkout_reuses_open_transaction() {
        let mut pending = enrollment_row(3, EnrollmentStatus::Pending);
        pending.payment_token = Some("snap-token-1".to_string());
        pending.payment_url = Some("https://app.sandbox.midtrans.com/snap/v2/1".to_string());
        // no gateway call and no update are queued: reaching either would fail the test
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_profile(3)]])
            .append_query_results([vec![published_course(5)]])
            .append_query_results([vec![pending]])
            .into_connection();

        let response = service(db)
            .create_checkout(1, CheckoutRequest { course_id: 5 })
            .await
            .unwrap();

        assert_eq!(response.enrollment_id, 42);
        assert_eq!(response.order_id.as_deref(), Some("ENR-42-1700000000"));
        assert_eq!(response.payment_token.as_deref(), Some("snap-token-1"));
    }

    #[test]
    fn test_open_transaction_requires_matching_pending_row() {
        let mut row = enrollment_row(3, EnrollmentStatus::Pending);
        assert!(open_transaction(&row, 150_000).is_none());

        row.payment_token = Some("t".to_string());
        row.payment_url = Some("u".to_string());
        assert!(open_transaction(&row, 150_000).is_some());
        assert!(open_transaction(&row, 99_000).is_none());

        row.status = EnrollmentStatus::Failed;
        assert!(open_transaction(&row, 150_000).is_none());
    }

    #[actix_web::test]
    async fn test_notification_with_bad_signature_is_rejected_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut forged = notification("ENR-42-1700000000", "settlement");
        forged.signature_key = "00".repeat(64);

        let result = service(db).handle_notification(forged).await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[actix_web::test]
    async fn test_notification_for_unknown_order_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<enrollment::Model>::new()])
            .into_connection();

        let result = service(db)
            .handle_notification(notification("ENR-7-1", "settlement"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_settlement_completes_pending_enrollment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Pending)]])
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Completed)]])
            .into_connection();

        let status = service(db)
            .handle_notification(notification("ENR-42-1700000000", "settlement"))
            .await
            .unwrap();

        assert_eq!(status.status, EnrollmentStatus::Completed);
    }

    #[actix_web::test]
    async fn test_late_pending_notification_keeps_completed_enrollment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![enrollment_row(3, EnrollmentStatus::Completed)]])
            .into_connection();

        let status = service(db)
            .handle_notification(notification("ENR-42-1700000000", "pending"))
            .await
            .unwrap();

        assert_eq!(status.status, EnrollmentStatus::Completed);
    }
}
