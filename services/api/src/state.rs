//! Application state shared across handlers

use std::sync::Arc;

use scheduling::{BookingService, ClassSessionService};
use sqlx::PgPool;

use crate::config::Settings;
use crate::notifications::{NotificationService, PushGateway, TracingPushGateway};
use crate::repositories::{
    BookingRepository, ClassSessionRepository, CourseRepository, DirectoryRepository,
    FaqRepository, NotificationRepository, PaymentRepository, ProgressReportRepository,
    ReviewRepository, UserRepository,
};

pub type Sessions = ClassSessionService<ClassSessionRepository, DirectoryRepository>;
pub type Bookings = BookingService<BookingRepository, ClassSessionRepository, DirectoryRepository>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub user_repository: UserRepository,
    pub course_repository: CourseRepository,
    pub payment_repository: PaymentRepository,
    pub progress_report_repository: ProgressReportRepository,
    pub review_repository: ReviewRepository,
    pub faq_repository: FaqRepository,
    pub sessions: Sessions,
    pub bookings: Bookings,
    pub notifications: NotificationService,
}

impl AppState {
    /// Wire every repository and service onto `pool`
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        Self::with_gateway(pool, settings, Arc::new(TracingPushGateway))
    }

    pub fn with_gateway(pool: PgPool, settings: Settings, gateway: Arc<dyn PushGateway>) -> Self {
        let user_repository = UserRepository::new(pool.clone());
        let session_repository = ClassSessionRepository::new(pool.clone());
        let directory = DirectoryRepository::new(pool.clone());

        Self {
            sessions: ClassSessionService::new(session_repository.clone(), directory.clone()),
            bookings: BookingService::new(
                BookingRepository::new(pool.clone()),
                session_repository,
                directory,
            ),
            notifications: NotificationService::new(
                NotificationRepository::new(pool.clone()),
                user_repository.clone(),
                gateway,
            ),
            user_repository,
            course_repository: CourseRepository::new(pool.clone()),
            payment_repository: PaymentRepository::new(pool.clone()),
            progress_report_repository: ProgressReportRepository::new(pool.clone()),
            review_repository: ReviewRepository::new(pool.clone()),
            faq_repository: FaqRepository::new(pool.clone()),
            settings: Arc::new(settings),
            db_pool: pool,
        }
    }
}
