//! Push notifications
//!
//! Delivery goes through a [`PushGateway`]; every attempt, successful or
//! not, is appended to `notification_logs`. A failing device never stops
//! delivery to the remaining ones.

use std::sync::Arc;

use async_trait::async_trait;
use scheduling::model::{ClassSession, Page, UserRole};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::notification::{
    DeliveryAttempt, DeliveryReport, DeviceToken, NotificationLog, PushMessage,
};
use crate::repositories::{NotificationRepository, UserRepository};

/// Something that can hand a message to a device
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn deliver(&self, token: &DeviceToken, message: &PushMessage) -> anyhow::Result<()>;
}

/// Gateway that only writes deliveries to the log
#[derive(Debug, Default, Clone)]
pub struct TracingPushGateway;

#[async_trait]
impl PushGateway for TracingPushGateway {
    async fn deliver(&self, token: &DeviceToken, message: &PushMessage) -> anyhow::Result<()> {
        info!(
            user_id = %token.user_id,
            token = %token.token,
            title = %message.title,
            "Push delivered"
        );
        Ok(())
    }
}

/// Deliver `message` to every token, collecting one attempt per token
pub async fn deliver_all(
    gateway: &dyn PushGateway,
    tokens: &[DeviceToken],
    message: &PushMessage,
) -> Vec<DeliveryAttempt> {
    let mut attempts = Vec::with_capacity(tokens.len());
    for token in tokens {
        let error = match gateway.deliver(token, message).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user_id = %token.user_id, error = %e, "Push delivery failed");
                Some(e.to_string())
            }
        };
        attempts.push(DeliveryAttempt {
            user_id: token.user_id,
            user_role: token.user_role,
            token: token.token.clone(),
            error,
        });
    }
    attempts
}

/// Device registration and message fan-out
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    users: UserRepository,
    gateway: Arc<dyn PushGateway>,
}

impl NotificationService {
    pub fn new(
        repo: NotificationRepository,
        users: UserRepository,
        gateway: Arc<dyn PushGateway>,
    ) -> Self {
        Self {
            repo,
            users,
            gateway,
        }
    }

    /// Register a device for a user; the role is taken from the user record
    pub async fn register_token(
        &self,
        user_id: Uuid,
        token: &str,
        device_info: Option<&str>,
    ) -> ApiResult<DeviceToken> {
        if token.trim().is_empty() {
            return Err(ApiError::Validation("Token is required".to_string()));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("user", user_id))?;

        let registered = self
            .repo
            .upsert_token(user.id, user.role, token, device_info)
            .await?;

        info!(%user_id, role = %user.role, "Device token registered");
        Ok(registered)
    }

    pub async fn deactivate_token(&self, token: &str) -> ApiResult<()> {
        if !self.repo.deactivate_token(token).await? {
            return Err(ApiError::NotFound("device token not found".to_string()));
        }
        Ok(())
    }

    pub async fn tokens_for_user(&self, user_id: Uuid) -> ApiResult<Vec<DeviceToken>> {
        Ok(self.repo.active_tokens_for_user(user_id).await?)
    }

    pub async fn send_to_user(
        &self,
        user_id: Uuid,
        message: &PushMessage,
    ) -> ApiResult<DeliveryReport> {
        let tokens = self.repo.active_tokens_for_user(user_id).await?;
        self.send(&tokens, message).await
    }

    pub async fn send_to_role(
        &self,
        role: UserRole,
        message: &PushMessage,
    ) -> ApiResult<DeliveryReport> {
        let tokens = self.repo.active_tokens_for_role(role).await?;
        self.send(&tokens, message).await
    }

    pub async fn logs_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> ApiResult<Vec<NotificationLog>> {
        Ok(self.repo.logs_for_user(user_id, page).await?)
    }

    /// Tell the instructor of `session` about a new booking
    ///
    /// Failures are logged and swallowed; the booking already exists.
    pub async fn notify_instructor_of_booking(&self, session: &ClassSession, booking_id: Uuid) {
        let message = PushMessage {
            title: "New booking".to_string(),
            body: format!(
                "A student booked your class on {}",
                session.start_at.format("%Y-%m-%d %H:%M UTC")
            ),
            data: Some(serde_json::json!({
                "booking_id": booking_id,
                "class_session_id": session.id,
            })),
        };

        if let Err(e) = self.send_to_user(session.instructor_id, &message).await {
            warn!(%booking_id, error = %e, "Failed to notify instructor of booking");
        }
    }

    async fn send(&self, tokens: &[DeviceToken], message: &PushMessage) -> ApiResult<DeliveryReport> {
        let attempts = deliver_all(self.gateway.as_ref(), tokens, message).await;

        for attempt in &attempts {
            self.repo.record(attempt, message).await?;
        }

        let report = DeliveryReport::from_attempts(&attempts);
        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            title = %message.title,
            "Notification sent"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PushGateway for RecordingGateway {
        async fn deliver(&self, token: &DeviceToken, _: &PushMessage) -> anyhow::Result<()> {
            if token.token.starts_with("stale") {
                anyhow::bail!("token {} is no longer registered", token.token);
            }
            self.delivered.lock().await.push(token.token.clone());
            Ok(())
        }
    }

    fn device(token: &str) -> DeviceToken {
        let now = Utc::now();
        DeviceToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_role: UserRole::Instructor,
            token: token.to_string(),
            device_info: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn message() -> PushMessage {
        PushMessage {
            title: "Lesson moved".to_string(),
            body: "Your lesson now starts at 10:00".to_string(),
            data: None,
        }
    }

    #[tokio::test]
    async fn failed_device_does_not_stop_the_rest() {
        let gateway = RecordingGateway::default();
        let tokens = vec![device("phone-a"), device("stale-b"), device("phone-c")];

        let attempts = deliver_all(&gateway, &tokens, &message()).await;

        assert_eq!(attempts.len(), 3);
        assert!(attempts[0].succeeded());
        assert_eq!(
            attempts[1].error.as_deref(),
            Some("token stale-b is no longer registered")
        );
        assert!(attempts[2].succeeded());
        assert_eq!(*gateway.delivered.lock().await, vec!["phone-a", "phone-c"]);

        let report = DeliveryReport::from_attempts(&attempts);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
    }

    #[tokio::test]
    async fn no_tokens_means_nothing_attempted() {
        let attempts = deliver_all(&TracingPushGateway, &[], &message()).await;
        assert!(attempts.is_empty());
        assert_eq!(
            DeliveryReport::from_attempts(&attempts),
            DeliveryReport {
                attempted: 0,
                delivered: 0
            }
        );
    }
}
