use super::domain::{NotificationRequest, SendReport};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("notification template code is empty")]
    MissingTemplate,
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Outbound messaging provider. One call covers one batch of recipients.
pub trait NotificationSender: Send + Sync {
    fn send(&self, request: &NotificationRequest) -> Result<SendReport, NotificationError>;
}
