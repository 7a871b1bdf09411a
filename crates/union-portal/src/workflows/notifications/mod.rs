//! Template notifications (alimtalk with SMS fallback) sent to many members
//! in sequential batches.

pub mod dispatcher;
pub mod domain;
pub mod sender;

pub use dispatcher::{BatchOutcome, BulkDispatcher, DispatchProgress, DispatchReport};
pub use domain::{NotificationRequest, Recipient, SendReport, TemplateCode};
pub use sender::{NotificationError, NotificationSender};
