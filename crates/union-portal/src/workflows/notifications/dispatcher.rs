use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{NotificationRequest, SendReport};
use super::sender::{NotificationError, NotificationSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchProgress {
    pub batch: usize,
    pub batches: usize,
    pub processed: usize,
    pub total: usize,
}

/// Result of one batch. `start..start + size` indexes the original
/// recipient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub start: usize,
    pub size: usize,
    pub report: SendReport,
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub total: usize,
    pub totals: SendReport,
    pub batches: Vec<BatchOutcome>,
}

/// Splits a request into fixed-size batches and sends them one after another.
pub struct BulkDispatcher<S> {
    sender: Arc<S>,
    batch_size: usize,
}

impl<S> BulkDispatcher<S>
where
    S: NotificationSender,
{
    pub fn new(sender: Arc<S>, batch_size: usize) -> Self {
        Self {
            sender,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// A batch whose send call fails counts as fully failed and the
    /// remaining batches still go out.
    pub fn dispatch(
        &self,
        request: &NotificationRequest,
        mut progress: impl FnMut(DispatchProgress),
    ) -> Result<DispatchReport, NotificationError> {
        if request.template.0.trim().is_empty() {
            return Err(NotificationError::MissingTemplate);
        }

        let total = request.recipients.len();
        let batches = total.div_ceil(self.batch_size);
        let mut report = DispatchReport {
            total,
            ..DispatchReport::default()
        };

        for (index, chunk) in request.recipients.chunks(self.batch_size).enumerate() {
            let batch = NotificationRequest {
                template: request.template.clone(),
                recipients: chunk.to_vec(),
                variables: request.variables.clone(),
            };

            let outcome = match self.sender.send(&batch) {
                Ok(sent) => BatchOutcome {
                    start: index * self.batch_size,
                    size: chunk.len(),
                    report: sent,
                    error: None,
                },
                Err(err) => {
                    warn!(
                        template = %request.template,
                        batch = index + 1,
                        size = chunk.len(),
                        error = %err,
                        "notification batch failed"
                    );
                    BatchOutcome {
                        start: index * self.batch_size,
                        size: chunk.len(),
                        report: SendReport::all_failed(chunk.len()),
                        error: Some(err.to_string()),
                    }
                }
            };

            report.totals.absorb(outcome.report);
            report.batches.push(outcome);
            progress(DispatchProgress {
                batch: index + 1,
                batches,
                processed: (index * self.batch_size + chunk.len()).min(total),
                total,
            });
        }

        info!(
            template = %request.template,
            total,
            succeeded = report.totals.succeeded,
            failed = report.totals.failed,
            "bulk notification finished"
        );

        Ok(report)
    }
}
