use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a message template registered with the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCode(pub String);

impl TemplateCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for TemplateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub template: TemplateCode,
    pub recipients: Vec<Recipient>,
    /// Values substituted into the template, shared by every recipient.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl NotificationRequest {
    pub fn new(template: TemplateCode, recipients: Vec<Recipient>) -> Self {
        Self {
            template,
            recipients,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

/// Delivery counts for one send call. `primary` and `fallback` split the
/// succeeded count by channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    pub succeeded: usize,
    pub failed: usize,
    pub primary: usize,
    pub fallback: usize,
}

impl SendReport {
    pub fn all_failed(count: usize) -> Self {
        Self {
            failed: count,
            ..Self::default()
        }
    }

    pub fn absorb(&mut self, other: SendReport) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.primary += other.primary;
        self.fallback += other.fallback;
    }
}
