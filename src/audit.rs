// src/audit.rs
//! Audit trail contract
//!
//! Every upload, download and rotation attempt produces one [`AuditEntry`],
//! successful or not. Sinks are best-effort: callers log a failed write and
//! carry on with the underlying operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::enums::AuditAction;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    /// Who acted (configured user id)
    pub subject: String,
    /// What was acted on (file name, `category/name`, …)
    pub target: String,
    /// Where it lives (`blob-store`, `local`, `secrets`)
    pub location: String,
    pub success: bool,
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, subject: &str, target: &str, location: &str) -> Self {
        Self {
            action,
            subject: subject.to_string(),
            target: target.to_string(),
            location: location.to_string(),
            success: true,
            error: None,
            at: Utc::now(),
        }
    }

    /// Mark as failed with the error's display text
    pub fn failed(mut self, err: &CoreError) -> Self {
        self.success = false;
        self.error = Some(err.to_string());
        self
    }

    pub fn with_outcome<T>(self, outcome: &Result<T>) -> Self {
        match outcome {
            Ok(_) => self,
            Err(err) => self.failed(err),
        }
    }
}

pub trait AuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<()>;
}

/// Write `entry` to `sink`, logging instead of failing when the sink errors
pub fn record_best_effort(sink: &dyn AuditSink, entry: &AuditEntry) {
    if let Err(err) = sink.record(entry) {
        warn!(
            action = %entry.action,
            target = %entry.target,
            error = %err,
            "audit write failed — continuing"
        );
    }
}

/// Sink that only emits a log line per entry
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        if entry.success {
            info!(
                action = %entry.action,
                subject = %entry.subject,
                target = %entry.target,
                location = %entry.location,
                "audit"
            );
        } else {
            warn!(
                action = %entry.action,
                subject = %entry.subject,
                target = %entry.target,
                location = %entry.location,
                error = entry.error.as_deref().unwrap_or(""),
                "audit (failed)"
            );
        }
        Ok(())
    }
}
