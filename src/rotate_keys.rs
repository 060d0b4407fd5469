// src/rotate_keys.rs
//! Key rotation for stored secrets
//!
//! Each record is rotated on its own: decrypt under the current key,
//! re-encrypt under a fresh one, single-statement upsert. A failure leaves
//! that record's previous row intact and does not stop the run. Running it
//! twice is safe.

use serde::Serialize;
use tracing::info;

use crate::audit::{record_best_effort, AuditEntry, AuditSink};
use crate::consts::LOCATION_SECRETS;
use crate::enums::AuditAction;
use crate::error::Result;
use crate::secrets::SecretStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationFailure {
    pub category: String,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RotationReport {
    /// Records present when the run started
    pub total: usize,
    pub rotated: usize,
    /// Records that disappeared mid-run
    pub skipped: usize,
    pub failed: Vec<RotationFailure>,
}

impl RotationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Orchestrates [`SecretStore::rotate_all`] and audits the run
pub struct RotationJob<'a> {
    store: SecretStore<'a>,
    audit: Box<dyn AuditSink + 'a>,
    actor: &'a str,
}

impl<'a> RotationJob<'a> {
    pub fn new(store: SecretStore<'a>, audit: Box<dyn AuditSink + 'a>, actor: &'a str) -> Self {
        Self {
            store,
            audit,
            actor,
        }
    }

    pub fn run(&self) -> Result<RotationReport> {
        let outcome = self.store.rotate_all();

        let mut entry = AuditEntry::new(AuditAction::Rotate, self.actor, "*", LOCATION_SECRETS)
            .with_outcome(&outcome);
        if let Ok(report) = &outcome {
            if !report.is_clean() {
                let names: Vec<String> = report
                    .failed
                    .iter()
                    .map(|f| format!("{}/{}", f.category, f.name))
                    .collect();
                entry.success = false;
                entry.error = Some(format!(
                    "{} of {} record(s) not rotated: {}",
                    report.failed.len(),
                    report.total,
                    names.join(", ")
                ));
            }
        }
        record_best_effort(self.audit.as_ref(), &entry);

        let report = outcome?;
        info!(
            total = report.total,
            rotated = report.rotated,
            skipped = report.skipped,
            failed = report.failed.len(),
            "key rotation finished"
        );
        Ok(report)
    }
}
