use std::time::Instant;

use spdlog::prelude::*;

use crate::backend::Backend;
use crate::config::SAVE_SUCCESS_TTL;
use crate::report::{Group, Payload, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Success,
    Error,
}

/// Working copy of one report's payload, edited field by field and saved
/// back as a whole.
#[derive(Debug)]
pub struct ReportEditor {
    report: Report,
    form: Payload,
    saving: bool,
    status: Option<(SaveStatus, Instant)>,
}

impl ReportEditor {
    pub fn open(report: Report) -> Self {
        let form = report.payload();
        ReportEditor {
            report,
            form,
            saving: false,
            status: None,
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn form(&self) -> &Payload {
        &self.form
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn set_field(&mut self, group: Group, field: &str, value: impl Into<String>) {
        self.form.set(group, field, value);
        self.status = None;
    }

    pub fn save_status(&self) -> Option<SaveStatus> {
        self.save_status_at(Instant::now())
    }

    /// The success indicator expires after a fixed delay; an error stays
    /// until the next edit or save.
    pub fn save_status_at(&self, now: Instant) -> Option<SaveStatus> {
        match self.status {
            Some((SaveStatus::Success, at)) if now.duration_since(at) >= SAVE_SUCCESS_TTL => None,
            Some((status, _)) => Some(status),
            None => None,
        }
    }

    /// Sends the whole working copy. Returns true when the backend accepted
    /// it.
    pub async fn save<B: Backend>(&mut self, backend: &B) -> bool {
        if self.saving {
            return false;
        }

        self.saving = true;
        self.status = None;

        let res = backend.update_report(&self.report.id, &self.form).await;
        self.saving = false;

        match res {
            Ok(()) => {
                self.report.ocr_json = self.form.as_value();
                self.status = Some((SaveStatus::Success, Instant::now()));
                true
            }
            Err(err) => {
                error!("Failed to save report {}: {}", self.report.id, err);
                self.status = Some((SaveStatus::Error, Instant::now()));
                false
            }
        }
    }
}
