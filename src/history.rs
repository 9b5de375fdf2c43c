use spdlog::prelude::*;
use uuid::Uuid;

use crate::backend::Backend;
use crate::report::Report;

/// Past reports of one user, in the order the backend returned them
#[derive(Debug, Default)]
pub struct History {
    reports: Vec<Report>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list with a fresh copy from the backend. On failure the
    /// previous list stays as it was.
    pub async fn refresh<B: Backend>(&mut self, backend: &B, user_id: &Uuid) -> bool {
        debug!("Fetching history for {}", user_id);
        match backend.list_reports(user_id).await {
            Ok(reports) => {
                debug!("History has {} entries", reports.len());
                self.reports = reports;
                true
            }
            Err(err) => {
                error!("Failed to load history: {}", err);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Report> {
        self.reports.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|report| report.id.to_string() == id)
    }

    /// `#n` is a 1-based position in the list; anything else is an
    /// identifier
    pub fn lookup(&self, key: &str) -> Option<&Report> {
        match key.strip_prefix('#') {
            Some(n) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .and_then(|n| self.get(n - 1)),
            None => self.find(key),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter()
    }
}
