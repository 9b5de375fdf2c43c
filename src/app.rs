use std::path::{Path, PathBuf};

use spdlog::prelude::*;
use uuid::Uuid;

use crate::backend::Backend;
use crate::editor::ReportEditor;
use crate::export::{self, ExportError};
use crate::history::History;
use crate::report::{Group, Report};
use crate::upload::UploadForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    History,
}

/// Whole client state: upload form, history list and the report open in
/// the editor, if any. An open report takes over the screen whatever the
/// current view.
pub struct App<B: Backend> {
    backend: B,
    user_id: Uuid,
    export_dir: PathBuf,
    view: View,
    upload: UploadForm,
    history: History,
    editor: Option<ReportEditor>,
}

impl<B: Backend> App<B> {
    pub fn new(backend: B, user_id: Uuid, export_dir: PathBuf) -> Self {
        App {
            backend,
            user_id,
            export_dir,
            view: View::Dashboard,
            upload: UploadForm::new(),
            history: History::new(),
            editor: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn upload(&self) -> &UploadForm {
        &self.upload
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn editor(&self) -> Option<&ReportEditor> {
        self.editor.as_ref()
    }

    pub async fn refresh_history(&mut self) -> bool {
        self.history.refresh(&self.backend, &self.user_id).await
    }

    pub fn show_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.editor = None;
    }

    pub fn show_history(&mut self) {
        self.view = View::History;
        self.editor = None;
    }

    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.upload.select(path);
    }

    pub fn clear_file(&mut self) {
        self.upload.clear();
    }

    /// Runs the upload flow. On success the history is refreshed once and
    /// the first stored record, if any, is opened in the editor.
    pub async fn submit_upload(&mut self) -> bool {
        let first = match self.upload.submit(&self.backend).await {
            Some(res) => res.first_record().cloned(),
            None => return false,
        };

        self.refresh_history().await;
        if let Some(report) = first {
            self.open_report(report);
        }

        true
    }

    /// Opens a history entry by `#n` position or identifier
    pub fn open(&mut self, key: &str) -> Option<&ReportEditor> {
        let report = self.history.lookup(key)?.clone();
        Some(self.open_report(report))
    }

    /// Opens a history entry by identifier only
    pub fn open_id(&mut self, id: &str) -> Option<&ReportEditor> {
        let report = self.history.find(id)?.clone();
        Some(self.open_report(report))
    }

    fn open_report(&mut self, report: Report) -> &ReportEditor {
        info!("Opening report {}", report.id);
        self.editor.insert(ReportEditor::open(report))
    }

    pub fn close(&mut self) {
        self.editor = None;
    }

    /// Edits the open report. Returns false when nothing is open.
    pub fn set_field(&mut self, group: Group, field: &str, value: impl Into<String>) -> bool {
        match self.editor.as_mut() {
            Some(editor) => {
                editor.set_field(group, field, value);
                true
            }
            None => false,
        }
    }

    /// Saves the open report and refreshes the history on success
    pub async fn save(&mut self) -> bool {
        let saved = match self.editor.as_mut() {
            Some(editor) => editor.save(&self.backend).await,
            None => return false,
        };

        if saved {
            self.refresh_history().await;
        }

        saved
    }

    /// Exports the payload of a history entry, by `#n` position or
    /// identifier, as stored by the backend
    pub async fn export_entry(&self, key: &str) -> Option<Result<PathBuf, ExportError>> {
        let report = self.history.lookup(key)?;
        Some(export_report(report, &self.export_dir).await)
    }

    /// Same as `export_entry`, by identifier only
    pub async fn export_id(&self, id: &str) -> Option<Result<PathBuf, ExportError>> {
        let report = self.history.find(id)?;
        Some(export_report(report, &self.export_dir).await)
    }

    /// Exports the editor's working copy, unsaved edits included
    pub async fn export_open(&self) -> Option<Result<PathBuf, ExportError>> {
        let editor = self.editor.as_ref()?;
        Some(
            export::export_json(
                editor.form(),
                &self.export_dir,
                &export::editor_stem(editor.report()),
            )
            .await,
        )
    }

    /// Exports the extraction of the last upload when nothing was stored
    pub async fn export_last_result(&self) -> Option<Result<PathBuf, ExportError>> {
        let res = self.upload.result()?;
        Some(export::export_json(&res.extraction, &self.export_dir, &export::timestamp_stem()).await)
    }
}

async fn export_report(report: &Report, dir: &Path) -> Result<PathBuf, ExportError> {
    export::export_json(&report.ocr_json, dir, &export::history_stem(report)).await
}
