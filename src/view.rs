//! Plain-text renderings of the three screens: dashboard, history and the
//! report detail form.

use crate::editor::{ReportEditor, SaveStatus};
use crate::history::History;
use crate::report::{Group, Report};
use crate::upload::UploadForm;

pub const EMPTY_HISTORY: &str = "No analyses yet. Upload a report to get started.";

pub fn render_dashboard(form: &UploadForm) -> String {
    let mut out = String::from("== Analyse soil report ==\n");

    match form.file() {
        Some(path) => out.push_str(&format!("File: {}\n", path.display())),
        None => out.push_str("No file selected (select <path>)\n"),
    }

    if form.is_busy() {
        out.push_str("Processing with AI...\n");
    } else if form.can_submit() {
        out.push_str("[upload] Analyse now\n");
    } else {
        out.push_str("[upload] unavailable\n");
    }

    if let Some(err) = form.error() {
        out.push_str(&format!("! {}\n", err));
    }

    if let Some(res) = form.result() {
        out.push_str(&format!(
            "Last upload: {}\n",
            res.message.as_deref().unwrap_or("processed")
        ));
        if let Some(url) = &res.image_url {
            out.push_str(&format!("Image: {}\n", url));
        }
    }

    out
}

pub fn render_history(history: &History) -> String {
    let mut out = format!("== History ({}) ==\n", history.len());

    if history.is_empty() {
        out.push_str(EMPTY_HISTORY);
        out.push('\n');
        return out;
    }

    for (n, report) in history.iter().enumerate() {
        out.push_str(&history_row(n + 1, report));
        out.push('\n');
    }

    out
}

fn history_row(n: usize, report: &Report) -> String {
    let date = report
        .created_at
        .map(|at| at.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "--/--/----".to_string());
    let payload = report.payload();
    let or_na = |value: String| if value.is_empty() { "N/A".to_string() } else { value };
    let ph = or_na(payload.display(Group::Chemistry, "ph_agua"));
    let sample = or_na(payload.display(Group::Metadata, "numero_amostra"));

    format!(
        "{:>4}  {}  id {}  pH {}  sample {}",
        format!("#{}", n),
        date,
        report.id,
        ph,
        sample
    )
}

pub fn render_detail(editor: &ReportEditor) -> String {
    let report = editor.report();
    let form = editor.form();
    let mut out = format!("== Report {} ==\n", report.id);

    if let Some(url) = &report.image_url {
        out.push_str(&format!("Image: {}\n", url));
    }
    if let Some(user) = &report.user_id {
        out.push_str(&format!("Owner: {}\n", user));
    }

    if editor.is_saving() {
        out.push_str("Saving...\n");
    }
    match editor.save_status() {
        Some(SaveStatus::Success) => out.push_str("Saved!\n"),
        Some(SaveStatus::Error) => out.push_str("! Save failed\n"),
        None => {}
    }

    for group in Group::ALL {
        out.push_str(&format!("\n-- {} ({}) --\n", group.title(), group.key()));
        for (key, label) in group.fields() {
            out.push_str(&format!(
                "  {:<22} {:<24} {}\n",
                label,
                key,
                form.display(group, key)
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use serde_json::json;
    use uuid::Uuid;

    async fn history_of(n: i64) -> History {
        let backend = FakeBackend::default();
        *backend.reports.lock().unwrap() = (1..=n)
            .map(|id| {
                serde_json::from_value(json!({
                    "id": id,
                    "created_at": "2025-01-31T08:00:00+00:00",
                    "ocr_json": {"metadados": {"numero_amostra": "X"}}
                }))
                .unwrap()
            })
            .collect();
        let mut history = History::new();
        history.refresh(&backend, &Uuid::nil()).await;
        history
    }

    #[tokio::test]
    async fn test_empty_history_shows_placeholder() {
        let out = render_history(&history_of(0).await);

        assert!(out.contains(EMPTY_HISTORY));
    }

    #[tokio::test]
    async fn test_history_has_one_row_per_entry() {
        let out = render_history(&history_of(3).await);

        assert!(!out.contains(EMPTY_HISTORY));
        assert!(out.starts_with("== History (3) =="));
        assert_eq!(out.lines().filter(|l| l.contains(" id ")).count(), 3);
        assert!(out.contains("31/01/2025"));
    }

    #[test]
    fn test_history_row_shows_ph() {
        let with_ph: Report = serde_json::from_value(json!({
            "id": 9,
            "ocr_json": {"quimica": {"ph_agua": 5.4}}
        }))
        .unwrap();
        let without: Report = serde_json::from_value(json!({"id": 8, "ocr_json": null})).unwrap();

        assert!(history_row(1, &with_ph).contains("pH 5.4"));
        assert!(history_row(2, &without).contains("pH N/A"));
        assert!(history_row(2, &without).trim_start().starts_with("#2"));
    }

    #[test]
    fn test_dashboard_empty_state() {
        let mut form = UploadForm::new();
        form.select("a.png");
        form.clear();

        let out = render_dashboard(&form);

        assert!(out.contains("No file selected"));
        assert!(out.contains("[upload] unavailable"));
    }

    #[test]
    fn test_detail_lists_every_field() {
        let report: Report = serde_json::from_value(json!({
            "id": 1,
            "ocr_json": {"quimica": {"ph_agua": 5.2, "h_mais_al": null}}
        }))
        .unwrap();
        let editor = ReportEditor::open(report);

        let out = render_detail(&editor);

        let fields: usize = Group::ALL.iter().map(|g| g.fields().len()).sum();
        assert_eq!(out.lines().filter(|l| l.starts_with("  ")).count(), fields);
        assert!(out.contains("5.2"));
    }

    #[test]
    fn test_detail_shows_image_and_owner() {
        let report: Report = serde_json::from_value(json!({
            "id": 4,
            "user_id": "2ba4d4d5-9f2c-4e6f-a5b5-6a4e8f3c1d7e",
            "image_url": "https://cdn.example/testes/4.png",
            "ocr_json": {}
        }))
        .unwrap();

        let out = render_detail(&ReportEditor::open(report));

        assert!(out.contains("Image: https://cdn.example/testes/4.png"));
        assert!(out.contains("Owner: 2ba4d4d5-9f2c-4e6f-a5b5-6a4e8f3c1d7e"));
    }
}
