use std::{
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use spdlog::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{App, View};
use crate::backend::Backend;
use crate::export::ExportError;
use crate::report::FieldPath;
use crate::view;

const HELP: &str = "\
commands:
  dashboard              show the upload screen
  history                show past analyses
  select <path>          pick an image to analyse
  clear                  drop the selected image
  upload                 send the selected image for extraction
  open <#n|id>           open a history entry by position or id
  back                   close the open report
  set <group>.<field> <value>
  save                   save the open report
  export [#n|id]         write a payload as JSON
  show                   redraw the current screen
  quit";

#[derive(Debug, PartialEq)]
pub enum ShellCommand {
    Dashboard,
    History,
    Select(PathBuf),
    Clear,
    Upload,
    Open(String),
    Back,
    Set(FieldPath, String),
    Save,
    Export(Option<String>),
    Show,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let cmd = match (cmd, rest.is_empty()) {
            ("dashboard", true) => ShellCommand::Dashboard,
            ("history", true) => ShellCommand::History,
            ("select", false) => ShellCommand::Select(PathBuf::from(rest)),
            ("clear", true) => ShellCommand::Clear,
            ("upload", true) => ShellCommand::Upload,
            ("open", false) => ShellCommand::Open(rest.to_string()),
            ("back", true) => ShellCommand::Back,
            ("set", false) => {
                let (path, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                ShellCommand::Set(path.parse()?, value.trim().to_string())
            }
            ("save", true) => ShellCommand::Save,
            ("export", true) => ShellCommand::Export(None),
            ("export", false) => ShellCommand::Export(Some(rest.to_string())),
            ("show", true) => ShellCommand::Show,
            ("help", _) => ShellCommand::Help,
            ("quit" | "exit", true) => ShellCommand::Quit,
            _ => return Err(format!("unknown command '{}', try 'help'", line)),
        };

        Ok(cmd)
    }
}

pub enum Step {
    Continue(String),
    Quit,
}

/// Current screen: the open report wins over the selected view
pub fn screen<B: Backend>(app: &App<B>) -> String {
    match (app.editor(), app.view()) {
        (Some(editor), _) => view::render_detail(editor),
        (None, View::Dashboard) => view::render_dashboard(app.upload()),
        (None, View::History) => view::render_history(app.history()),
    }
}

fn exported(res: Option<Result<PathBuf, ExportError>>) -> String {
    match res {
        Some(Ok(path)) => format!("exported {}", path.display()),
        Some(Err(err)) => {
            error!("Export failed: {}", err);
            format!("! export failed: {}", err)
        }
        None => "nothing to export".to_string(),
    }
}

pub async fn execute<B: Backend>(app: &mut App<B>, cmd: ShellCommand) -> Step {
    debug!("shell: {:?}", cmd);
    let out = match cmd {
        ShellCommand::Dashboard => {
            app.show_dashboard();
            screen(app)
        }
        ShellCommand::History => {
            app.show_history();
            screen(app)
        }
        ShellCommand::Select(path) => {
            app.select_file(path);
            screen(app)
        }
        ShellCommand::Clear => {
            app.clear_file();
            screen(app)
        }
        ShellCommand::Upload => {
            if !app.upload().can_submit() {
                "select an image first".to_string()
            } else {
                app.submit_upload().await;
                screen(app)
            }
        }
        ShellCommand::Open(key) => match app.open(&key) {
            Some(editor) => view::render_detail(editor),
            None => format!("no history entry '{}'", key),
        },
        ShellCommand::Back => {
            app.close();
            screen(app)
        }
        ShellCommand::Set(path, value) => {
            if app.set_field(path.group, &path.field, value) {
                screen(app)
            } else {
                "no report open".to_string()
            }
        }
        ShellCommand::Save => {
            if app.editor().is_none() {
                "no report open".to_string()
            } else {
                app.save().await;
                screen(app)
            }
        }
        ShellCommand::Export(Some(key)) => exported(app.export_entry(&key).await),
        ShellCommand::Export(None) => match app.export_open().await {
            Some(res) => exported(Some(res)),
            None => exported(app.export_last_result().await),
        },
        ShellCommand::Show => screen(app),
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Quit => return Step::Quit,
    };

    Step::Continue(out)
}

/// Reads commands from stdin until `quit`, end of input or SIGTERM
pub async fn run<B: Backend>(app: &mut App<B>, term: Arc<AtomicBool>) -> std::io::Result<()> {
    println!("{}", screen(app));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !term.load(Ordering::Relaxed) {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ShellCommand>() {
            Ok(cmd) => match execute(app, cmd).await {
                Step::Continue(out) => println!("{}", out),
                Step::Quit => break,
            },
            Err(err) => println!("! {}", err),
        }
    }

    info!("Bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::report::{Group, Report};
    use serde_json::json;
    use uuid::Uuid;

    fn make_app(dir: &std::path::Path) -> App<FakeBackend> {
        let backend = FakeBackend::default();
        let report: Report = serde_json::from_value(json!({"id": 10, "ocr_json": {}})).unwrap();
        *backend.reports.lock().unwrap() = vec![report];
        App::new(backend, Uuid::nil(), dir.to_path_buf())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("history".parse::<ShellCommand>(), Ok(ShellCommand::History));
        assert_eq!(
            "select  /tmp/my scan.png ".parse::<ShellCommand>(),
            Ok(ShellCommand::Select(PathBuf::from("/tmp/my scan.png")))
        );
        assert_eq!(
            "set metadados.profundidade 0 - 20 cm".parse::<ShellCommand>(),
            Ok(ShellCommand::Set(
                FieldPath {
                    group: Group::Metadata,
                    field: "profundidade".to_string()
                },
                "0 - 20 cm".to_string()
            ))
        );
        assert_eq!("export".parse::<ShellCommand>(), Ok(ShellCommand::Export(None)));
        assert_eq!(
            "export #2".parse::<ShellCommand>(),
            Ok(ShellCommand::Export(Some("#2".to_string())))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("frobnicate".parse::<ShellCommand>().is_err());
        assert!("open".parse::<ShellCommand>().is_err());
        assert!("set quimica.nope 1".parse::<ShellCommand>().is_err());
    }

    #[tokio::test]
    async fn test_execute_edit_session() {
        // Given
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        app.refresh_history().await;

        // When
        execute(&mut app, "open #1".parse().unwrap()).await;
        execute(&mut app, "set quimica.ph_agua 6.1".parse().unwrap()).await;
        let Step::Continue(out) = execute(&mut app, ShellCommand::Save).await else {
            panic!("expected output");
        };

        // Then
        assert!(out.contains("Saved!"));
        assert!(out.contains("6.1"));
    }

    #[tokio::test]
    async fn test_execute_without_open_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());

        let Step::Continue(out) = execute(&mut app, ShellCommand::Save).await else {
            panic!("expected output");
        };
        assert_eq!(out, "no report open");

        let Step::Continue(out) = execute(&mut app, ShellCommand::Export(None)).await else {
            panic!("expected output");
        };
        assert_eq!(out, "nothing to export");
        assert!(matches!(execute(&mut app, ShellCommand::Quit).await, Step::Quit));
    }
}
