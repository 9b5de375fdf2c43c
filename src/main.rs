use clap::{Parser, Subcommand};
use spdlog::{Level, LevelFilter};
use std::{
    error::Error,
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};
use uuid::Uuid;

mod api;
mod app;
mod backend;
mod config;
mod editor;
mod export;
mod history;
mod report;
mod shell;
mod upload;
mod view;

use crate::api::ApiClient;
use crate::app::App;
use crate::config::{DEFAULT_API_URL, DEFAULT_USER_ID};
use crate::report::FieldPath;

/// Upload soil analysis reports for AI extraction, review and correct the
/// extracted values, and browse past analyses
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, default_value = DEFAULT_USER_ID)]
    user_id: Uuid,

    /// Directory exported JSON files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List past analyses, newest first
    History,
    /// Send an image for extraction and show the stored result
    Upload { file: PathBuf },
    /// Show one analysis by id
    Show { id: String },
    /// Change fields of an analysis and save it
    Edit {
        id: String,
        /// group.field=value, e.g. quimica.ph_agua=5.4
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        set: Vec<(FieldPath, String)>,
    },
    /// Write an analysis payload to <out-dir> as JSON
    Export { id: String },
    /// Interactive session (default)
    Shell,
}

fn parse_assignment(s: &str) -> Result<(FieldPath, String), String> {
    let (path, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <group>.<field>=<value>, got '{}'", s))?;

    Ok((path.parse()?, value.to_string()))
}

fn init_logging(verbose: bool) -> Result<(), Box<dyn Error>> {
    let (level, log_level) = if verbose {
        (Level::Debug, log::LevelFilter::Debug)
    } else {
        (Level::Info, log::LevelFilter::Warn)
    };

    spdlog::default_logger().set_level_filter(LevelFilter::MoreSevereEqual(level));
    spdlog::init_log_crate_proxy().map_err(|e| e.to_string())?;
    log::set_max_level(log_level);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let client = ApiClient::new(&args.api_url)?;
    let mut app = App::new(client, args.user_id, args.out_dir);
    app.refresh_history().await;

    match args.command.unwrap_or(Command::Shell) {
        Command::History => {
            app.show_history();
            println!("{}", shell::screen(&app));
        }
        Command::Upload { file } => {
            app.select_file(file);
            app.submit_upload().await;
            println!("{}", shell::screen(&app));
            if let Some(err) = app.upload().error() {
                return Err(err.into());
            }
        }
        Command::Show { id } => {
            let editor = app.open_id(&id).ok_or(format!("no analysis '{}'", id))?;
            println!("{}", view::render_detail(editor));
        }
        Command::Edit { id, set } => {
            app.open_id(&id).ok_or(format!("no analysis '{}'", id))?;
            for (path, value) in set {
                app.set_field(path.group, &path.field, value);
            }
            let saved = app.save().await;
            println!("{}", shell::screen(&app));
            if !saved {
                return Err(format!("could not save analysis '{}'", id).into());
            }
        }
        Command::Export { id } => {
            let path = app
                .export_id(&id)
                .await
                .ok_or(format!("no analysis '{}'", id))??;
            println!("exported {}", path.display());
        }
        Command::Shell => {
            let term = Arc::new(AtomicBool::new(false));
            signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;
            shell::run(&mut app, term).await?;
        }
    }

    Ok(())
}
