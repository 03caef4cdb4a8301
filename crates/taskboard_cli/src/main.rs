//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage against a real board database.
//! - Print today's board for the current user in a stable plain-text form.
//!
//! Usage: `taskboard_cli [DB_PATH] [CONFIG_TOML]`
//!
//! Set `TASKBOARD_LOG_DIR` to an absolute directory to enable file logs.

use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{BoardConfig, Notice, SqliteStorage, TaskBoard};

const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";
const LOG_DIR_ENV: &str = "TASKBOARD_LOG_DIR";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskboard_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .map_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME), PathBuf::from);
    let config = match args.next() {
        Some(path) => BoardConfig::load(path).map_err(|err| err.to_string())?,
        None => BoardConfig::default(),
    };

    if let Some(log_dir) = std::env::var_os(LOG_DIR_ENV) {
        let level = taskboard_core::default_log_level();
        taskboard_core::init_logging(level.as_str(), PathBuf::from(log_dir))
            .map_err(|err| err.to_string())?;
    }

    println!("taskboard_core version={}", taskboard_core::core_version());

    let storage = SqliteStorage::open(&db_path, config.quota_bytes).map_err(|err| err.to_string())?;
    let (board, warning) = TaskBoard::initialize(storage, &config)
        .map_err(|err| err.to_string())?
        .into_parts();
    if let Some(err) = warning {
        let notice = Notice::for_storage_warning(&err, config.notice_duration);
        eprintln!("warning: {}", notice.message);
    }

    let user = board.current_user().map_err(|err| err.to_string())?;
    let day = board.current_day();
    println!("user={} day={}", user.name, day.display_name());
    for task in board.visible_tasks() {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("[{mark}] {}", task.title);
    }
    let progress = board.progress();
    println!("{progress} ({:.0}%)", progress.percent());

    Ok(())
}
