//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mynote_core` linkage and schema version.
//! - With a data directory argument, open the note database there and print
//!   the stored note count.

use mynote_core::db::migrations::latest_version;
use mynote_core::{init_logging, CoreConfig, NoteApp};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mynote_core ping={}", mynote_core::ping());
    println!("mynote_core version={}", mynote_core::core_version());
    println!("mynote_core schema_version={}", latest_version());

    let Some(data_dir) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let data_dir = match resolve_data_dir(&data_dir) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("invalid data directory `{data_dir}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let config = CoreConfig::new(data_dir);
    if let Err(err) = init_logging(&config.log_level, config.log_dir()) {
        eprintln!("logging disabled: {err}");
    }

    match NoteApp::open(config) {
        Ok(app) => {
            let state = app.view_model().state();
            println!("notes={}", state.notes.len());
            println!("auto_save_enabled={}", state.auto_save_enabled);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to open note database: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Makes `./data` style arguments absolute; log directories must be.
fn resolve_data_dir(arg: &str) -> std::io::Result<PathBuf> {
    std::path::absolute(arg)
}
