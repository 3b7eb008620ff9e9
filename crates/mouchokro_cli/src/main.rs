//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mouchokro_core` linkage and board persistence from a shell.
//! - Print a deterministic summary of the stored board.
//!
//! Usage: `mouchokro_cli [DB_PATH]`. Without an argument the path comes from
//! `MOUCHOKRO_DB_PATH`, then `<temp_dir>/mouchokro_board.sqlite3`.
//! Setting `MOUCHOKRO_LOG_DIR` (absolute) enables file logs at the build's
//! default level.

use mouchokro_core::{default_log_level, init_logging, open_store, BoardService};
use std::path::PathBuf;

const BOARD_DB_FILE_NAME: &str = "mouchokro_board.sqlite3";
const BOARD_DB_PATH_ENV: &str = "MOUCHOKRO_DB_PATH";
const LOG_DIR_ENV: &str = "MOUCHOKRO_LOG_DIR";

fn main() {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let db_path = resolve_db_path(std::env::args().nth(1));
    let board = BoardService::open(open_store(&db_path));

    println!("mouchokro_core version={}", mouchokro_core::core_version());
    println!("db_path={}", db_path.display());
    println!("topic={}", board.topic().title);
    println!("members={}", board.members().len());
    for (index, member) in board.members().iter().enumerate() {
        println!(
            "member[{index}] id={} name={} score={} x={:.1} y={:.1}",
            member.id,
            member.display_name(),
            member.score,
            member.x,
            member.y
        );
    }
}

fn resolve_db_path(arg: Option<String>) -> PathBuf {
    arg.or_else(|| std::env::var(BOARD_DB_PATH_ENV).ok())
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(BOARD_DB_FILE_NAME))
}
