/// Daily log file mirror of console output
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Local;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::paths;

static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

pub fn init_file_logging() {
    let dir = paths::get_logs_directory();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Logger: cannot create {}: {}", dir.display(), e);
        return;
    }

    let path = dir.join(format!("nebulax_{}.log", Local::now().format("%Y-%m-%d")));
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => *LOG_FILE.lock() = Some(file),
        Err(e) => eprintln!("Logger: cannot open {}: {}", path.display(), e),
    }
}

/// No-op until `init_file_logging` succeeded
pub fn write_to_file(line: &str) {
    if let Some(file) = LOG_FILE.lock().as_mut() {
        let _ = writeln!(file, "{}", line);
    }
}

pub fn flush_file_logging() {
    if let Some(file) = LOG_FILE.lock().as_mut() {
        let _ = file.flush();
    }
}
