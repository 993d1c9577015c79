use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Send log output to `path`. The terminal belongs to the TUI, so nothing goes
/// to stderr. `RUST_LOG` wins over `default_level` when set.
///
/// Returns false (and logs nothing) if the file cannot be opened.
pub fn init_file_logger(path: &Path, default_level: &str) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .is_ok()
}
