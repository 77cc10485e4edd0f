use std::fs;
use std::path::Path;

use hh_core::{decode_program, HiHippoError};
use tracing::debug;

use crate::{map_cli_read, map_cli_write};

pub(crate) fn is_program_document(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

pub(crate) fn read_text(path: &Path) -> Result<String, HiHippoError> {
    if !path.exists() {
        return Err(HiHippoError::new(
            "CLI_NOT_FOUND",
            format!("File does not exist: {}", path.display()),
        ));
    }
    fs::read_to_string(path).map_err(map_cli_read)
}

pub(crate) fn write_text(path: &Path, content: &str) -> Result<(), HiHippoError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_write)?;
    fs::write(path, content).map_err(map_cli_write)
}

/// Raw program text from either a plain source file or a `.json` document.
pub(crate) fn load_program_source(path: &Path) -> Result<String, HiHippoError> {
    let raw = read_text(path)?;
    if is_program_document(path) {
        debug!(path = %path.display(), "decoding program document");
        return decode_program(&raw);
    }
    Ok(raw)
}
