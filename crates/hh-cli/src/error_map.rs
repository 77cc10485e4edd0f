use hh_core::HiHippoError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> HiHippoError {
    HiHippoError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: HiHippoError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

pub(crate) fn map_cli_read(error: std::io::Error) -> HiHippoError {
    map_error("CLI_READ", error)
}

pub(crate) fn map_cli_write(error: std::io::Error) -> HiHippoError {
    map_error("CLI_WRITE", error)
}

pub(crate) fn map_scene_json(error: serde_json::Error) -> HiHippoError {
    map_error("CLI_WRITE", error)
}

#[cfg(not(coverage))]
pub(crate) fn map_bridge_io(error: std::io::Error) -> HiHippoError {
    HiHippoError::bridge_io(error)
}
