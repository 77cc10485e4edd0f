use serde::{Deserialize, Serialize};

use crate::HiHippoError;

/// On-disk program record. The `code` field round-trips byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDocument {
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramJsonReport {
    pub valid_json: bool,
    pub has_code: bool,
}

impl ProgramDocument {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn to_json_pretty(&self) -> Result<String, HiHippoError> {
        serde_json::to_string_pretty(self)
            .map_err(|error| HiHippoError::new("PROGRAM_JSON_INVALID", error.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, HiHippoError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|error| HiHippoError::new("PROGRAM_JSON_INVALID", error.to_string()))?;
        let Some(code) = value.get("code") else {
            return Err(HiHippoError::new(
                "PROGRAM_CODE_MISSING",
                "JSON does not contain a 'code' field.",
            ));
        };
        let Some(code) = code.as_str() else {
            return Err(HiHippoError::new(
                "PROGRAM_CODE_MISSING",
                "The 'code' field must be a string.",
            ));
        };
        Ok(Self::new(code))
    }
}

/// Encoder entry point: rejects programs with nothing but whitespace.
pub fn encode_program(code: &str) -> Result<String, HiHippoError> {
    if code.trim().is_empty() {
        return Err(HiHippoError::new(
            "PROGRAM_CODE_EMPTY",
            "HiHippo code cannot be empty.",
        ));
    }
    ProgramDocument::new(code).to_json_pretty()
}

pub fn decode_program(raw: &str) -> Result<String, HiHippoError> {
    ProgramDocument::from_json(raw).map(|document| document.code)
}

pub fn inspect_program_json(raw: &str) -> ProgramJsonReport {
    match serde_json::from_str::<serde_json::Value>(raw.trim()) {
        Ok(value) => ProgramJsonReport {
            valid_json: true,
            has_code: value.get("code").is_some(),
        },
        Err(_) => ProgramJsonReport {
            valid_json: false,
            has_code: false,
        },
    }
}
