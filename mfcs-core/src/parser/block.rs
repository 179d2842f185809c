use crate::call::PendingCall;
use crate::parser::markers::FamilyMarkers;
use regex::Regex;
use thiserror::Error;

/// Reasons a complete block is not turned into a call. None of these are
/// surfaced to callers; the block is dropped.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("missing <{0}> field")]
    MissingField(String),

    #[error("identifier `{0}` is not an integer")]
    InvalidIdentifier(String),

    #[error("parameters are not valid JSON: {0}")]
    InvalidParameters(#[from] serde_json::Error),
}

fn capture<'a>(pattern: &Regex, body: &'a str, field: &str) -> Result<&'a str, BlockError> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| BlockError::MissingField(field.to_string()))
}

/// Parses the text between a family's opening and closing markers.
pub fn parse_block_body(body: &str, markers: &FamilyMarkers) -> Result<PendingCall, BlockError> {
    let fields = &markers.fields;
    let instructions = capture(&fields.instructions, body, "instructions")?;
    let id_text = capture(&fields.id, body, &markers.id_field)?;
    let name = capture(&fields.name, body, "name")?;
    let parameters = capture(&fields.parameters, body, "parameters")?;

    let id = id_text
        .parse::<i64>()
        .map_err(|_| BlockError::InvalidIdentifier(id_text.to_string()))?;
    let arguments = serde_json::from_str(parameters)?;

    Ok(PendingCall {
        id,
        family: markers.family,
        instructions: instructions.to_string(),
        name: name.to_string(),
        arguments,
    })
}
