//! Compact text encoding for assistant tool calls kept in the memory store.
//!
//! A payload looks like `[TOOL_CALLS]call_1:get_ship:{}|call_2:travel:{"to":"sol"}`: records are
//! separated by `|` and each record has exactly three `:`-separated fields. The arguments field
//! is the remainder of the record, so it may itself contain `:`.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub const TOOL_CALL_PREFIX: &str = "[TOOL_CALLS]";
pub const RECORD_DELIMITER: char = '|';
pub const FIELD_DELIMITER: char = ':';
pub const FIELD_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolCallRecord {
    pub call_id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

impl ToolCallRecord {
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallDecodeError {
    #[error("content is not a tool call payload")]
    NotToolCalls,
    #[error("tool call payload is empty")]
    EmptyPayload,
    #[error("no valid tool calls ({skipped} malformed)")]
    NoValidRecords { skipped: usize },
}

pub fn is_tool_call_payload(content: &str) -> bool {
    content.starts_with(TOOL_CALL_PREFIX)
}

pub fn encode_tool_calls(calls: &[ToolCallRecord]) -> String {
    let mut out = String::from(TOOL_CALL_PREFIX);
    for (idx, call) in calls.iter().enumerate() {
        if idx > 0 {
            out.push(RECORD_DELIMITER);
        }
        out.push_str(&call.call_id);
        out.push(FIELD_DELIMITER);
        out.push_str(&call.name);
        out.push(FIELD_DELIMITER);
        out.push_str(&call.arguments);
    }
    out
}

/// Decode a stored payload, skipping records with the wrong number of fields.
pub fn decode_tool_calls(content: &str) -> Result<Vec<ToolCallRecord>, ToolCallDecodeError> {
    let Some(payload) = content.strip_prefix(TOOL_CALL_PREFIX) else {
        return Err(ToolCallDecodeError::NotToolCalls);
    };
    if payload.trim().is_empty() {
        return Err(ToolCallDecodeError::EmptyPayload);
    }

    let mut calls = Vec::new();
    let mut skipped = 0usize;
    for record in payload.split(RECORD_DELIMITER) {
        let fields: Vec<&str> = record.splitn(FIELD_COUNT, FIELD_DELIMITER).collect();
        match fields.as_slice() {
            [call_id, name, arguments] if !name.trim().is_empty() => {
                calls.push(ToolCallRecord::new(*call_id, name.trim(), *arguments));
            }
            _ => skipped += 1,
        }
    }

    if calls.is_empty() {
        return Err(ToolCallDecodeError::NoValidRecords { skipped });
    }
    Ok(calls)
}
