use serde::{Deserialize, Serialize};
use std::fmt;

/// The two tag vocabularies a model can emit calls in.
///
/// Variant order is the order family blocks appear in an aggregated report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::VariantArray,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallFamily {
    Tool,
    Agent,
}

impl fmt::Display for CallFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

/// Identifier spaces of the two families overlap, so calls and results are
/// always addressed by family and id together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallKey {
    pub family: CallFamily,
    pub id: i64,
}

impl CallKey {
    pub fn new(family: CallFamily, id: i64) -> Self {
        Self { family, id }
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.family, self.id)
    }
}

/// A call block that was fully parsed out of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCall {
    pub id: i64,
    pub family: CallFamily,
    pub instructions: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl PendingCall {
    pub fn key(&self) -> CallKey {
        CallKey::new(self.family, self.id)
    }
}

/// Output of a capability, submitted by whoever executed the call.
///
/// A string payload is treated as already rendered text; anything else is
/// rendered as compact JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub id: i64,
    pub family: CallFamily,
    pub name: String,
    pub payload: serde_json::Value,
}

impl CallResult {
    pub fn new(
        id: i64,
        family: CallFamily,
        name: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id,
            family,
            name: name.into(),
            payload,
        }
    }

    pub fn key(&self) -> CallKey {
        CallKey::new(self.family, self.id)
    }

    pub fn payload_text(&self) -> String {
        match &self.payload {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
