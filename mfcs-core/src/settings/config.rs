use crate::call::CallFamily;
use serde::{Deserialize, Serialize};

/// Tag vocabulary for one call family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTags {
    /// Outer block tag, e.g. `mfcs_call` for `<mfcs_call>...</mfcs_call>`.
    pub call_tag: String,
    /// Inner tag carrying the caller assigned identifier.
    pub id_field: String,
    /// Tag wrapping this family's lines in the aggregated report.
    pub result_tag: String,
    /// Tag wrapping the JSON capability list in prompts.
    pub list_tag: String,
}

impl FamilyTags {
    pub fn tool() -> Self {
        Self {
            call_tag: "mfcs_call".to_string(),
            id_field: "call_id".to_string(),
            result_tag: "mfcs_result".to_string(),
            list_tag: "tool_list".to_string(),
        }
    }

    pub fn agent() -> Self {
        Self {
            call_tag: "mfcs_agent".to_string(),
            id_field: "agent_id".to_string(),
            result_tag: "mfcs_agent_result".to_string(),
            list_tag: "agent_api_list".to_string(),
        }
    }
}

fn default_tool_tags() -> FamilyTags {
    FamilyTags::tool()
}

fn default_agent_tags() -> FamilyTags {
    FamilyTags::agent()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_tool_tags")]
    pub tool: FamilyTags,

    #[serde(default = "default_agent_tags")]
    pub agent: FamilyTags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tool: default_tool_tags(),
            agent: default_agent_tags(),
        }
    }
}

impl Settings {
    pub fn tags(&self, family: CallFamily) -> &FamilyTags {
        match family {
            CallFamily::Tool => &self.tool,
            CallFamily::Agent => &self.agent,
        }
    }
}
