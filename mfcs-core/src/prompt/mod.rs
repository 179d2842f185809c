use crate::call::CallFamily;
use crate::settings::{FamilyTags, Settings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named operation the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    /// JSON schema of the call parameters. Passed through to the model as is.
    pub parameters: serde_json::Value,
}

/// Related capabilities presented to the model under one description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityGroup {
    pub description: String,
    #[serde(alias = "api_list", alias = "tool_list", alias = "agent_api_list")]
    pub capabilities: Vec<Capability>,
}

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("failed to serialize capability list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Instructions teaching the model the tool call syntax, followed by the
/// available tools.
pub fn tool_prompt(groups: &[CapabilityGroup], settings: &Settings) -> Result<String, PromptError> {
    build_prompt(CallFamily::Tool, groups, settings)
}

/// Instructions teaching the model the agent call syntax, followed by the
/// available agent apis.
pub fn agent_prompt(groups: &[CapabilityGroup], settings: &Settings) -> Result<String, PromptError> {
    build_prompt(CallFamily::Agent, groups, settings)
}

pub fn build_prompt(
    family: CallFamily,
    groups: &[CapabilityGroup],
    settings: &Settings,
) -> Result<String, PromptError> {
    let tags = settings.tags(family);
    let list = serde_json::to_string(groups)?;
    let noun = match family {
        CallFamily::Tool => "tool",
        CallFamily::Agent => "agent api",
    };

    Ok(format!(
        "\n{rules}\n<{list_tag}>\n{list}\n</{list_tag}>\n",
        rules = rules(noun, tags),
        list_tag = tags.list_tag,
    ))
}

fn rules(noun: &str, tags: &FamilyTags) -> String {
    let FamilyTags {
        call_tag,
        id_field,
        result_tag,
        list_tag,
    } = tags;
    let section = format!("{}_calling", noun.replace(' ', "_"));

    format!(
        r#"<{section}>
You can use {noun}s to solve tasks. Follow these rules about {noun} calling:
1. Always strictly follow the specified {noun} calling pattern and ensure all necessary parameters are provided.
2. Conversations may reference {noun}s that are no longer available. Never call {noun}s that are not explicitly provided.
3. **When talking to users, never mention {noun} names.** Describe what you will do instead.
4. Only call {noun}s when necessary. If the user's task is general or you already know the answer, respond without calling {noun}s.
5. Before calling each {noun}, first explain to the user why you are calling it.
6. After each {noun} use, always wait for the result before continuing. Do not assume success without explicit confirmation.
7. {result_tag} is returned automatically by {noun} calls and is not user input. Do not treat it as user input. Do not thank the user.

===Interface Usage===
## {call_tag}
Description: Request to call a {noun}. The {noun} defines the input pattern, specifying required and optional parameters.
Parameters:
- instructions: (required) What is about to be done, reminding the user what is happening
- {id_field}: (required) Call ID, starting from 1 and increasing by 1 for each call. Use a different {id_field} for every call
- name: (required) Name of the {noun} to execute. Names can only be selected from the {list_tag}. Never invent one
- parameters: (required) A JSON object containing the {noun} input parameters, following its input pattern
Example:
<{call_tag}>
<instructions>what to do</instructions>
<{id_field}>call index</{id_field}>
<name>{noun} name here</name>
<parameters>
{{
  "param1": "value1",
  "param2": "value2"
}}
</parameters>
</{call_tag}>

===Restrictions===
1. The name in {call_tag} can only be selected from the {list_tag}, never self-generated.
2. Do not generate {result_tag} content yourself and do not assume execution results.
3. Do not put {noun} calls in markdown.

</{section}>"#
    )
}
