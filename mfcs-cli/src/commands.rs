use anyhow::{Context, Result};
use mfcs_core::call::CallFamily;
use mfcs_core::parser::{parse_calls, Markers};
use mfcs_core::prompt::{build_prompt, CapabilityGroup};
use mfcs_core::settings::Settings;
use std::path::PathBuf;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

async fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {path:?}")),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

async fn write_output(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

pub async fn parse(file: Option<PathBuf>, settings: &Settings) -> Result<()> {
    let text = read_input(file).await?;
    let parsed = parse_calls(&text, &Markers::from_settings(settings));
    tracing::info!(calls = parsed.calls.len(), "Parsed response");

    let json = serde_json::to_string_pretty(&parsed)?;
    write_output(&json).await
}

pub async fn prompt(family: CallFamily, file: Option<PathBuf>, settings: &Settings) -> Result<()> {
    let text = read_input(file).await?;
    let groups: Vec<CapabilityGroup> =
        serde_json::from_str(&text).context("Capability list is not valid JSON")?;

    let prompt = build_prompt(family, &groups, settings)?;
    write_output(&prompt).await
}
