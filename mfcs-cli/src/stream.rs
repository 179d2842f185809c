use anyhow::anyhow;
use mfcs_core::call::CallResult;
use mfcs_core::settings::Settings;
use mfcs_core::turn::{Turn, TurnEvent};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tokio::{io, io::AsyncWriteExt};
use tracing::{info, warn};

/// One line of stdin in stream mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum StreamInput {
    Chunk {
        text: String,
        #[serde(default)]
        is_final: bool,
    },
    Result(CallResult),
}

/// Runs a single turn: model output and call results arrive on stdin, turn
/// events leave on stdout, one JSON object per line. Returns once the turn
/// is complete or stdin closes.
pub async fn run_stream(settings: &Settings) -> anyhow::Result<()> {
    let (mut turn, mut event_rx) = Turn::from_settings(settings);

    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    join_set.spawn(async move {
        let mut stdout = io::stdout();
        while let Some(event) = event_rx.recv().await {
            let json = serde_json::to_string(&event)?;
            let json = format!("{json}\n");
            stdout.write_all(json.as_bytes()).await?;
            stdout.flush().await?;
            if matches!(event, TurnEvent::TurnComplete { .. }) {
                info!("Turn complete");
                break;
            }
        }
        Ok(())
    });

    join_set.spawn(async move {
        let mut stdin = BufReader::new(io::stdin()).lines();
        while let Some(line) = stdin.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let input: StreamInput = match serde_json::from_str(&line) {
                Ok(input) => input,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed input line");
                    continue;
                }
            };
            match input {
                StreamInput::Chunk { text, is_final } => turn.feed(&text, is_final),
                StreamInput::Result(result) => turn.submit(result),
            }
            if turn.is_complete() {
                break;
            }
        }
        Ok(())
    });

    // The writer stops on TurnComplete or once the reader drops the turn.
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(anyhow!(e)),
            Err(panic) => return Err(anyhow!(panic)),
        }
    }
    Ok(())
}
