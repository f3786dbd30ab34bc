//! Transition history persistence.
//!
//! One JSON object per line, appended in delivery order. The same file is
//! read back at startup to recover each host's last confirmed state.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use crate::health::{LinkState, Transition};
use crate::sink::{SinkError, TransitionSink};

/// Appends transitions to a JSON-lines file.
#[derive(Debug, Clone)]
pub struct HistorySink {
    path: PathBuf,
}

impl HistorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TransitionSink for HistorySink {
    fn name(&self) -> &'static str {
        "history"
    }

    async fn notify(&self, transition: &Transition) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(transition)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Latest recorded state per address. A missing file yields an empty map;
/// unparsable lines are skipped.
pub fn load_latest_states(path: &Path) -> std::io::Result<HashMap<String, LinkState>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e),
    };

    let mut latest = HashMap::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Transition>(&line) {
            Ok(t) => {
                latest.insert(t.address, t.to);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), line = index + 1, error = %e, "Skipping malformed history record");
            }
        }
    }
    tracing::info!(path = %path.display(), hosts = latest.len(), "Loaded transition history");
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HostState;

    fn transition(address: &str, to: LinkState) -> Transition {
        let mut prior = HostState::new(address, LinkState::Up);
        prior.confirmed = if to == LinkState::Up { LinkState::Down } else { LinkState::Up };
        let mut next = prior.clone();
        next.confirmed = to;
        Transition::new(1, &prior, &next)
    }

    #[tokio::test]
    async fn test_history_round_trip_keeps_latest() {
        let path = std::env::temp_dir().join(format!("ping-checker-history-{}.jsonl", uuid::Uuid::new_v4()));
        let sink = HistorySink::new(&path);

        sink.notify(&transition("10.0.0.1", LinkState::Down)).await.unwrap();
        sink.notify(&transition("10.0.0.2", LinkState::Down)).await.unwrap();
        sink.notify(&transition("10.0.0.1", LinkState::Up)).await.unwrap();

        let latest = load_latest_states(&path).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["10.0.0.1"], LinkState::Up);
        assert_eq!(latest["10.0.0.2"], LinkState::Down);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_history_is_empty() {
        let latest = load_latest_states(Path::new("/nonexistent/history.jsonl")).unwrap();
        assert!(latest.is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let path = std::env::temp_dir().join(format!("ping-checker-history-{}.jsonl", uuid::Uuid::new_v4()));
        let good = serde_json::to_string(&transition("10.0.0.3", LinkState::Down)).unwrap();
        std::fs::write(&path, format!("not json\n\n{}\n", good)).unwrap();

        let latest = load_latest_states(&path).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["10.0.0.3"], LinkState::Down);

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
