//! Append-only record of successful mutations, plus the optional push hook.
//!
//! Recording is fire-and-forget: a failed log write or hook launch never
//! fails the mutation that triggered it, and nothing is retried.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line in `events.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEvent {
    pub event_id: Uuid,
    pub action: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MutationLog {
    path: PathBuf,
    push_command: Option<String>,
    work_dir: PathBuf,
}

impl MutationLog {
    pub fn new(data_dir: &Path, push_command: Option<String>, work_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join("events.jsonl"),
            push_command,
            work_dir,
        }
    }

    /// Records a mutation and launches the configured push command, if any.
    pub fn record(&self, action: &str, details: serde_json::Value) {
        let event = MutationEvent {
            event_id: Uuid::new_v4(),
            action: action.to_string(),
            details,
            timestamp: Utc::now(),
        };
        let _ = self.append(&event);
        self.run_push_hook();
    }

    fn append(&self, event: &MutationEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(serde_json::to_string(event)?.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    fn run_push_hook(&self) {
        let Some(command) = &self.push_command else {
            return;
        };
        let _ = Command::new("sh")
            .args(["-c", command])
            .current_dir(&self.work_dir)
            .spawn();
    }

    /// Reads the full event history; used by tooling and tests.
    pub fn load(&self) -> Result<Vec<MutationEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let mut events = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            let event: MutationEvent = serde_json::from_str(line)?;
            events.push(event);
        }
        Ok(events)
    }
}
