use anyhow::Context;
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::wire::ChatRequest;

#[derive(Debug, Serialize)]
struct SavedReply<'a> {
    saved_at: DateTime<Utc>,
    turn: usize,
    content: &'a str,
}

fn tx_dir(root: &Path, session: Uuid) -> PathBuf {
    root.join(".vibe").join("tx").join(session.to_string())
}

/// Write-only record of what was sent and received, one file pair per turn.
pub struct Transcript {
    dir: PathBuf,
    turn: usize,
    save_request: bool,
    save_response: bool,
}

impl Transcript {
    /// `None` when neither half is wanted.
    pub fn new(
        root: &Path,
        session: Uuid,
        save_request: bool,
        save_response: bool,
    ) -> Option<Self> {
        if !save_request && !save_response {
            return None;
        }
        Some(Self {
            dir: tx_dir(root, session),
            turn: 0,
            save_request,
            save_response,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn turn_path(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("turn-{}.{kind}.json", self.turn))
    }

    pub fn save_turn(&mut self, req: &ChatRequest, reply: &str) -> anyhow::Result<()> {
        self.turn += 1;
        fs::create_dir_all(&self.dir)?;

        if self.save_request {
            let p = self.turn_path("request");
            fs::write(&p, to_string_pretty(req)?)
                .with_context(|| format!("writing {}", p.display()))?;
            log::debug!("turn {}: request saved at {}", self.turn, p.display());
        }

        if self.save_response {
            let p = self.turn_path("response");
            let saved = SavedReply { saved_at: Utc::now(), turn: self.turn, content: reply };
            fs::write(&p, to_string_pretty(&saved)?)
                .with_context(|| format!("writing {}", p.display()))?;
            log::debug!("turn {}: response saved at {}", self.turn, p.display());
        }

        Ok(())
    }
}
