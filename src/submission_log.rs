// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Append-only plaintext log of delivered submissions. Never read back.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One delivered submission.
#[derive(Debug, Clone)]
pub struct SubmissionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub client_addr: String,
}

impl SubmissionLogEntry {
    /// `[YYYY-MM-DD HH:MM:SS] Name: … | Email: … | Subject: … | IP: …`
    pub fn to_line(&self) -> String {
        format!(
            "[{}] Name: {} | Email: {} | Subject: {} | IP: {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            one_line(&self.name),
            one_line(&self.email),
            one_line(&self.subject),
            one_line(&self.client_addr),
        )
    }
}

fn one_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

pub struct SubmissionLog {
    path: PathBuf,
    // Keeps concurrent appends from interleaving within this process
    write_lock: Mutex<()>,
}

impl SubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry`, creating the file and its directory as needed.
    pub async fn append(&self, entry: &SubmissionLogEntry) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.to_line().as_bytes()).await?;
        file.flush().await
    }
}
