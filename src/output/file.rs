//! File output handlers (text and JSON)

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// A finding as written to the results file
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct VhostResult {
    pub host: String,
    pub ip: String,
    pub port: u16,
    pub path: String,
    pub status: u16,
    pub size: Option<u64>,
}

/// File writer with buffering
pub struct FileWriter {
    file: Mutex<File>,
    json_mode: bool,
    first_entry: Mutex<bool>,
}

impl FileWriter {
    pub async fn new(path: &Path) -> std::io::Result<Self> {
        let json_mode = path.extension().map(|ext| ext == "json").unwrap_or(false);

        let mut file = File::create(path).await?;

        if json_mode {
            file.write_all(b"[\n").await?;
        }

        Ok(Self {
            file: Mutex::new(file),
            json_mode,
            first_entry: Mutex::new(true),
        })
    }

    pub async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    pub async fn write_json<T: Serialize>(&self, item: &T) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        let mut first = self.first_entry.lock().await;

        if !*first {
            file.write_all(b",\n").await?;
        }
        *first = false;

        let json = serde_json::to_string_pretty(item).map_err(std::io::Error::other)?;
        file.write_all(json.as_bytes()).await?;

        Ok(())
    }

    /// Write a finding in whichever format the file was opened with.
    pub async fn write_result(&self, result: &VhostResult) -> std::io::Result<()> {
        if self.json_mode {
            self.write_json(result).await
        } else {
            let size = result
                .size
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-1".to_string());
            let line = format!(
                "{} [{}:{}{}] (Status: {}) [Size: {}]",
                result.host, result.ip, result.port, result.path, result.status, size
            );
            self.write_line(&line).await
        }
    }

    pub async fn finalize(&self) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        if self.json_mode {
            file.write_all(b"\n]\n").await?;
        }
        file.flush().await
    }
}

/// Output handler that can write to both console and file
pub struct OutputHandler {
    file_writer: Option<Arc<FileWriter>>,
}

impl OutputHandler {
    pub async fn new(output_path: Option<&Path>) -> std::io::Result<Self> {
        let file_writer = if let Some(path) = output_path {
            Some(Arc::new(FileWriter::new(path).await?))
        } else {
            None
        };

        Ok(Self { file_writer })
    }

    pub fn file_writer(&self) -> Option<Arc<FileWriter>> {
        self.file_writer.clone()
    }

    pub async fn finalize(&self) -> std::io::Result<()> {
        if let Some(ref writer) = self.file_writer {
            writer.finalize().await?;
        }
        Ok(())
    }
}
