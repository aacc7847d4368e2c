use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const ROTATION_MARKER: &[u8] = b"--- Log rotated (older entries removed) ---\n";

/// Size-based trimming of an append-only log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogRotation {
    /// File size that triggers trimming
    max_bytes: u64,
    /// Tail kept after trimming, cut forward to a line start
    keep_bytes: u64,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            keep_bytes: 1024 * 1024,
        }
    }
}

impl LogRotation {
    /// Trim `path` to its most recent lines. Returns whether the file was rewritten.
    fn apply(&self, path: &Path) -> io::Result<bool> {
        let len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if len <= self.max_bytes {
            return Ok(false);
        }

        let mut tail = Vec::new();
        {
            let mut file = File::open(path)?;
            file.seek(SeekFrom::Start(len.saturating_sub(self.keep_bytes)))?;
            file.read_to_end(&mut tail)?;
        }
        let first_line = tail
            .iter()
            .position(|&b| b == b'\n')
            .map_or(0, |i| i + 1);

        let mut file = File::create(path)?;
        file.write_all(ROTATION_MARKER)?;
        file.write_all(&tail[first_line..])?;
        Ok(true)
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let default_filter = format!("folioscan={level},folioscan_core={level}");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Initialize logging to stderr, or to `log_file` when given.
///
/// A log file is appended to and trimmed to its last 1MB once it grows past
/// 5MB. `RUST_LOG` overrides `level`.
pub fn init_logging(log_file: Option<&Path>, level: &str) -> color_eyre::Result<()> {
    let filter = env_filter(level);

    match log_file {
        Some(log_path) => {
            if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            let rotated = LogRotation::default().apply(log_path).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to rotate log file: {e}");
                false
            });

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(false),
                )
                .init();

            tracing::info!(log_path = %log_path.display(), rotated, "folioscan logging initialized");
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rotate_keeps_recent_whole_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("folioscan.log");
        let content: String = (0..100).map(|i| format!("line {i:03}\n")).collect();
        fs::write(&path, &content).unwrap();

        let rotation = LogRotation {
            max_bytes: 100,
            keep_bytes: 50,
        };
        assert!(rotation.apply(&path).unwrap());

        let rotated = fs::read_to_string(&path).unwrap();
        let mut lines = rotated.lines();
        assert_eq!(lines.next(), Some("--- Log rotated (older entries removed) ---"));
        let kept: Vec<&str> = lines.collect();
        assert!(!kept.is_empty());
        assert!(kept.iter().all(|l| l.starts_with("line ")));
        assert_eq!(kept.last(), Some(&"line 099"));
        assert!(rotated.len() < content.len());
    }

    #[test]
    fn test_default_rotation_limits() {
        let rotation = LogRotation::default();
        assert_eq!(rotation.max_bytes, 5 * 1024 * 1024);
        assert_eq!(rotation.keep_bytes, 1024 * 1024);
    }

    #[test]
    fn test_small_or_missing_log_is_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("folioscan.log");
        let rotation = LogRotation {
            max_bytes: 100,
            keep_bytes: 50,
        };
        assert!(!rotation.apply(&path).unwrap());
        assert!(!path.exists());

        fs::write(&path, "short\n").unwrap();
        assert!(!rotation.apply(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
    }
}
