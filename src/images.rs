//! Turns local image files into self-contained `data:` URIs so the store never
//! needs file storage of its own.
//!
//! Each requested file is read on a short-lived thread and the result comes
//! back over a channel. The UI drains the channel on every tick, so results
//! are accepted in the order the reads finish, not the order they were asked
//! for.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{path} is not a supported image file")]
    UnsupportedType { path: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Guess the MIME type from the file extension. Only image types are accepted.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read one file synchronously and encode it.
pub fn read_as_data_uri(path: &Path) -> Result<String, IngestError> {
    let display = path.display().to_string();
    let mime = mime_for(path).ok_or_else(|| IngestError::UnsupportedType {
        path: display.clone(),
    })?;
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: display,
        source,
    })?;
    Ok(encode_data_uri(mime, &bytes))
}

/// Where a finished read should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    /// Replaces the profile image of the child being created.
    Profile,
    /// Appended to the image list of the artwork being created.
    Artwork,
}

/// A completed read. `ticket` identifies the form that asked for it, so
/// results for a form that has since been closed can be dropped.
#[derive(Debug)]
pub struct Ingested {
    pub ticket: u64,
    pub slot: ImageSlot,
    pub path: PathBuf,
    pub result: Result<String, IngestError>,
}

pub struct ImageIngestor {
    tx: Sender<Ingested>,
    rx: Receiver<Ingested>,
    in_flight: HashMap<u64, usize>,
}

impl ImageIngestor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: HashMap::new(),
        }
    }

    /// Start reading `path` in the background.
    pub fn request(&mut self, ticket: u64, slot: ImageSlot, path: PathBuf) {
        *self.in_flight.entry(ticket).or_insert(0) += 1;
        debug!(ticket, path = %path.display(), "image read requested");

        let tx = self.tx.clone();
        let job_path = path.clone();
        let spawned = thread::Builder::new()
            .name("image-read".to_string())
            .spawn(move || {
                let result = read_as_data_uri(&job_path);
                // The receiver only disappears when the app is shutting down.
                let _ = tx.send(Ingested {
                    ticket,
                    slot,
                    path: job_path,
                    result,
                });
            });

        if let Err(source) = spawned {
            warn!(%source, "could not spawn image reader");
            let _ = self.tx.send(Ingested {
                ticket,
                slot,
                path: path.clone(),
                result: Err(IngestError::Io {
                    path: path.display().to_string(),
                    source,
                }),
            });
        }
    }

    /// Reads still running for `ticket`.
    pub fn pending(&self, ticket: u64) -> usize {
        self.in_flight.get(&ticket).copied().unwrap_or(0)
    }

    /// Collect whatever has finished, without blocking.
    pub fn poll(&mut self) -> Vec<Ingested> {
        let mut done = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            self.settle(item.ticket);
            done.push(item);
        }
        done
    }

    fn settle(&mut self, ticket: u64) {
        if let Some(count) = self.in_flight.get_mut(&ticket) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(&ticket);
            }
        }
    }
}

#[cfg(test)]
impl ImageIngestor {
    /// Block until every read for `ticket` has finished or `timeout` passes.
    /// Completions for other tickets are returned as well.
    pub(crate) fn wait_for(&mut self, ticket: u64, timeout: std::time::Duration) -> Vec<Ingested> {
        use std::sync::mpsc::RecvTimeoutError;
        use std::time::Instant;

        let deadline = Instant::now() + timeout;
        let mut done = Vec::new();
        while self.pending(ticket) > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(item) => {
                    self.settle(item.ticket);
                    done.push(item);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        done
    }
}

impl Default for ImageIngestor {
    fn default() -> Self {
        Self::new()
    }
}

/// Short description of an image reference for list views. Inline images
/// would otherwise flood the terminal with base64.
pub fn describe_image_ref(reference: &str) -> String {
    if let Some(rest) = reference.strip_prefix("data:") {
        let mime = rest.split(';').next().unwrap_or("image");
        let payload = rest.split_once(',').map(|(_, p)| p.len()).unwrap_or(0);
        let approx_bytes = payload / 4 * 3;
        format!("[inline {mime}, {}]", human_size(approx_bytes))
    } else {
        reference.to_string()
    }
}

/// Whether a reference can be handed to the system browser.
pub fn is_web_ref(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn encodes_png_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "dot.PNG", b"abc");
        let uri = read_as_data_uri(&path).unwrap();
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }

    #[test]
    fn rejects_non_image_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "notes.txt", b"hi");
        assert!(matches!(
            read_as_data_uri(&path),
            Err(IngestError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_as_data_uri(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn background_reads_report_every_request() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.png", b"a");
        let b = write_file(dir.path(), "b.gif", b"b");
        let mut ingestor = ImageIngestor::new();

        ingestor.request(7, ImageSlot::Artwork, a.clone());
        ingestor.request(7, ImageSlot::Artwork, b.clone());
        ingestor.request(8, ImageSlot::Profile, dir.path().join("missing.png"));
        assert_eq!(ingestor.pending(7), 2);

        let mut done = ingestor.wait_for(7, Duration::from_secs(5));
        done.extend(ingestor.wait_for(8, Duration::from_secs(5)));

        assert_eq!(ingestor.pending(7), 0);
        assert_eq!(ingestor.pending(8), 0);
        assert_eq!(done.len(), 3);
        let mut ok_paths: Vec<_> = done
            .iter()
            .filter(|d| d.ticket == 7 && d.result.is_ok())
            .map(|d| d.path.clone())
            .collect();
        ok_paths.sort();
        assert_eq!(ok_paths, vec![a, b]);
        assert!(done.iter().any(|d| d.ticket == 8 && d.result.is_err()));
    }

    #[test]
    fn describes_inline_images_compactly() {
        let uri = encode_data_uri("image/jpeg", &[0u8; 3000]);
        assert_eq!(describe_image_ref(&uri), "[inline image/jpeg, 2.9 KB]");
        assert_eq!(describe_image_ref("https://x/y.png"), "https://x/y.png");
        assert!(is_web_ref("https://x/y.png"));
        assert!(!is_web_ref(&uri));
    }
}
