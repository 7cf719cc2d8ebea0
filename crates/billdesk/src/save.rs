//! Delivering the finished PDF.
//!
//! [`save`] names the file from the customer and the current time, then hands
//! the bytes to a [`DownloadSink`]. Sinks store a file completely or not at
//! all.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use crate::error::ExportResult;
use crate::filename::invoice_filename;
use crate::pdf::AssembledPdf;

/// How many ` (n)` suffixes [`DirectorySink`] tries before giving up.
const MAX_DUPLICATE_SUFFIX: u32 = 99;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Destination for finished files.
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` as `file_name` and return where it landed. On error
    /// nothing is stored.
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

impl<T: DownloadSink + ?Sized> DownloadSink for Arc<T> {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        (**self).deliver(file_name, bytes)
    }
}

/// Writes files into a directory, like a browser's download folder.
///
/// Data goes to a temporary file in the same directory first and is renamed
/// into place once complete. An existing file is never overwritten; the new
/// one gets a ` (1)`, ` (2)`, ... suffix instead.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        let mut target = self.dir.join(file_name);
        let mut suffix = 0;
        loop {
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(e)
                    if e.error.kind() == io::ErrorKind::AlreadyExists
                        && suffix < MAX_DUPLICATE_SUFFIX =>
                {
                    suffix += 1;
                    tmp = e.file;
                    target = self.dir.join(numbered(file_name, suffix));
                }
                Err(e) => return Err(e.error),
            }
        }
    }
}

/// `Invoice_x_1.pdf` -> `Invoice_x_1 (n).pdf`.
fn numbered(file_name: &str, n: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem} ({n}).{ext}"),
        None => format!("{file_name} ({n})"),
    }
}

/// Keeps delivered files in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered files in delivery order.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?;
        files.push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// A delivered PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Name chosen from the customer and timestamp.
    pub file_name: String,
    /// Where the sink stored it.
    pub location: PathBuf,
    /// Size in bytes.
    pub size: usize,
}

/// Name `pdf` after `customer` and the clock's current time, then deliver it.
pub fn save(
    pdf: &AssembledPdf,
    customer: &str,
    clock: &dyn Clock,
    sink: &dyn DownloadSink,
) -> ExportResult<SavedFile> {
    let file_name = invoice_filename(customer, clock.now_ms());
    let location = sink.deliver(&file_name, pdf.bytes())?;
    tracing::info!(file = %location.display(), bytes = pdf.bytes().len(), "saved invoice PDF");
    Ok(SavedFile {
        file_name,
        location,
        size: pdf.bytes().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    /// Fails every delivery.
    struct BrokenSink;

    impl DownloadSink for BrokenSink {
        fn deliver(&self, _: &str, _: &[u8]) -> io::Result<PathBuf> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn system_clock_is_after_2023() {
        assert!(SystemClock.now_ms() > 1_700_000_000_000);
    }

    #[test]
    fn directory_sink_writes_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let path = sink.deliver("Invoice_A_1.pdf", b"%PDF-1.5 body").unwrap();
        assert_eq!(path, dir.path().join("Invoice_A_1.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 body");
        assert_eq!(entries(dir.path()), vec!["Invoice_A_1.pdf"]);
    }

    #[test]
    fn directory_sink_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        sink.deliver("Invoice_A_1.pdf", b"first").unwrap();
        let second = sink.deliver("Invoice_A_1.pdf", b"second").unwrap();
        assert_eq!(second, dir.path().join("Invoice_A_1 (1).pdf"));
        assert_eq!(std::fs::read(dir.path().join("Invoice_A_1.pdf")).unwrap(), b"first");
        assert_eq!(std::fs::read(second).unwrap(), b"second");
    }

    #[test]
    fn directory_sink_missing_dir_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("missing"));
        assert!(sink.deliver("Invoice_A_1.pdf", b"x").is_err());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn numbered_keeps_extension() {
        assert_eq!(numbered("Invoice_A_1.pdf", 2), "Invoice_A_1 (2).pdf");
        assert_eq!(numbered("noext", 1), "noext (1)");
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.deliver("a.pdf", b"1").unwrap();
        sink.deliver("b.pdf", b"2").unwrap();
        let files = sink.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], ("a.pdf".to_string(), b"1".to_vec()));
        assert_eq!(files[1].0, "b.pdf");
    }

    #[test]
    fn sink_failure_is_io_error() {
        let png = billdesk_raster::to_image(
            &billdesk_raster::Bitmap::filled(2, 2, billdesk_core::Color::WHITE).unwrap(),
        )
        .unwrap();
        let pdf = crate::pdf::assemble_pdf(&png, "A").unwrap();
        let err = save(&pdf, "A", &FixedClock(1), &BrokenSink).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn save_names_file_from_clock() {
        let png = billdesk_raster::to_image(
            &billdesk_raster::Bitmap::filled(2, 2, billdesk_core::Color::WHITE).unwrap(),
        )
        .unwrap();
        let pdf = crate::pdf::assemble_pdf(&png, "").unwrap();
        let sink = MemorySink::new();
        let saved = save(&pdf, "", &FixedClock(1_700_000_000_000), &sink).unwrap();
        assert_eq!(saved.file_name, "Invoice_Customer_1700000000000.pdf");
        assert_eq!(saved.size, pdf.bytes().len());
        assert_eq!(sink.files()[0].1, pdf.bytes());
    }
}
