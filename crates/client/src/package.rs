//! Packaging of rendered documents for delivery.

use cfpdf_core::{Error, RenderedDocument};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Outcome of one problem within a contest batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItemStatus {
    Success(RenderedDocument),
    /// Every fetch attempt failed; only a placeholder could be produced.
    Placeholder { reason: String },
    /// The run faulted (e.g. the renderer failed).
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub label: String,
    pub status: BatchItemStatus,
}

impl BatchItem {
    pub fn document(&self) -> Option<&RenderedDocument> {
        match &self.status {
            BatchItemStatus::Success(doc) => Some(doc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn message(&self) -> String {
        if self.skipped == 0 {
            format!("converted {} of {} problems", self.succeeded, self.total)
        } else {
            format!("converted {} of {} problems ({} skipped)", self.succeeded, self.total, self.skipped)
        }
    }
}

/// Per-label results of a contest run, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub contest_id: u32,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let succeeded = self.documents().count();
        BatchSummary { total: self.items.len(), succeeded, skipped: self.items.len() - succeeded }
    }

    /// Successfully rendered documents only.
    pub fn documents(&self) -> impl Iterator<Item = &RenderedDocument> {
        self.items.iter().filter_map(BatchItem::document)
    }

    /// Download name for this contest's archive.
    pub fn archive_name(&self) -> String {
        archive_name(self.contest_id)
    }

    /// Deflated zip of every successful document.
    pub fn to_archive(&self) -> Result<Vec<u8>, Error> {
        build_archive(self.documents())
    }
}

pub fn archive_name(contest_id: u32) -> String {
    format!("contest_{contest_id}_problems.zip")
}

fn build_archive<'a>(documents: impl Iterator<Item = &'a RenderedDocument>) -> Result<Vec<u8>, Error> {
    let archive_err = |e: zip::result::ZipError| Error::ArchiveFailed(e.to_string());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for doc in documents {
        zip.start_file(doc.file_name.as_str(), options).map_err(archive_err)?;
        zip.write_all(&doc.content)?;
    }

    Ok(zip.finish().map_err(archive_err)?.into_inner())
}

/// Write `doc` under `dir`, creating the directory. Existing files are overwritten.
pub async fn write_document(dir: &Path, doc: &RenderedDocument) -> Result<PathBuf, Error> {
    write_bytes(dir, &doc.file_name, &doc.content).await
}

/// Write raw bytes (e.g. a batch archive) under `dir`.
pub async fn write_bytes(dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf, Error> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, content).await?;
    Ok(path)
}
