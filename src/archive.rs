//! Archive traversal under admission policy

use std::io::{Read, Seek};

use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::analyzer::Analyzer;
use crate::pipeline::{PipelineError, PipelineResult};
use crate::policy::Policy;
use crate::render::{error_artifact, render};

/// Body of the artifact produced for an encrypted entry.
pub const ENCRYPTED_ENTRY_TEXT: &str = "This file is encrypted, we can't process it";

/// Body of the artifact produced for an entry over the size cap.
pub const OVERSIZED_ENTRY_TEXT: &str = "This file is too big, we can't process it";

/// Status text for an archive that yields no artifacts at all.
pub const NO_MATCHING_ENTRIES_TEXT: &str = "No log files found in the provided zip archive.";

/// Status text emitted when the artifact cap stops traversal early.
pub fn truncation_notice(processed: usize) -> String {
    format!(
        "Too many log files inside zip archive, we're processed only first {} of them.",
        processed
    )
}

/// Metadata for one archive member, available without touching its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub name: String,
    pub is_dir: bool,
    pub encrypted: bool,
    /// Decompressed size in bytes, as recorded in the central directory.
    pub size: u64,
}

/// Failure reading the container or one of its members.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("failed to read the archive container: {0}")]
    Container(#[from] ZipError),
    #[error("failed to read archive entry {name:?}: {source}")]
    Entry {
        name: String,
        source: std::io::Error,
    },
}

/// A container whose members can be enumerated in directory order.
///
/// Index order is the order recorded in the container's central directory,
/// which is the authoritative traversal order. Payload bytes are fetched
/// only for entries that pass admission, via [`EntrySource::entry_bytes`].
pub trait EntrySource {
    fn entry_count(&mut self) -> usize;
    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta, ContainerError>;
    fn entry_bytes(&mut self, index: usize) -> Result<Vec<u8>, ContainerError>;
}

/// [`EntrySource`] over a zip image behind any seekable reader.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    /// Open a zip container, reading its central directory.
    pub fn open(reader: R) -> Result<Self, ContainerError> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn entry_count(&mut self) -> usize {
        self.archive.len()
    }

    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta, ContainerError> {
        // A full lookup refuses encrypted members outright; that refusal is
        // the only encryption signal the reader exposes.
        let encrypted = match self.archive.by_index(index) {
            Ok(_) => false,
            Err(ZipError::UnsupportedArchive(reason)) if reason == ZipError::PASSWORD_REQUIRED => {
                true
            }
            Err(err) => return Err(err.into()),
        };

        // The raw lookup never decrypts or decompresses.
        let entry = self.archive.by_index_raw(index)?;
        Ok(EntryMeta {
            name: entry.name().to_string(),
            is_dir: entry.is_dir(),
            encrypted,
            size: entry.size(),
        })
    }

    fn entry_bytes(&mut self, index: usize) -> Result<Vec<u8>, ContainerError> {
        let mut entry = self.archive.by_index(index)?;
        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| ContainerError::Entry { name, source })?;
        Ok(bytes)
    }
}

/// Walk an archive, analyze admitted entries and collect rendered artifacts.
///
/// Per-entry conditions never abort the batch: encrypted and oversized
/// entries become alert artifacts, entries the analyzer rejects (and
/// entries whose payload cannot be read) are dropped from the output. Only
/// a renderer contract violation propagates.
pub fn scan(
    source: &mut impl EntrySource,
    analyzer: &impl Analyzer,
    policy: &Policy,
) -> Result<PipelineResult, PipelineError> {
    let mut artifacts = Vec::new();
    let mut status = None;
    let mut dropped = 0usize;

    let count = source.entry_count();
    for index in 0..count {
        // The cap counts every produced artifact, error artifacts included,
        // and is checked before the next candidate is examined.
        if artifacts.len() >= policy.max_artifacts {
            status = Some(truncation_notice(artifacts.len()));
            break;
        }

        let meta = match source.entry_meta(index) {
            Ok(meta) => meta,
            Err(err) => {
                dropped += 1;
                warn!(index, error = %err, "dropping unreadable archive entry");
                continue;
            }
        };

        if meta.is_dir {
            continue;
        }
        if !policy.admits_log_name(&meta.name) {
            continue;
        }
        if meta.encrypted {
            artifacts.push(error_artifact(&meta.name, ENCRYPTED_ENTRY_TEXT));
            continue;
        }
        if meta.size > policy.max_entry_size {
            artifacts.push(error_artifact(&meta.name, OVERSIZED_ENTRY_TEXT));
            continue;
        }

        let bytes = match source.entry_bytes(index) {
            Ok(bytes) => bytes,
            Err(err) => {
                dropped += 1;
                warn!(entry = %meta.name, error = %err, "dropping unreadable archive entry");
                continue;
            }
        };

        match analyzer.analyze(&bytes) {
            Ok(record) => artifacts.push(render(&record, &meta.name, policy)?),
            Err(err) => {
                dropped += 1;
                debug!(entry = %meta.name, error = %err, "dropping entry the analyzer rejected");
            }
        }
    }

    if dropped > 0 {
        info!(dropped, "archive entries dropped without an artifact");
    }

    if artifacts.is_empty() {
        return Ok(PipelineResult {
            artifacts,
            status: Some(NO_MATCHING_ENTRIES_TEXT.to_string()),
        });
    }

    Ok(PipelineResult { artifacts, status })
}
