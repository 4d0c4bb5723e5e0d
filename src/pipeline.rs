//! Submission classification and pipeline orchestration

use std::io::Cursor;

use tracing::debug;

use crate::analyzer::{AnalysisFailure, Analyzer};
use crate::archive::{scan, ContainerError, ZipSource};
use crate::policy::Policy;
use crate::render::{render, RenderError, RenderedArtifact};

/// One user-submitted log payload, a single log file or an archive of them.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Declared filename, used for classification and as the single-file
    /// artifact title. Never inspected beyond its extension.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Submission {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Shape of a submission, derived from its declared name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    SingleFile,
    Archive,
}

/// Classify a submission by its declared name, without reading any bytes.
pub fn resolve_kind(name: &str, policy: &Policy) -> Result<SubmissionKind, PipelineError> {
    if policy.admits_log_name(name) {
        Ok(SubmissionKind::SingleFile)
    } else if policy.admits_archive_name(name) {
        Ok(SubmissionKind::Archive)
    } else {
        Err(PipelineError::UnsupportedFormat)
    }
}

/// Final output of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    /// Rendered artifacts in traversal order.
    pub artifacts: Vec<RenderedArtifact>,
    /// Informational text, a truncation notice or the no-matches message.
    pub status: Option<String>,
}

/// Submission-level failure, classified and user-displayable.
///
/// The Display strings are part of the observable contract and must stay
/// stable for existing consumers.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Submission name matches neither admissible extension.
    #[error("Please attach a .p7d or .zip file.")]
    UnsupportedFormat,
    /// The analyzer rejected a single-file submission outright.
    #[error("Error processing the log file! Your log file might be empty or corrupted.")]
    Analysis(#[from] AnalysisFailure),
    /// The archive container itself could not be opened or walked.
    #[error("Error processing the log file! Your log file might be empty or corrupted.")]
    Archive(#[from] ContainerError),
    /// The analyzer and the renderer disagree about the record space.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The ingestion pipeline: resolves a submission, drives analysis and
/// rendering, and assembles the final artifact list.
///
/// The only component the command front end talks to.
pub struct Pipeline<A> {
    analyzer: A,
    policy: Policy,
}

impl<A: Analyzer> Pipeline<A> {
    pub fn new(analyzer: A, policy: Policy) -> Self {
        Self { analyzer, policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Resolve the submission shape and dispatch to the matching path.
    pub fn process(&self, submission: &Submission) -> Result<PipelineResult, PipelineError> {
        match resolve_kind(&submission.name, &self.policy)? {
            SubmissionKind::SingleFile => self.process_single(submission),
            SubmissionKind::Archive => self.process_archive(submission),
        }
    }

    /// Analyze one standalone log file and render exactly one artifact.
    ///
    /// Unlike the archive path, an analyzer failure here is fatal to the
    /// call; a lone submission that cannot be analyzed is a user-visible
    /// error, not a silent drop.
    pub fn process_single(&self, submission: &Submission) -> Result<PipelineResult, PipelineError> {
        if resolve_kind(&submission.name, &self.policy)? != SubmissionKind::SingleFile {
            return Err(PipelineError::UnsupportedFormat);
        }

        debug!(name = %submission.name, size = submission.bytes.len(), "analyzing single log submission");
        let record = self.analyzer.analyze(&submission.bytes)?;
        let artifact = render(&record, &submission.name, &self.policy)?;

        Ok(PipelineResult {
            artifacts: vec![artifact],
            status: None,
        })
    }

    /// Traverse an archive submission and render artifacts per entry.
    pub fn process_archive(&self, submission: &Submission) -> Result<PipelineResult, PipelineError> {
        if resolve_kind(&submission.name, &self.policy)? != SubmissionKind::Archive {
            return Err(PipelineError::UnsupportedFormat);
        }

        debug!(name = %submission.name, size = submission.bytes.len(), "scanning archive submission");
        let mut source = ZipSource::open(Cursor::new(submission.bytes.as_slice()))?;
        scan(&mut source, &self.analyzer, &self.policy)
    }
}
