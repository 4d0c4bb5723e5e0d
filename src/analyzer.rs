//! Boundary to the external log analyzer

use crate::record::LogRecord;

/// Generic analyzer failure.
///
/// Every analyzer-side error, from rejected input bytes to malformed
/// output, collapses into this one opaque kind. Callers cannot distinguish
/// subkinds and are not meant to.
#[derive(Debug, thiserror::Error)]
#[error("analyzer could not process the submitted bytes")]
pub struct AnalysisFailure(#[from] anyhow::Error);

impl AnalysisFailure {
    /// Wrap any error as an analysis failure.
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

/// The opaque log analyzer, consumed as a function from bytes to a record.
///
/// Byte-level knowledge of the log format lives exclusively behind this
/// trait. Production bindings wrap the native analyzer; tests use closures
/// returning canned records.
pub trait Analyzer {
    fn analyze(&self, bytes: &[u8]) -> Result<LogRecord, AnalysisFailure>;
}

impl<F> Analyzer for F
where
    F: Fn(&[u8]) -> Result<LogRecord, AnalysisFailure>,
{
    fn analyze(&self, bytes: &[u8]) -> Result<LogRecord, AnalysisFailure> {
        self(bytes)
    }
}

/// Adapter over an analyzer backend that reports its findings as JSON.
///
/// The native analyzer emits a single JSON document per run; this adapter
/// deserializes it into the tagged [`LogRecord`] shape and nothing more.
/// Field contents are not inspected or validated here.
pub struct JsonAnalyzer<F> {
    run: F,
}

impl<F> JsonAnalyzer<F>
where
    F: Fn(&[u8]) -> anyhow::Result<String>,
{
    /// Create an adapter around a backend run function.
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

impl<F> Analyzer for JsonAnalyzer<F>
where
    F: Fn(&[u8]) -> anyhow::Result<String>,
{
    fn analyze(&self, bytes: &[u8]) -> Result<LogRecord, AnalysisFailure> {
        let raw = (self.run)(bytes).map_err(AnalysisFailure::new)?;
        serde_json::from_str(&raw).map_err(AnalysisFailure::new)
    }
}
