//! Structured log records produced by the analyzer

use serde::Deserialize;

/// Analysis result for one log, tagged by the analyzer's `type` field.
///
/// The two known shapes carry disjoint field groups. Any other tag value
/// deserializes into [`LogRecord::Unknown`] so the renderer can reject it
/// explicitly instead of a new tag string being dropped on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum LogRecord {
    /// Emulator main process log.
    #[serde(rename = "main-process")]
    MainProcess(MainProcessLog),
    /// Guest title (child process) log.
    #[serde(rename = "child-process")]
    ChildProcess(ChildProcessLog),
    /// A record type this build does not know how to render.
    #[serde(other)]
    Unknown,
}

/// Fields reported for a main process log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MainProcessLog {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(rename = "user-gpu")]
    pub user_gpu: String,
    #[serde(rename = "user-lang")]
    pub user_lang: String,
}

/// Fields reported for a child process (guest title) log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChildProcessLog {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    pub title_id: String,
    /// Whether the title ran in PS4 Pro (Neo) mode.
    pub title_neo: bool,
    /// Firmware libraries the title loaded, in load order.
    #[serde(default)]
    pub firmware: Vec<String>,
}

impl LogRecord {
    /// The tag string the analyzer uses for this record shape.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MainProcess(_) => "main-process",
            Self::ChildProcess(_) => "child-process",
            Self::Unknown => "unknown",
        }
    }

    /// Taxonomy labels attached to the record, in analyzer order.
    pub fn labels(&self) -> &[String] {
        match self {
            Self::MainProcess(log) => &log.labels,
            Self::ChildProcess(log) => &log.labels,
            Self::Unknown => &[],
        }
    }

    /// Advisory notes attached to the record, in analyzer order.
    pub fn hints(&self) -> &[String] {
        match self {
            Self::MainProcess(log) => &log.hints,
            Self::ChildProcess(log) => &log.hints,
            Self::Unknown => &[],
        }
    }
}
