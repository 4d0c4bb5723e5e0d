//! Unit tests for the archive traversal engine, over a stub entry source

use logan::archive::{
    scan, ContainerError, EntryMeta, EntrySource, ENCRYPTED_ENTRY_TEXT, NO_MATCHING_ENTRIES_TEXT,
    OVERSIZED_ENTRY_TEXT,
};
use logan::{
    AnalysisFailure, Analyzer, ColorTag, LogRecord, MainProcessLog, PipelineError, Policy,
    RenderError,
};

struct StubEntry {
    meta: EntryMeta,
    bytes: Vec<u8>,
    unreadable: bool,
}

struct StubSource {
    entries: Vec<StubEntry>,
}

impl StubSource {
    fn new(entries: Vec<StubEntry>) -> Self {
        Self { entries }
    }
}

impl EntrySource for StubSource {
    fn entry_count(&mut self) -> usize {
        self.entries.len()
    }

    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta, ContainerError> {
        Ok(self.entries[index].meta.clone())
    }

    fn entry_bytes(&mut self, index: usize) -> Result<Vec<u8>, ContainerError> {
        let entry = &self.entries[index];
        if entry.unreadable {
            return Err(ContainerError::Entry {
                name: entry.meta.name.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "crc mismatch"),
            });
        }
        Ok(entry.bytes.clone())
    }
}

fn file(name: &str, bytes: &[u8]) -> StubEntry {
    StubEntry {
        meta: EntryMeta {
            name: name.to_string(),
            is_dir: false,
            encrypted: false,
            size: bytes.len() as u64,
        },
        bytes: bytes.to_vec(),
        unreadable: false,
    }
}

fn dir(name: &str) -> StubEntry {
    StubEntry {
        meta: EntryMeta {
            name: name.to_string(),
            is_dir: true,
            encrypted: false,
            size: 0,
        },
        bytes: Vec::new(),
        unreadable: false,
    }
}

fn encrypted(name: &str) -> StubEntry {
    StubEntry {
        meta: EntryMeta {
            name: name.to_string(),
            is_dir: false,
            encrypted: true,
            size: 42,
        },
        bytes: Vec::new(),
        // Fetching the payload of a refused entry must never happen.
        unreadable: true,
    }
}

fn oversized(name: &str, size: u64) -> StubEntry {
    StubEntry {
        meta: EntryMeta {
            name: name.to_string(),
            is_dir: false,
            encrypted: false,
            size,
        },
        bytes: Vec::new(),
        unreadable: true,
    }
}

/// Analyzer that fails on payloads starting with "fail" and otherwise
/// echoes the payload into the GPU field, so tests can track identity.
fn echo_analyzer() -> impl Analyzer {
    |bytes: &[u8]| -> Result<LogRecord, AnalysisFailure> {
        if bytes.starts_with(b"fail") {
            return Err(AnalysisFailure::new(anyhow::anyhow!("unparseable log")));
        }
        Ok(LogRecord::MainProcess(MainProcessLog {
            labels: vec![],
            hints: vec![],
            user_gpu: String::from_utf8_lossy(bytes).into_owned(),
            user_lang: "en-US".to_string(),
        }))
    }
}

#[test]
fn truncation_caps_artifacts_and_names_processed_count() {
    let mut source = StubSource::new(vec![
        file("a.p7d", b"a"),
        file("b.p7d", b"b"),
        file("c.p7d", b"c"),
        file("d.p7d", b"d"),
        file("e.p7d", b"e"),
    ]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    assert_eq!(result.artifacts.len(), 3);
    assert_eq!(
        result.status.as_deref(),
        Some("Too many log files inside zip archive, we're processed only first 3 of them.")
    );
}

#[test]
fn cap_reached_on_last_entry_leaves_no_notice() {
    let mut source = StubSource::new(vec![
        file("a.p7d", b"a"),
        file("b.p7d", b"b"),
        file("c.p7d", b"c"),
    ]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    assert_eq!(result.artifacts.len(), 3);
    assert_eq!(result.status, None);
}

#[test]
fn directories_and_foreign_names_skip_without_consuming_cap() {
    let mut source = StubSource::new(vec![
        dir("logs/"),
        file("readme.txt", b"not a log"),
        file("a.p7d", b"a"),
        file("b.p7d", b"b"),
        file("c.p7d", b"c"),
    ]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    assert_eq!(result.artifacts.len(), 3);
    assert_eq!(result.status, None);
}

#[test]
fn encrypted_entry_becomes_alert_artifact() {
    let mut source = StubSource::new(vec![encrypted("locked.p7d")]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    assert_eq!(result.artifacts.len(), 1);
    let artifact = &result.artifacts[0];
    assert_eq!(artifact.title, "locked.p7d");
    assert_eq!(artifact.color, ColorTag::Alert);
    assert_eq!(artifact.body, ENCRYPTED_ENTRY_TEXT);
    assert_eq!(artifact.body, "This file is encrypted, we can't process it");
}

#[test]
fn oversized_entry_becomes_alert_artifact() {
    let policy = Policy::default();
    let mut source = StubSource::new(vec![oversized("huge.p7d", policy.max_entry_size + 1)]);
    let result = scan(&mut source, &echo_analyzer(), &policy).unwrap();
    assert_eq!(result.artifacts.len(), 1);
    let artifact = &result.artifacts[0];
    assert_eq!(artifact.title, "huge.p7d");
    assert_eq!(artifact.color, ColorTag::Alert);
    assert_eq!(artifact.body, OVERSIZED_ENTRY_TEXT);
    assert_eq!(artifact.body, "This file is too big, we can't process it");
}

#[test]
fn entry_exactly_at_size_cap_is_admitted() {
    let policy = Policy {
        max_entry_size: 3,
        ..Policy::default()
    };
    let mut source = StubSource::new(vec![file("ok.p7d", b"abc")]);
    let result = scan(&mut source, &echo_analyzer(), &policy).unwrap();
    assert_eq!(result.artifacts.len(), 1);
    assert_eq!(result.artifacts[0].color, ColorTag::Normal);
}

#[test]
fn error_artifacts_count_toward_cap() {
    let mut source = StubSource::new(vec![
        encrypted("one.p7d"),
        encrypted("two.p7d"),
        file("three.p7d", b"three"),
        file("four.p7d", b"four"),
    ]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    let titles: Vec<_> = result.artifacts.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["one.p7d", "two.p7d", "three.p7d"]);
    assert_eq!(
        result.status.as_deref(),
        Some("Too many log files inside zip archive, we're processed only first 3 of them.")
    );
}

#[test]
fn analyzer_failure_drops_entry_without_artifact_or_cap_use() {
    let mut source = StubSource::new(vec![
        file("bad.p7d", b"fail me"),
        file("a.p7d", b"a"),
        file("b.p7d", b"b"),
        file("c.p7d", b"c"),
    ]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    let titles: Vec<_> = result.artifacts.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["a.p7d", "b.p7d", "c.p7d"]);
    assert_eq!(result.status, None);
}

#[test]
fn archive_of_only_failing_entries_reports_no_matches() {
    let mut source = StubSource::new(vec![file("bad.p7d", b"fail me")]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    assert!(result.artifacts.is_empty());
    assert_eq!(result.status.as_deref(), Some(NO_MATCHING_ENTRIES_TEXT));
    assert_eq!(
        result.status.as_deref(),
        Some("No log files found in the provided zip archive.")
    );
}

#[test]
fn empty_archive_reports_no_matches() {
    let mut source = StubSource::new(vec![]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    assert!(result.artifacts.is_empty());
    assert_eq!(result.status.as_deref(), Some(NO_MATCHING_ENTRIES_TEXT));
}

#[test]
fn artifact_order_follows_directory_order() {
    let mut source = StubSource::new(vec![
        file("z.p7d", b"zulu"),
        file("a.p7d", b"alpha"),
        file("m.p7d", b"mike"),
    ]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    let titles: Vec<_> = result.artifacts.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["z.p7d", "a.p7d", "m.p7d"]);
    assert!(result.artifacts[0].body.contains("zulu"));
    assert!(result.artifacts[2].body.contains("mike"));
}

#[test]
fn unreadable_entry_payload_is_dropped() {
    let mut unreadable = file("torn.p7d", b"torn");
    unreadable.unreadable = true;
    let mut source = StubSource::new(vec![unreadable, file("ok.p7d", b"ok")]);
    let result = scan(&mut source, &echo_analyzer(), &Policy::default()).unwrap();
    let titles: Vec<_> = result.artifacts.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["ok.p7d"]);
}

#[test]
fn unknown_record_type_aborts_the_scan() {
    let unknown_analyzer =
        |_bytes: &[u8]| -> Result<LogRecord, AnalysisFailure> { Ok(LogRecord::Unknown) };
    let mut source = StubSource::new(vec![file("odd.p7d", b"odd")]);
    let err = scan(&mut source, &unknown_analyzer, &Policy::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Render(RenderError::UnknownRecordType)
    ));
}
