//! Rendering of analyzer records into display-ready artifacts

use crate::policy::Policy;
use crate::record::LogRecord;

/// Coloring state of an artifact, derived from failure-indicating labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Alert,
    Normal,
}

impl ColorTag {
    /// The embed color front ends use for this tag.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Alert => "#A00011",
            Self::Normal => "#00A011",
        }
    }
}

/// One display-ready output unit of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Filename the log came from.
    pub title: String,
    pub color: ColorTag,
    /// Markdown-flavored body text.
    pub body: String,
}

/// The analyzer emitted a record shape this renderer has no branch for.
///
/// This is a contract violation, not a per-log condition: it means the
/// renderer is out of sync with the analyzer's output space and must never
/// be dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("analyzer returned a log record of an unrecognized type")]
    UnknownRecordType,
}

/// Render one analyzed record into an artifact titled by its origin file.
///
/// Pure and deterministic: identical inputs yield byte-identical output.
pub fn render(
    record: &LogRecord,
    origin: &str,
    policy: &Policy,
) -> Result<RenderedArtifact, RenderError> {
    let detail = match record {
        LogRecord::MainProcess(log) => format!(
            "**User's GPU**: {}\n**User's language**: {}\n{}{}",
            log.user_gpu,
            log.user_lang,
            section("Possible GitHub issue labels", &log.labels),
            section("Hints", &log.hints),
        ),
        LogRecord::ChildProcess(log) => format!(
            "**Title ID**: {}\n**PS4 Pro mode**: {}\n{}{}{}",
            log.title_id,
            if log.title_neo { "Yes" } else { "No" },
            section("Possible GitHub issue labels", &log.labels),
            section("Hints", &log.hints),
            section("Loaded PS4 firmware libraries", &log.firmware),
        ),
        LogRecord::Unknown => return Err(RenderError::UnknownRecordType),
    };

    let color = if policy.is_alert(record.labels()) {
        ColorTag::Alert
    } else {
        ColorTag::Normal
    };

    Ok(RenderedArtifact {
        title: origin.to_string(),
        color,
        body: format!(
            "Here's your log file information:\n\n**Log Type**: {}\n{}",
            record.type_name(),
            detail
        ),
    })
}

/// Build an alert artifact for a contained per-entry failure.
pub(crate) fn error_artifact(title: &str, body: &str) -> RenderedArtifact {
    RenderedArtifact {
        title: title.to_string(),
        color: ColorTag::Alert,
        body: body.to_string(),
    }
}

/// A bulleted block under a bold heading, or nothing when the list is empty.
fn section(heading: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("\n**{}**:\n", heading);
    for item in items {
        out.push_str("* ");
        out.push_str(item);
        out.push('\n');
    }
    out
}
