//! Realtime airport status extraction.
//!
//! Reads the FAA airport status feed, an XML document shaped roughly like:
//!
//! ```text
//! AIRPORT_STATUS_INFORMATION
//! └── Delay_type            (one, or repeated)
//!     ├── Name              "Ground Delay Programs"
//!     └── Ground_Delay_List (any child ending in _List)
//!         └── Ground_Delay  (one, or repeated; name varies per category)
//!             ├── ARPT      "ASE"
//!             ├── Reason    "weather / snow"
//!             └── Avg       "45 minutes"
//! ```
//!
//! A document with no `Delay_type` at all is the normal "no delays anywhere"
//! case, not an error.

use crate::config::AppConfig;
use crate::feeds::client::FeedSource;
use crate::feeds::xml::{XmlValue, as_sequence, parse_document};
use crate::models::{DEFAULT_AVG_DELAY, DEFAULT_CATEGORY, DEFAULT_REASON, DelayProgram};
use tracing::{debug, error, info, instrument};

const ROOT: &str = "AIRPORT_STATUS_INFORMATION";
const DELAY_TYPE: &str = "Delay_type";
const LIST_SUFFIX: &str = "_List";

/// Fetch the status feed and extract programs for the configured targets.
///
/// Returns `None` when the feed could not be fetched; parse errors are logged
/// and yield an empty list.
#[instrument(level = "info", skip_all, fields(url = %config.status_url))]
pub async fn check<F: FeedSource>(source: &F, config: &AppConfig) -> Option<Vec<DelayProgram>> {
    match source.fetch(&config.status_url).await {
        Ok(body) => Some(extract(&body, &config.targets, &config.program_fields)),
        Err(e) => {
            error!(error = %e, "Error checking realtime status");
            None
        }
    }
}

/// Parse a status document and extract matching programs in document order.
pub fn extract(body: &str, targets: &[String], program_fields: &[String]) -> Vec<DelayProgram> {
    match parse_document(body) {
        Ok(doc) => {
            let programs = extract_programs(&doc, targets, program_fields);
            info!(count = programs.len(), "Realtime programs matched");
            programs
        }
        Err(e) => {
            error!(error = %e, "Could not parse realtime status feed");
            Vec::new()
        }
    }
}

/// Walk a parsed status document.
///
/// Every child of a delay-type group whose name ends in `_List` is searched
/// for program entries under the first present name in `program_fields`.
/// A program is kept when its `ARPT` exactly equals one of `targets`.
pub fn extract_programs(
    doc: &XmlValue,
    targets: &[String],
    program_fields: &[String],
) -> Vec<DelayProgram> {
    let Some(groups) = doc.get(ROOT).and_then(|root| root.get(DELAY_TYPE)) else {
        debug!("No delay types in status feed");
        return Vec::new();
    };

    let mut matched = Vec::new();
    for group in as_sequence(groups) {
        let category = text_or(group.get("Name"), DEFAULT_CATEGORY);

        for (key, value) in group.entries() {
            if !key.ends_with(LIST_SUFFIX) || !value.is_present() {
                continue;
            }
            for list in as_sequence(value) {
                let Some(programs) = find_programs(list, program_fields) else {
                    debug!(list = %key, "No program entries under any known field name");
                    continue;
                };
                for program in as_sequence(programs) {
                    let Some(airport) = program.get("ARPT").and_then(XmlValue::as_text) else {
                        continue;
                    };
                    let airport = airport.trim();
                    if !targets.iter().any(|t| t == airport) {
                        continue;
                    }
                    matched.push(DelayProgram {
                        airport: airport.to_string(),
                        reason: text_or(program.get("Reason"), DEFAULT_REASON),
                        average_delay: text_or(program.get("Avg"), DEFAULT_AVG_DELAY),
                        category: category.clone(),
                    });
                }
            }
        }
    }
    matched
}

/// First present child of `list` named in `fields`, in priority order.
fn find_programs<'a>(list: &'a XmlValue, fields: &[String]) -> Option<&'a XmlValue> {
    fields
        .iter()
        .find_map(|field| list.get(field).filter(|v| v.is_present()))
}

fn text_or(value: Option<&XmlValue>, default: &str) -> String {
    value
        .and_then(XmlValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
