//! Draft-event classification from log lines.

use serde::{Deserialize, Serialize};

use crate::models::SetRegistry;

use super::parsers::{json_suffix, lookup};

/// Markers that introduce a joined event, across client versions.
pub const DRAFT_START_MARKERS: [&str; 2] = ["Event_Join", "EventJoin"];

// ---------------------------------------------------------------------------
// DraftType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftType {
    #[default]
    Unknown,
    PremierV1,
    PremierV2,
    Quick,
    Traditional,
    Sealed,
    TraditionalSealed,
}

impl DraftType {
    pub fn is_sealed(self) -> bool {
        matches!(self, DraftType::Sealed | DraftType::TraditionalSealed)
    }
}

impl std::fmt::Display for DraftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DraftType::Unknown => "Unknown",
            DraftType::PremierV1 => "Premier Draft",
            DraftType::PremierV2 => "Premier Draft",
            DraftType::Quick => "Quick Draft",
            DraftType::Traditional => "Traditional Draft",
            DraftType::Sealed => "Sealed",
            DraftType::TraditionalSealed => "Traditional Sealed",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A recognized draft-start line.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    pub draft_type: DraftType,
    /// The full event name, e.g. `PremierDraft_LTR_20230620`.
    pub event_name: String,
    /// Set codes identified from the event name.
    pub sets: Vec<String>,
}

/// Event-type keywords in match order. `TradSealed` precedes `Sealed` so
/// the longer keyword wins; `BotDraft` is the client's name for quick
/// drafts.
const EVENT_KEYWORDS: [(&str, DraftType); 6] = [
    ("PremierDraft", DraftType::PremierV1),
    ("QuickDraft", DraftType::Quick),
    ("TradDraft", DraftType::Traditional),
    ("BotDraft", DraftType::Quick),
    ("TradSealed", DraftType::TraditionalSealed),
    ("Sealed", DraftType::Sealed),
];

/// Classify a log line as a draft start, if it is one.
///
/// The `EventName` of the join payload is split on `_`; the first token
/// matching a known keyword decides the draft type, and the remaining
/// tokens are intersected with the registry's ratings codes to identify
/// the set(s). Unrecognized event types containing a generic "draft"
/// word fall back to premier.
pub fn classify_event(line: &str, registry: &SetRegistry) -> Option<ClassifiedEvent> {
    let marker = DRAFT_START_MARKERS.iter().find(|m| line.contains(**m))?;
    let payload = json_suffix(line, marker)?;
    let event_name = lookup(&payload, "EventName")?.as_str()?.to_string();

    let tokens: Vec<&str> = event_name.split('_').collect();

    let mut draft_type = tokens.iter().find_map(|token| {
        EVENT_KEYWORDS
            .iter()
            .find(|(keyword, _)| token.contains(keyword))
            .map(|(_, dt)| *dt)
    });

    if draft_type.is_none() && event_name.to_lowercase().contains("draft") {
        draft_type = Some(DraftType::PremierV1);
    }

    let draft_type = draft_type?;

    let sets: Vec<String> = tokens
        .iter()
        .filter(|t| registry.has_ratings_code(t))
        .map(|t| (*t).to_string())
        .collect();

    Some(ClassifiedEvent {
        draft_type,
        event_name,
        sets,
    })
}
