//! Variant-specific log parsers and the JSON payload helpers they share.
//!
//! Every marker lookup is a substring search, never a regex, so prefix
//! changes between client versions do not break parsing. Payload keys are
//! located by descending nested objects, which keeps request/params
//! wrappers transparent.

use serde_json::Value;

use super::events::DraftType;
use super::LogScanner;
use crate::error::Result;

// Pack markers.
pub const MARKER_DRAFT_NOTIFY: &str = "Draft.Notify ";
pub const MARKER_CARDS_IN_PACK: &str = "CardsInPack";
pub const MARKER_QUICK_PACK: &str = "DraftPack";

// Pick markers.
pub const MARKER_PICK_V1: &str = "Event_PlayerDraftMakePick";
pub const MARKER_PICK_V2: &str = "Draft.MakeHumanDraftPick";
pub const MARKER_PICK_QUICK: &str = "BotDraft_DraftPick";

// Sealed markers.
pub const MARKER_SEALED_POOL: &str = "EventGrantCardPool";
pub const MARKER_COURSES: &str = "Courses";

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Parse the JSON payload of a marker line: the line's first object, so
/// both prefix markers (`Draft.Notify {...}`) and key-style markers (the
/// marker inside the payload) resolve to the same object. Trailing line
/// content after the object is tolerated.
pub fn json_suffix(line: &str, marker: &str) -> Option<Value> {
    if !line.contains(marker) {
        return None;
    }
    let brace = line.find('{')?;
    let mut stream = serde_json::Deserializer::from_str(&line[brace..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Some(value),
        _ => None,
    }
}

/// Find a key anywhere in a nested JSON structure, depth-first, own keys
/// before children.
pub fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| lookup(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| lookup(v, key)),
        _ => None,
    }
}

/// Read a number that may be serialized as an integer or a string.
pub fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Card id as a string, from a JSON number or string.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Card id list, from a JSON array or a comma-separated string.
pub fn id_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(id_string).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Variant parsers
// ---------------------------------------------------------------------------

impl LogScanner {
    /// Pack parser for the premier and traditional shapes: `Draft.Notify`
    /// payloads plus the P1P1-only `CardsInPack` line.
    pub(super) fn premier_pack_search(&mut self) -> Result<bool> {
        let lines = self.read_from(self.pack_offset)?;
        let mut changed = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if line.text.contains(MARKER_CARDS_IN_PACK) {
                if let Some(payload) = json_suffix(&line.text, MARKER_CARDS_IN_PACK) {
                    let pack = lookup(&payload, "PackNumber").and_then(as_u32).unwrap_or(1);
                    let pick = lookup(&payload, "PickNumber").and_then(as_u32).unwrap_or(1);
                    let cards = lookup(&payload, "CardsInPack").map(id_list).unwrap_or_default();
                    if pack == 1 && pick == 1 && !cards.is_empty() {
                        changed |= self.apply_pack(1, 1, cards);
                    }
                } else {
                    tracing::debug!("unparseable CardsInPack line skipped");
                }
                self.pack_offset = line.end_offset;
            } else if line.text.contains(MARKER_DRAFT_NOTIFY) {
                if let Some(payload) = json_suffix(&line.text, MARKER_DRAFT_NOTIFY) {
                    let pack = lookup(&payload, "SelfPack").and_then(as_u32);
                    let pick = lookup(&payload, "SelfPick").and_then(as_u32);
                    let cards = lookup(&payload, "PackCards").map(id_list).unwrap_or_default();
                    if let (Some(pack), Some(pick)) = (pack, pick) {
                        if !cards.is_empty() {
                            changed |= self.apply_pack(pack, pick, cards);
                        }
                    }
                } else {
                    tracing::debug!("unparseable Draft.Notify line skipped");
                }
                self.pack_offset = line.end_offset;
            }
        }

        Ok(changed)
    }

    /// Pick parser for premier drafts. Both client shapes are accepted; a
    /// V2 pick re-classifies the draft.
    pub(super) fn premier_pick_search(&mut self) -> Result<bool> {
        let lines = self.read_from(self.pick_offset)?;
        let mut changed = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if line.text.contains(MARKER_PICK_V1) {
                if let Some(payload) = json_suffix(&line.text, MARKER_PICK_V1) {
                    changed |= self.apply_pick_payload(&payload, "Pack", "Pick", "GrpId", 0);
                } else {
                    tracing::debug!("unparseable make-pick line skipped");
                }
                self.pick_offset = line.end_offset;
            } else if line.text.contains(MARKER_PICK_V2) {
                if let Some(payload) = json_suffix(&line.text, MARKER_PICK_V2) {
                    if self.apply_pick_payload(&payload, "packNumber", "pickNumber", "cardId", 0) {
                        self.draft_type = DraftType::PremierV2;
                        changed = true;
                    }
                } else {
                    tracing::debug!("unparseable human-pick line skipped");
                }
                self.pick_offset = line.end_offset;
            }
        }

        Ok(changed)
    }

    /// Pick parser for traditional drafts (same payload as premier V1).
    pub(super) fn traditional_pick_search(&mut self) -> Result<bool> {
        let lines = self.read_from(self.pick_offset)?;
        let mut changed = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if line.text.contains(MARKER_PICK_V1) {
                if let Some(payload) = json_suffix(&line.text, MARKER_PICK_V1) {
                    changed |= self.apply_pick_payload(&payload, "Pack", "Pick", "GrpId", 0);
                } else {
                    tracing::debug!("unparseable make-pick line skipped");
                }
                self.pick_offset = line.end_offset;
            }
        }

        Ok(changed)
    }

    /// Pack parser for quick drafts: `DraftPack` payloads, only accepted
    /// while the status is `PickNext`. Pack and pick numbers are 0-based.
    pub(super) fn quick_pack_search(&mut self) -> Result<bool> {
        let lines = self.read_from(self.pack_offset)?;
        let mut changed = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if !line.text.contains(MARKER_QUICK_PACK) {
                continue;
            }
            if let Some(payload) = json_suffix(&line.text, MARKER_QUICK_PACK) {
                let status = lookup(&payload, "DraftStatus").and_then(Value::as_str);
                if status == Some("PickNext") {
                    let pack = lookup(&payload, "PackNumber").and_then(as_u32);
                    let pick = lookup(&payload, "PickNumber").and_then(as_u32);
                    let cards = lookup(&payload, "DraftPack").map(id_list).unwrap_or_default();
                    if let (Some(pack), Some(pick)) = (pack, pick) {
                        if !cards.is_empty() {
                            changed |= self.apply_pack(pack + 1, pick + 1, cards);
                        }
                    }
                }
            } else {
                tracing::debug!("unparseable quick-pack line skipped");
            }
            self.pack_offset = line.end_offset;
        }

        Ok(changed)
    }

    /// Pick parser for quick drafts; 0-based pack and pick numbers.
    pub(super) fn quick_pick_search(&mut self) -> Result<bool> {
        let lines = self.read_from(self.pick_offset)?;
        let mut changed = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if !line.text.contains(MARKER_PICK_QUICK) {
                continue;
            }
            if let Some(payload) = json_suffix(&line.text, MARKER_PICK_QUICK) {
                changed |= self.apply_pick_payload(&payload, "PackNumber", "PickNumber", "CardId", 1);
            } else {
                tracing::debug!("unparseable quick-pick line skipped");
            }
            self.pick_offset = line.end_offset;
        }

        Ok(changed)
    }

    /// Sealed pool parser. The pool is assigned exactly once; markers
    /// observed after it is populated are skipped.
    pub(super) fn sealed_search(&mut self) -> Result<bool> {
        let lines = self.read_from(self.pack_offset)?;
        let mut changed = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if line.text.contains(MARKER_SEALED_POOL) {
                if self.taken_cards.is_empty() {
                    if let Some(payload) = json_suffix(&line.text, MARKER_SEALED_POOL) {
                        let ids = granted_pool(&payload);
                        if !ids.is_empty() {
                            self.taken_cards = ids;
                            changed = true;
                        }
                    } else {
                        tracing::debug!("unparseable card-pool line skipped");
                    }
                }
                self.pack_offset = line.end_offset;
            } else if line.text.contains(MARKER_COURSES) {
                if self.taken_cards.is_empty() {
                    if let Some(payload) = json_suffix(&line.text, MARKER_COURSES) {
                        let ids = course_pool(&payload, &self.event_name);
                        if !ids.is_empty() {
                            self.taken_cards = ids;
                            changed = true;
                        }
                    }
                }
                self.pack_offset = line.end_offset;
            }
        }

        Ok(changed)
    }

    /// Shared pick application: read the three payload keys, shift
    /// 0-based variants, and record the pick.
    fn apply_pick_payload(
        &mut self,
        payload: &Value,
        pack_key: &str,
        pick_key: &str,
        card_key: &str,
        base_shift: u32,
    ) -> bool {
        let pack = lookup(payload, pack_key).and_then(as_u32);
        let pick = lookup(payload, pick_key).and_then(as_u32);
        let card = lookup(payload, card_key).and_then(id_string);

        match (pack, pick, card) {
            (Some(pack), Some(pick), Some(card)) => {
                self.apply_pick(pack + base_shift, pick + base_shift, card)
            }
            _ => false,
        }
    }
}

/// Ids granted by an `EventGrantCardPool` change set.
fn granted_pool(payload: &Value) -> Vec<String> {
    let Some(Value::Array(changes)) = lookup(payload, "Changes") else {
        return Vec::new();
    };

    let mut ids = Vec::new();
    for change in changes {
        let source = lookup(change, "Source").and_then(Value::as_str);
        if source != Some(MARKER_SEALED_POOL) {
            continue;
        }
        if let Some(Value::Array(granted)) = lookup(change, "GrantedCards") {
            for card in granted {
                if let Some(id) = lookup(card, "GrpId").and_then(id_string) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

/// Card pool of the course matching the joined event name.
fn course_pool(payload: &Value, event_name: &str) -> Vec<String> {
    let Some(Value::Array(courses)) = lookup(payload, "Courses") else {
        return Vec::new();
    };

    for course in courses {
        let name = lookup(course, "InternalEventName").and_then(Value::as_str);
        if name != Some(event_name) {
            continue;
        }
        if let Some(pool) = lookup(course, "CardPool") {
            let ids = id_list(pool);
            if !ids.is_empty() {
                return ids;
            }
        }
    }
    Vec::new()
}
