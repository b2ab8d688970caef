//! Log scanner / draft state machine.
//!
//! Tails the game client's append-only log and maintains the current
//! draft state: the pack in front of the player, the picks made, and the
//! taken pool. The overlay polls [`LogScanner::start_search`] and
//! [`LogScanner::data_search`] once per tick; reads seek from the last
//! byte offset, so each tick is bounded by the bytes appended since the
//! previous one.
//!
//! Failure policy: a missing log file is surfaced to the caller;
//! malformed individual lines are logged and skipped, never fatal.

pub mod events;
pub mod parsers;

pub use events::{ClassifiedEvent, DraftType};

use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};
use crate::models::SetRegistry;

// ---------------------------------------------------------------------------
// LogScanner
// ---------------------------------------------------------------------------

/// Number of seat positions in a pack rotation.
const SEATS: usize = 8;

pub struct LogScanner {
    log_path: PathBuf,
    registry: SetRegistry,

    draft_type: DraftType,
    event_name: String,
    draft_sets: Vec<String>,

    current_pack: u32,
    current_pick: u32,
    pack_cards: [Vec<String>; SEATS],
    initial_pack: [Vec<String>; SEATS],
    picked_cards: [Vec<String>; SEATS],
    taken_cards: Vec<String>,

    search_offset: u64,
    pack_offset: u64,
    pick_offset: u64,
    file_size: u64,

    initial_seen: [bool; SEATS],
    initial_pack_number: u32,
    picked_pack_number: u32,
    picks_recorded: HashSet<(u32, u32)>,
}

/// One log line with the byte offset just past it.
pub(crate) struct LogLine {
    pub text: String,
    pub end_offset: u64,
    /// False for a trailing line still being written (no newline yet).
    pub complete: bool,
}

impl LogScanner {
    /// Create a scanner over the given registry. The log path starts
    /// unset; searches fail with `NotFound` until one is supplied.
    pub fn new(registry: SetRegistry) -> Self {
        Self {
            log_path: PathBuf::new(),
            registry,
            draft_type: DraftType::Unknown,
            event_name: String::new(),
            draft_sets: Vec::new(),
            current_pack: 0,
            current_pick: 0,
            pack_cards: Default::default(),
            initial_pack: Default::default(),
            picked_cards: Default::default(),
            taken_cards: Vec::new(),
            search_offset: 0,
            pack_offset: 0,
            pick_offset: 0,
            file_size: 0,
            initial_seen: [false; SEATS],
            initial_pack_number: 0,
            picked_pack_number: 0,
            picks_recorded: HashSet::new(),
        }
    }

    pub fn set_log_path<P: AsRef<Path>>(&mut self, path: P) {
        self.log_path = path.as_ref().to_path_buf();
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Reset the draft state. A full clear also rewinds the byte offsets
    /// and the file-size watermark (used after log truncation).
    pub fn clear(&mut self, full: bool) {
        self.draft_type = DraftType::Unknown;
        self.event_name.clear();
        self.draft_sets.clear();
        self.current_pack = 0;
        self.current_pick = 0;
        for seat in 0..SEATS {
            self.pack_cards[seat].clear();
            self.initial_pack[seat].clear();
            self.picked_cards[seat].clear();
        }
        self.taken_cards.clear();
        self.initial_seen = [false; SEATS];
        self.initial_pack_number = 0;
        self.picked_pack_number = 0;
        self.picks_recorded.clear();

        if full {
            self.search_offset = 0;
            self.pack_offset = 0;
            self.pick_offset = 0;
            self.file_size = 0;
        }
    }

    // -- Searches ----------------------------------------------------------

    /// Scan forward for a draft-start marker and (re)initialize the draft
    /// state when one is found. A file-size regression triggers a full
    /// reset before scanning. Returns whether a new event was recognized.
    pub fn start_search(&mut self) -> Result<bool> {
        let size = self.current_file_size()?;
        if size < self.file_size {
            tracing::info!("log shrank from {} to {} bytes, resetting", self.file_size, size);
            self.clear(true);
        }
        self.file_size = size;

        let lines = self.read_from(self.search_offset)?;
        let mut updated = false;

        for line in &lines {
            if !line.complete {
                break;
            }
            if let Some(event) = events::classify_event(&line.text, &self.registry) {
                tracing::info!("draft start: {} ({})", event.event_name, event.draft_type);
                self.clear(false);
                self.draft_type = event.draft_type;
                self.event_name = event.event_name;
                self.draft_sets = event.sets;
                // Data for the new event follows its join line.
                self.pack_offset = self.pack_offset.max(line.end_offset);
                self.pick_offset = self.pick_offset.max(line.end_offset);
                updated = true;
            }
            self.search_offset = line.end_offset;
        }

        Ok(updated)
    }

    /// Run the variant parsers for the active draft type. Returns true
    /// iff the pack, pick, or taken pool changed.
    pub fn data_search(&mut self) -> Result<bool> {
        match self.draft_type {
            DraftType::PremierV1 | DraftType::PremierV2 => {
                let pack = self.premier_pack_search()?;
                let pick = self.premier_pick_search()?;
                Ok(pack || pick)
            }
            DraftType::Traditional => {
                let pack = self.premier_pack_search()?;
                let pick = self.traditional_pick_search()?;
                Ok(pack || pick)
            }
            DraftType::Quick => {
                let pack = self.quick_pack_search()?;
                let pick = self.quick_pick_search()?;
                Ok(pack || pick)
            }
            DraftType::Sealed | DraftType::TraditionalSealed => self.sealed_search(),
            DraftType::Unknown => Ok(false),
        }
    }

    // -- Accessors ---------------------------------------------------------

    /// Current contents of each seat-position's pack.
    pub fn pack_cards(&self) -> &[Vec<String>; SEATS] {
        &self.pack_cards
    }

    /// Pristine pack contents as first seen, per seat position.
    pub fn initial_pack(&self) -> &[Vec<String>; SEATS] {
        &self.initial_pack
    }

    /// Cards picked from each seat position in the current pack.
    pub fn picked_cards(&self) -> &[Vec<String>; SEATS] {
        &self.picked_cards
    }

    /// Every card taken this draft, in pick order.
    pub fn taken_cards(&self) -> &[String] {
        &self.taken_cards
    }

    /// Cards gone from each seat's pack that this seat did not take:
    /// initial pack minus current pack minus own picks.
    pub fn missing_cards(&self) -> [Vec<String>; SEATS] {
        let mut missing: [Vec<String>; SEATS] = Default::default();
        for seat in 0..SEATS {
            missing[seat] = self.initial_pack[seat]
                .iter()
                .filter(|id| {
                    !self.pack_cards[seat].contains(id)
                        && !self.picked_cards[seat].contains(id)
                })
                .cloned()
                .collect();
        }
        missing
    }

    /// `(pack, pick)`, 1-based; `(0, 0)` before the first pack arrives.
    pub fn current_pack_and_pick(&self) -> (u32, u32) {
        (self.current_pack, self.current_pick)
    }

    /// The active event: draft type, full event name, identified sets.
    pub fn current_event(&self) -> (DraftType, &str, &[String]) {
        (self.draft_type, &self.event_name, &self.draft_sets)
    }

    pub fn offsets(&self) -> (u64, u64, u64) {
        (self.search_offset, self.pack_offset, self.pick_offset)
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    // -- State mutation (used by the variant parsers) ----------------------

    /// Record a pack sighting. The first sighting of a seat within a pack
    /// locks the initial pack; the current pack is overwritten on every
    /// sighting.
    pub(crate) fn apply_pack(&mut self, pack: u32, pick: u32, cards: Vec<String>) -> bool {
        if !(1..=3).contains(&pack) || !(1..=15).contains(&pick) {
            tracing::debug!("pack sighting out of range: P{}P{}", pack, pick);
            return false;
        }

        let seat = ((pick - 1) % SEATS as u32) as usize;

        if self.initial_pack_number != pack {
            self.initial_pack_number = pack;
            self.initial_seen = [false; SEATS];
            for slot in &mut self.initial_pack {
                slot.clear();
            }
        }
        if !self.initial_seen[seat] {
            self.initial_seen[seat] = true;
            self.initial_pack[seat] = cards.clone();
        }

        let changed = self.pack_cards[seat] != cards
            || self.current_pack != pack
            || self.current_pick != pick;

        self.pack_cards[seat] = cards;
        self.current_pack = pack;
        self.current_pick = pick;
        changed
    }

    /// Record a pick. Idempotent per `(pack, pick)`; independent of pack
    /// sightings, so a pick observed before its pack still lands.
    pub(crate) fn apply_pick(&mut self, pack: u32, pick: u32, card: String) -> bool {
        if !(1..=3).contains(&pack) || !(1..=15).contains(&pick) {
            tracing::debug!("pick out of range: P{}P{}", pack, pick);
            return false;
        }
        if self.picks_recorded.contains(&(pack, pick)) {
            return false;
        }

        let seat = ((pick - 1) % SEATS as u32) as usize;

        if self.picked_pack_number != pack {
            self.picked_pack_number = pack;
            for slot in &mut self.picked_cards {
                slot.clear();
            }
        }

        self.picked_cards[seat].push(card.clone());
        self.taken_cards.push(card);
        self.picks_recorded.insert((pack, pick));
        true
    }

    // -- File access -------------------------------------------------------

    fn current_file_size(&self) -> Result<u64> {
        match fs::metadata(&self.log_path) {
            Ok(meta) => Ok(meta.len()),
            Err(_) => Err(EngineError::NotFound(format!(
                "game log not found at {}; check the client installation",
                self.log_path.display()
            ))),
        }
    }

    /// Read complete lines from `offset` to EOF, decoding with UTF-8
    /// replacement. The trailing line is flagged incomplete when the file
    /// does not end in a newline.
    pub(crate) fn read_from(&self, offset: u64) -> Result<Vec<LogLine>> {
        let file = fs::File::open(&self.log_path).map_err(|_| {
            EngineError::NotFound(format!(
                "game log not found at {}; check the client installation",
                self.log_path.display()
            ))
        })?;

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut lines = Vec::new();
        let mut position = offset;
        let mut buf: Vec<u8> = Vec::new();

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            position += read as u64;
            let complete = buf.last() == Some(&b'\n');
            let text = String::from_utf8_lossy(&buf).trim_end().to_string();
            lines.push(LogLine {
                text,
                end_offset: position,
                complete,
            });
        }

        Ok(lines)
    }
}
