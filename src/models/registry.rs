//! The limited-set registry: for each supported event set, the code lists
//! used by the game client, the card catalog and the ratings service.

use serde::{Deserialize, Serialize};

/// Sentinel arena code meaning "take every card in the local database";
/// used for cube formats.
pub const ARENA_CODE_ALL: &str = "ALL";

// ---------------------------------------------------------------------------
// SetEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Expansion codes in the game client's card database, or the
    /// [`ARENA_CODE_ALL`] sentinel.
    pub arena_codes: Vec<String>,
    /// Codes on the external card catalog.
    pub catalog_codes: Vec<String>,
    /// Codes on the ratings service; also matched against event names
    /// during log classification.
    pub ratings_codes: Vec<String>,
    /// First day of sanctioned play, ISO-8601.
    #[serde(default)]
    pub start_date: Option<String>,
}

impl SetEntry {
    /// Whether the entry names a specific subset of the card database
    /// rather than the whole of it.
    pub fn is_specific(&self) -> bool {
        !self.arena_codes.iter().any(|c| c == ARENA_CODE_ALL)
    }
}

// ---------------------------------------------------------------------------
// SetRegistry
// ---------------------------------------------------------------------------

/// Ordered mapping from limited-set display name to its code lists,
/// newest set first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRegistry {
    entries: Vec<(String, SetEntry)>,
}

impl SetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace an entry by display name.
    pub fn insert(&mut self, name: impl Into<String>, entry: SetEntry) {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = entry;
        } else {
            self.entries.push((name, entry));
        }
    }

    pub fn get(&self, name: &str) -> Option<&SetEntry> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SetEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry carries the given ratings code.
    pub fn has_ratings_code(&self, code: &str) -> bool {
        self.entries
            .iter()
            .any(|(_, e)| e.ratings_codes.iter().any(|c| c == code))
    }

    /// Entry carrying the given ratings code, if any.
    pub fn entry_for_ratings_code(&self, code: &str) -> Option<(&str, &SetEntry)> {
        self.entries
            .iter()
            .find(|(_, e)| e.ratings_codes.iter().any(|c| c == code))
            .map(|(n, e)| (n.as_str(), e))
    }

    /// The compiled-in fallback registry, used when the set-list
    /// endpoints are unreachable.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, code, start) in BUILTIN_SETS {
            registry.insert(
                *name,
                SetEntry {
                    arena_codes: vec![(*code).to_string()],
                    catalog_codes: vec![code.to_lowercase()],
                    ratings_codes: vec![(*code).to_string()],
                    start_date: Some((*start).to_string()),
                },
            );
        }
        registry.insert(
            "Arena Cube",
            SetEntry {
                arena_codes: vec![ARENA_CODE_ALL.to_string()],
                catalog_codes: Vec::new(),
                ratings_codes: vec!["CUBE".to_string()],
                start_date: None,
            },
        );
        registry
    }
}

/// Fallback set list used when the set-list endpoints are unreachable,
/// newest first.
const BUILTIN_SETS: &[(&str, &str, &str)] = &[
    ("Final Fantasy", "FIN", "2025-06-10"),
    ("Tarkir: Dragonstorm", "TDM", "2025-04-08"),
    ("Aetherdrift", "DFT", "2025-02-11"),
    ("Foundations", "FDN", "2024-11-12"),
    ("Duskmourn: House of Horror", "DSK", "2024-09-24"),
    ("Bloomburrow", "BLB", "2024-07-30"),
    ("Outlaws of Thunder Junction", "OTJ", "2024-04-16"),
    ("Murders at Karlov Manor", "MKM", "2024-02-06"),
    ("The Lost Caverns of Ixalan", "LCI", "2023-11-14"),
    ("Wilds of Eldraine", "WOE", "2023-09-05"),
    ("The Lord of the Rings: Tales of Middle-earth", "LTR", "2023-06-20"),
    ("March of the Machine", "MOM", "2023-04-18"),
    ("Phyrexia: All Will Be One", "ONE", "2023-02-07"),
];
