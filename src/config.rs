use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Remote endpoints
// ---------------------------------------------------------------------------

/// Community ratings service.
pub const RATINGS_BASE_URL: &str = "https://www.17lands.com";

/// Card catalog used when the local card database cannot be read.
pub const CATALOG_BASE_URL: &str = "https://api.scryfall.com";

pub fn card_ratings_url(base: &str) -> String {
    format!("{}/card_ratings/data", base)
}

pub fn color_ratings_url(base: &str) -> String {
    format!("{}/color_ratings/data", base)
}

/// Recognized event sets, with start dates.
pub fn event_sets_url(base: &str) -> String {
    format!("{}/data/expansions", base)
}

/// Catalog search endpoint; paginated via `next_page` / `has_more`.
pub fn catalog_search_url(base: &str, code: &str) -> String {
    format!("{}/sets/search?order=set&unique=prints&q=e:{}", base, code)
}

/// Full catalog set list.
pub fn catalog_sets_url(base: &str) -> String {
    format!("{}/sets", base)
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Attempts per ratings-endpoint call.
pub const RATINGS_RETRIES: u32 = 5;

/// Attempts per catalog-endpoint call.
pub const CATALOG_RETRIES: u32 = 3;

/// Fixed delay between retry attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Pause between consecutive filter fetches, to stay under rate limits.
pub const INTER_CALL_DELAY: Duration = Duration::from_millis(400);

/// HTTP request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Artifact files
// ---------------------------------------------------------------------------

/// Suffix of every artifact file name.
pub const ARTIFACT_SUFFIX: &str = "Data";

/// Artifact schema version written by this build of the engine.
pub const ARTIFACT_VERSION: u32 = 2;

/// Artifact versions the integrity checker accepts.
pub const RECOGNIZED_ARTIFACT_VERSIONS: [u32; 2] = [1, 2];

/// File name convention: `<CODE>_<EVENT>_Data.json`.
pub fn artifact_file_name(set_code: &str, event_type: &str) -> String {
    format!("{}_{}_{}.json", set_code, event_type, ARTIFACT_SUFFIX)
}

/// Directory where artifacts and tier lists are stored.
pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("arena-draft-engine")
    } else {
        PathBuf::from(".arena-draft-engine")
    }
}

// ---------------------------------------------------------------------------
// Game client locations
// ---------------------------------------------------------------------------

/// Candidate locations of the game client's card database, most likely
/// first. The database file name starts with `Raw_CardDatabase` and the
/// caller globs within these directories.
pub fn card_database_search_dirs() -> Vec<PathBuf> {
    let mut dirs_out = Vec::new();

    #[cfg(target_os = "windows")]
    {
        dirs_out.push(PathBuf::from(
            r"C:\Program Files\Wizards of the Coast\MTGA\MTGA_Data\Downloads\Raw",
        ));
        dirs_out.push(PathBuf::from(
            r"C:\Program Files (x86)\Wizards of the Coast\MTGA\MTGA_Data\Downloads\Raw",
        ));
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            dirs_out.push(home.join(
                "Library/Application Support/com.wizards.mtga/Downloads/Raw",
            ));
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // Wine / Proton installs keep the Windows layout under the prefix.
        if let Some(home) = dirs::home_dir() {
            dirs_out.push(home.join(
                ".wine/drive_c/Program Files/Wizards of the Coast/MTGA/MTGA_Data/Downloads/Raw",
            ));
        }
    }

    dirs_out
}

/// Candidate locations of the game client's append-only log.
pub fn player_log_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "windows")]
    {
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(r"AppData\LocalLow\Wizards Of The Coast\MTGA\Player.log"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Library/Logs/Wizards Of The Coast/MTGA/Player.log"));
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(
                ".wine/drive_c/users/steamuser/AppData/LocalLow/Wizards Of The Coast/MTGA/Player.log",
            ));
        }
    }

    paths
}
