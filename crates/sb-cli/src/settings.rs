use std::fs;
use std::path::Path;

use sb_core::memory::MemoryCard;
use sb_core::StoreRecord;

/// Read a settings file: a JSON object with the store keys.
pub fn read_settings(path: &Path) -> Result<StoreRecord, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Invalid settings '{}': {}", path.display(), e))
}

pub fn write_settings(path: &Path, record: &StoreRecord) -> Result<(), String> {
    let text = serde_json::to_string_pretty(record)
        .map_err(|e| format!("Failed to encode settings: {}", e))?;
    write_text(path, &(text + "\n"))
}

/// Read a card fixture: a JSON array of `{identity, tags, hidden}`.
pub fn read_cards(path: &Path) -> Result<Vec<MemoryCard>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Invalid card fixture '{}': {}", path.display(), e))
}

pub fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

pub fn write_text(path: &Path, text: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    fs::write(path, text)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}
