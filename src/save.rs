//! Persistence — a checksummed binary save file plus the structured JSON
//! snapshot boundary used for export/import.

use crate::core::constants::SAVE_VERSION_MAGIC;
use crate::core::game_state::GameState;
use chrono::Utc;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveFile {
    saved_at: i64,
    state: GameState,
}

/// Manages saving and loading game state with checksum verification.
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Sets up the save directory at the platform's config location.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "guildhall").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;

        Ok(Self {
            save_path: config_dir.join("save.dat"),
        })
    }

    /// SaveManager for tests, pointed at a unique temp directory.
    #[cfg(test)]
    fn new_for_test() -> io::Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "guildhall-test-{}-{}",
            std::process::id(),
            test_id
        ));
        fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            save_path: temp_dir.join("save.dat"),
        })
    }

    /// Saves with checksum framing.
    ///
    /// File format:
    /// - Version magic (8 bytes)
    /// - Data length (4 bytes)
    /// - Serialized save payload (variable length)
    /// - SHA-256 checksum (32 bytes)
    pub fn save(&self, state: &GameState) -> io::Result<()> {
        let payload = SaveFile {
            saved_at: Utc::now().timestamp(),
            state: state.clone(),
        };
        let data = bincode::serialize(&payload)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let data_len = data.len() as u32;

        let mut hasher = Sha256::new();
        hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.save_path)?;
        file.write_all(&SAVE_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;

        Ok(())
    }

    /// Loads and verifies a save. Fails (without partial state) when the
    /// magic is wrong, the checksum mismatches, or the payload cannot be
    /// deserialized.
    pub fn load(&self) -> io::Result<GameState> {
        let mut file = fs::File::open(&self.save_path)?;

        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);
        if version != SAVE_VERSION_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Invalid save version: expected 0x{:016X}, got 0x{:016X}",
                    SAVE_VERSION_MAGIC, version
                ),
            ));
        }

        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes);

        let mut data = vec![0u8; data_len as usize];
        file.read_exact(&mut data)?;

        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&data);
        let computed_checksum = hasher.finalize();
        if stored_checksum != computed_checksum.as_slice() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Checksum verification failed",
            ));
        }

        let payload: SaveFile = bincode::deserialize(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(payload.state)
    }

    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }
}

/// Serializes the whole state into a structured JSON snapshot.
pub fn export_snapshot(state: &GameState) -> Option<String> {
    serde_json::to_string(state).ok()
}

/// Restores a state from a JSON snapshot. Validates minimal shape first
/// (currency and roster fields present) and rejects wholesale on structural
/// mismatch or parse failure — no partial mutation is possible.
pub fn import_snapshot(snapshot: &str) -> Option<GameState> {
    let value: serde_json::Value = serde_json::from_str(snapshot).ok()?;
    let shape_ok = value.get("gold").map(|v| v.is_u64()).unwrap_or(false)
        && value.get("roster").map(|v| v.is_array()).unwrap_or(false);
    if !shape_ok {
        return None;
    }
    serde_json::from_value(value).ok()
}
