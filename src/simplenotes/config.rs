use std::path::PathBuf;

use crate::args::Cli;
use crate::clock::SystemClock;
use crate::crypt::SlotCipher;
use crate::errors::Result;
use crate::specific_fail;
use crate::storage::{EncryptedStorage, FileStorage, Storage};
use crate::store::NoteStore;
use crate::utils::{find_data_folder, get_password};

/// Settings resolved from flags, environment and the home folder.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub slot: String,
    pub key: Option<String>,
    pub encrypted: bool,
    pub yes: bool,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Config> {
        validate_slot(&cli.slot)?;
        let data_dir = find_data_folder(&cli.data_dir)?;
        let log_dir = match cli.log_dir {
            Some(ref dir) => PathBuf::from(dir),
            None => data_dir.join("logs"),
        };
        Ok(Config {
            data_dir: data_dir,
            slot: cli.slot.clone(),
            key: cli.key.clone(),
            encrypted: cli.encrypted,
            yes: cli.yes,
            log_level: cli.log_level.clone(),
            log_dir: log_dir,
        })
    }

    pub fn slot_storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir, &self.slot)
    }

    /// Load the note store. An encrypted slot that cannot be opened is an
    /// error here rather than an empty collection, so a wrong key never
    /// leads to the slot being overwritten.
    pub fn open_store(&self) -> Result<NoteStore> {
        let file = self.slot_storage();
        if !self.encrypted {
            return Ok(NoteStore::load(file, SystemClock));
        }

        let key = match self.key {
            Some(ref k) => k.clone(),
            None => get_password()?,
        };
        let storage = EncryptedStorage::new(file, SlotCipher::new(key));
        storage.read()?;
        Ok(NoteStore::load(storage, SystemClock))
    }
}

/// Slot keys become file names, so keep them to a safe alphabet.
pub fn validate_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        specific_fail!(format!("invalid slot name '{}': use letters, digits, '-' and '_'", slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn slot_names_are_checked() {
        assert!(validate_slot("simple_notes_all").is_ok());
        assert!(validate_slot("work-2").is_ok());
        assert!(validate_slot("").is_err());
        assert!(validate_slot("../etc").is_err());
    }

    #[test]
    fn log_dir_defaults_under_data_dir() {
        let cli = Cli::try_parse_from(["simplenotes", "--data-dir", "/tmp/sn", "--log-level", "debug"])
            .unwrap();
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/sn"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/sn/logs"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.slot_storage().path(), PathBuf::from("/tmp/sn/simple_notes_all.json"));
    }
}
