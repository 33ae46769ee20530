use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;
use tempfile::NamedTempFile;

use crate::crypt::SlotCipher;
use crate::errors::Result;

/// Fixed key of the slot holding all notes.
pub const SLOT_KEY: &str = "simple_notes_all";

pub trait Storage {
    /// whole slot content, `None` when nothing was ever written
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// replace the whole slot content
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// where the slot lives, for diagnostics
    fn describe(&self) -> String;
}

/// One file per slot key: `<folder>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    folder: PathBuf,
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(folder: P, key: &str) -> FileStorage {
        let folder = folder.as_ref().to_path_buf();
        let path = folder.join(format!("{}.json", key));
        FileStorage { folder: folder, path: path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(ref e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut contents = vec![];
        file.read_to_end(&mut contents)?;
        debug!("event=slot_read path={} bytes={}", self.path.display(), contents.len());
        Ok(Some(contents))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.folder)?;
        // write next to the slot, then rename over it
        let mut tmp = NamedTempFile::new_in(&self.folder)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("event=slot_write path={} bytes={}", self.path.display(), bytes.len());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory slot. Clones share the same bytes, so a test can keep a handle
/// to inspect writes or to play an external writer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<Vec<u8>>>>,
    fail_writes: Rc<RefCell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub fn with_contents<B: Into<Vec<u8>>>(bytes: B) -> MemoryStorage {
        let storage = MemoryStorage::default();
        storage.set(bytes);
        storage
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.slot.borrow().clone()
    }

    pub fn set<B: Into<Vec<u8>>>(&self, bytes: B) {
        *self.slot.borrow_mut() = Some(bytes.into());
    }

    /// make every following write fail, as a full disk would
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if *self.fail_writes.borrow() {
            return Err(std::io::Error::new(IoErrorKind::Other, "storage quota exceeded").into());
        }
        self.set(bytes);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Seals everything written to the inner storage with a password.
#[derive(Clone)]
pub struct EncryptedStorage<S> {
    inner: S,
    cipher: SlotCipher,
}

impl<S: Storage> EncryptedStorage<S> {
    pub fn new(inner: S, cipher: SlotCipher) -> EncryptedStorage<S> {
        EncryptedStorage { inner: inner, cipher: cipher }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Storage> Storage for EncryptedStorage<S> {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        match self.inner.read()? {
            Some(sealed) => Ok(Some(self.cipher.open(&sealed)?)),
            None => Ok(None),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let sealed = self.cipher.seal(bytes)?;
        self.inner.write(&sealed)
    }

    fn describe(&self) -> String {
        format!("{} [encrypted]", self.inner.describe())
    }
}
