//! In-memory SizeFS directory model.
//!
//! The tree has a root and one level of folders. Each folder carries
//! extended attributes that describe how files inside it are filled
//! (`filler`, `prefix`, `suffix`, `padder`, `max_random`, `seed`). Files
//! are not stored anywhere: their size comes from their name (see
//! [`parse_size_spec`]) and their contents from the folder's patterns. Any
//! valid size name inside a folder can be opened, listed or not.
//!
//! ```text
//! /
//! ├── zeros/        filler = "0"
//! │   ├── 4M
//! │   ├── 4M-1B
//! │   └── 4M+1B
//! ├── ones/         filler = "1"
//! └── alpha_num/    filler = "[a-z,A-Z,0-9]"
//! ```
//!
//! Each open handle owns its own [`WindowedReader`]. Changing a folder's
//! attributes bumps its configuration generation, and handles rebuild their
//! reader on the next read instead of mutating the old one.

use crate::config::size::parse_size_spec;
use sizefs_contents::{ContentConfig, ContentError, PatternRole, WindowedReader};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::SystemTime;
use tracing::{debug, info};

/// Files listed in every folder.
pub const DEFAULT_FILES: [&str; 3] = ["4M", "4M-1B", "4M+1B"];

/// Folders created by [`SizeFs::new`] and their fillers.
pub const DEFAULT_FOLDERS: [(&str, &str); 3] = [
    ("/zeros", "0"),
    ("/ones", "1"),
    ("/alpha_num", "[a-z,A-Z,0-9]"),
];

pub const ATTRIBUTE_MAX_RANDOM: &str = "max_random";
pub const ATTRIBUTE_SEED: &str = "seed";

/// Block accounting reported by [`SizeFs::statfs`].
pub const FS_STATS: FsStats = FsStats {
    block_size: 512,
    blocks: 4096,
    blocks_available: 2048,
};

const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;

/// Error type for directory model operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Operation not permitted: {0}")]
    PermissionDenied(String),

    #[error("File exists: {0}")]
    AlreadyExists(String),

    #[error("Bad file handle: {0}")]
    BadHandle(u64),

    #[error("No attribute '{name}' on {path}")]
    NoAttribute { path: String, name: String },

    #[error("Invalid value for attribute '{name}' on {path}: {reason}")]
    InvalidAttribute {
        path: String,
        name: String,
        reason: String,
    },

    #[error("Failed to build file contents: {0}")]
    Content(#[from] ContentError),
}

impl FsError {
    /// The errno a filesystem protocol adapter should report.
    pub fn errno(&self) -> i32 {
        match self {
            FsError::NotFound(_) => libc::ENOENT,
            FsError::PermissionDenied(_) => libc::EPERM,
            FsError::AlreadyExists(_) => libc::EEXIST,
            FsError::BadHandle(_) => libc::EBADF,
            FsError::NoAttribute { .. } => libc::ENODATA,
            FsError::InvalidAttribute { .. } | FsError::Content(_) => libc::EINVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Attributes reported for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAttributes {
    pub kind: EntryKind,
    pub mode: u32,
    pub nlink: u32,
    pub size: u64,
    pub modified: SystemTime,
}

impl EntryAttributes {
    fn directory(nlink: u32, modified: SystemTime) -> Self {
        Self {
            kind: EntryKind::Directory,
            mode: S_IFDIR | 0o755,
            nlink,
            size: 0,
            modified,
        }
    }

    fn file(size: u64, modified: SystemTime) -> Self {
        Self {
            kind: EntryKind::File,
            mode: S_IFREG | 0o444,
            nlink: 1,
            size,
            modified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub block_size: u32,
    pub blocks: u64,
    pub blocks_available: u64,
}

#[derive(Debug)]
struct Folder {
    attrs: BTreeMap<String, String>,
    /// Files created explicitly, in addition to [`DEFAULT_FILES`]
    files: BTreeSet<String>,
    generation: u64,
    modified: SystemTime,
}

impl Folder {
    fn new(filler: &str) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert(PatternRole::Filler.as_str().to_string(), filler.to_string());
        Self {
            attrs,
            files: BTreeSet::new(),
            generation: 0,
            modified: SystemTime::now(),
        }
    }

    fn content_config(&self) -> ContentConfig {
        content_config(&self.attrs)
    }
}

fn content_config(attrs: &BTreeMap<String, String>) -> ContentConfig {
    let mut config = ContentConfig::default();
    for role in PatternRole::ALL {
        config.set(role, attrs.get(role.as_str()).cloned());
    }
    if let Some(max_random) = attrs
        .get(ATTRIBUTE_MAX_RANDOM)
        .and_then(|value| value.parse().ok())
    {
        config.max_random = max_random;
    }
    config.seed = attrs.get(ATTRIBUTE_SEED).and_then(|value| value.parse().ok());
    config
}

struct OpenFile {
    path: String,
    folder: String,
    generation: u64,
    reader: WindowedReader,
}

/// The SizeFS tree and its open file handles.
pub struct SizeFs {
    folders: BTreeMap<String, Folder>,
    handles: HashMap<u64, OpenFile>,
    next_handle: u64,
    created: SystemTime,
}

impl Default for SizeFs {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeFs {
    /// A tree with the default folders.
    pub fn new() -> Self {
        let mut fs = Self::empty();
        for (path, filler) in DEFAULT_FOLDERS {
            fs.folders.insert(path.to_string(), Folder::new(filler));
        }
        fs
    }

    /// A tree with only the root folder.
    pub fn empty() -> Self {
        Self {
            folders: BTreeMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
            created: SystemTime::now(),
        }
    }

    /// Create a folder directly under the root. New folders fill with zeros.
    pub fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        let (parent, name) = split_path(path)?;
        if name.is_empty() || self.folders.contains_key(path) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        if parent != "/" {
            return Err(FsError::PermissionDenied(path.to_string()));
        }

        self.folders
            .insert(path.to_string(), Folder::new(PatternRole::Filler.default_pattern()));
        info!("Created folder {path}");
        Ok(())
    }

    /// Create a folder and set its filler in one step.
    pub fn mkdir_with_filler(&mut self, path: &str, filler: &str) -> Result<(), FsError> {
        self.mkdir(path)?;
        if let Err(err) = self.setxattr(path, PatternRole::Filler.as_str(), filler) {
            self.folders.remove(path);
            return Err(err);
        }
        Ok(())
    }

    /// Remove a folder. Handles opened inside it stop working.
    pub fn rmdir(&mut self, path: &str) -> Result<(), FsError> {
        if path == "/" {
            return Err(FsError::PermissionDenied(path.to_string()));
        }
        if self.folders.remove(path).is_none() {
            return Err(FsError::NotFound(path.to_string()));
        }
        info!("Removed folder {path}");
        Ok(())
    }

    /// Set a folder attribute.
    ///
    /// Pattern and numeric attributes are validated by building a reader
    /// from the resulting configuration; nothing changes if that fails.
    pub fn setxattr(&mut self, path: &str, name: &str, value: &str) -> Result<(), FsError> {
        let folder = self.folder_mut(path)?;

        let mut attrs = folder.attrs.clone();
        attrs.insert(name.to_string(), value.to_string());
        validate_attributes(path, name, &attrs)?;

        folder.attrs = attrs;
        folder.generation += 1;
        folder.modified = SystemTime::now();
        debug!(
            "Set {name}={value:?} on {path} (generation {})",
            folder.generation
        );
        Ok(())
    }

    pub fn getxattr(&self, path: &str, name: &str) -> Result<String, FsError> {
        self.folder(path)?
            .attrs
            .get(name)
            .cloned()
            .ok_or_else(|| FsError::NoAttribute {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    pub fn listxattr(&self, path: &str) -> Result<Vec<String>, FsError> {
        Ok(self.folder(path)?.attrs.keys().cloned().collect())
    }

    pub fn removexattr(&mut self, path: &str, name: &str) -> Result<(), FsError> {
        let folder = self.folder_mut(path)?;
        if folder.attrs.remove(name).is_none() {
            return Err(FsError::NoAttribute {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        folder.generation += 1;
        folder.modified = SystemTime::now();
        debug!("Removed {name} from {path} (generation {})", folder.generation);
        Ok(())
    }

    /// List a directory, `.` and `..` included.
    pub fn readdir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let mut entries = vec![".".to_string(), "..".to_string()];

        if path == "/" {
            entries.extend(
                self.folders
                    .keys()
                    .map(|folder| folder.trim_start_matches('/').to_string()),
            );
            return Ok(entries);
        }

        let folder = self.folder(path)?;
        entries.extend(DEFAULT_FILES.iter().map(|file| file.to_string()));
        entries.extend(
            folder
                .files
                .iter()
                .filter(|file| !DEFAULT_FILES.contains(&file.as_str()))
                .cloned(),
        );
        Ok(entries)
    }

    pub fn getattr(&self, path: &str) -> Result<EntryAttributes, FsError> {
        if path == "/" {
            let nlink = 2 + self.folders.len() as u32;
            return Ok(EntryAttributes::directory(nlink, self.created));
        }
        if let Some(folder) = self.folders.get(path) {
            return Ok(EntryAttributes::directory(2, folder.modified));
        }

        let (folder, size) = self.lookup_file(path)?;
        Ok(EntryAttributes::file(size, self.folders[folder].modified))
    }

    /// Create a file whose name is a size specification.
    pub fn create(&mut self, path: &str) -> Result<(), FsError> {
        let (parent, name) = split_path(path)?;
        let denied = || FsError::PermissionDenied(path.to_string());

        if parse_size_spec(name).is_err() {
            return Err(denied());
        }
        let folder = self.folders.get_mut(parent).ok_or_else(denied)?;
        folder.files.insert(name.to_string());
        debug!("Created file {path}");
        Ok(())
    }

    /// Remove a created file.
    pub fn unlink(&mut self, path: &str) -> Result<(), FsError> {
        let (parent, name) = split_path(path)?;
        let folder = self
            .folders
            .get_mut(parent)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        if !folder.files.remove(name) {
            return Err(FsError::NotFound(path.to_string()));
        }
        Ok(())
    }

    /// Open a file and return its handle.
    pub fn open(&mut self, path: &str) -> Result<u64, FsError> {
        let (folder_path, size) = self.lookup_file(path)?;
        let folder = &self.folders[folder_path];
        let reader = WindowedReader::new(size, &folder.content_config())?;

        let open_file = OpenFile {
            path: path.to_string(),
            folder: folder_path.to_string(),
            generation: folder.generation,
            reader,
        };

        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, open_file);
        debug!("Opened {path} ({size} bytes) as handle {handle}");
        Ok(handle)
    }

    /// Read up to `size` bytes at `offset` from an open handle.
    pub fn read(&mut self, handle: u64, size: u64, offset: u64) -> Result<Vec<u8>, FsError> {
        let open_file = self
            .handles
            .get_mut(&handle)
            .ok_or(FsError::BadHandle(handle))?;
        let folder = self
            .folders
            .get(&open_file.folder)
            .ok_or_else(|| FsError::NotFound(open_file.path.clone()))?;

        if folder.generation != open_file.generation {
            info!(
                "Configuration of {} changed, rebuilding reader for {}",
                open_file.folder, open_file.path
            );
            let total_size = open_file.reader.total_size();
            open_file.reader = WindowedReader::new(total_size, &folder.content_config())?;
            open_file.generation = folder.generation;
        }

        Ok(open_file.reader.read_at(offset, size))
    }

    /// Close a handle.
    pub fn release(&mut self, handle: u64) -> Result<(), FsError> {
        self.handles
            .remove(&handle)
            .map(|_| ())
            .ok_or(FsError::BadHandle(handle))
    }

    /// File contents are generated, never written.
    pub fn write(&mut self, path: &str, _data: &[u8], _offset: u64) -> Result<usize, FsError> {
        Err(FsError::PermissionDenied(path.to_string()))
    }

    pub fn truncate(&mut self, path: &str, _length: u64) -> Result<(), FsError> {
        Err(FsError::PermissionDenied(path.to_string()))
    }

    /// Move a folder to a new name under the root.
    ///
    /// Open handles follow the folder and rebuild their reader on the next
    /// read.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), FsError> {
        if old == "/" {
            return Err(FsError::PermissionDenied(old.to_string()));
        }
        if !self.folders.contains_key(old) {
            return Err(self.not_a_folder(old));
        }
        let (parent, name) = split_path(new)?;
        if name.is_empty() || self.folders.contains_key(new) {
            return Err(FsError::AlreadyExists(new.to_string()));
        }
        if parent != "/" {
            return Err(FsError::PermissionDenied(new.to_string()));
        }

        let mut folder = self
            .folders
            .remove(old)
            .ok_or_else(|| FsError::NotFound(old.to_string()))?;
        folder.generation += 1;
        folder.modified = SystemTime::now();
        self.folders.insert(new.to_string(), folder);

        for open_file in self.handles.values_mut().filter(|f| f.folder == old) {
            open_file.path = format!("{new}{}", &open_file.path[old.len()..]);
            open_file.folder = new.to_string();
        }
        info!("Renamed folder {old} to {new}");
        Ok(())
    }

    pub fn chmod(&mut self, path: &str, _mode: u32) -> Result<(), FsError> {
        Err(FsError::PermissionDenied(path.to_string()))
    }

    pub fn chown(&mut self, path: &str, _uid: u32, _gid: u32) -> Result<(), FsError> {
        Err(FsError::PermissionDenied(path.to_string()))
    }

    pub fn symlink(&mut self, _target: &str, link: &str) -> Result<(), FsError> {
        Err(FsError::PermissionDenied(link.to_string()))
    }

    pub fn statfs(&self, path: &str) -> Result<FsStats, FsError> {
        self.getattr(path)?;
        Ok(FS_STATS)
    }

    /// Create a file if needed and read from it, without keeping a handle.
    pub fn cread(&mut self, path: &str, size: u64, offset: u64) -> Result<Vec<u8>, FsError> {
        self.create(path)?;
        let handle = self.open(path)?;
        let content = self.read(handle, size, offset);
        self.release(handle)?;
        content
    }

    fn folder(&self, path: &str) -> Result<&Folder, FsError> {
        self.folders.get(path).ok_or_else(|| self.not_a_folder(path))
    }

    fn folder_mut(&mut self, path: &str) -> Result<&mut Folder, FsError> {
        if !self.folders.contains_key(path) {
            return Err(self.not_a_folder(path));
        }
        self.folders
            .get_mut(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    /// Files carry no attributes; anything else missing does not exist.
    fn not_a_folder(&self, path: &str) -> FsError {
        if self.lookup_file(path).is_ok() {
            FsError::PermissionDenied(path.to_string())
        } else {
            FsError::NotFound(path.to_string())
        }
    }

    /// Resolve a file path into its folder key and size.
    fn lookup_file<'a>(&self, path: &'a str) -> Result<(&'a str, u64), FsError> {
        let not_found = || FsError::NotFound(path.to_string());
        let (parent, name) = split_path(path)?;

        if parent == "/" || !self.folders.contains_key(parent) {
            return Err(not_found());
        }
        let size = parse_size_spec(name).map_err(|_| not_found())?;
        Ok((parent, size))
    }
}

/// Reject attribute sets that would not produce a working reader.
fn validate_attributes(
    path: &str,
    name: &str,
    attrs: &BTreeMap<String, String>,
) -> Result<(), FsError> {
    let invalid = |reason: String| FsError::InvalidAttribute {
        path: path.to_string(),
        name: name.to_string(),
        reason,
    };

    if let Some(value) = attrs.get(ATTRIBUTE_MAX_RANDOM) {
        value
            .parse::<u32>()
            .map_err(|err| invalid(format!("{value:?} is not a count: {err}")))?;
    }
    if let Some(value) = attrs.get(ATTRIBUTE_SEED) {
        value
            .parse::<u64>()
            .map_err(|err| invalid(format!("{value:?} is not a seed: {err}")))?;
    }

    WindowedReader::new(0, &content_config(attrs)).map_err(|err| invalid(err.to_string()))?;
    Ok(())
}

/// Split an absolute path into its parent and final component.
fn split_path(path: &str) -> Result<(&str, &str), FsError> {
    if !path.starts_with('/') {
        return Err(FsError::NotFound(path.to_string()));
    }
    let trimmed = path.trim_end_matches('/');
    let (parent, name) = trimmed.rsplit_once('/').unwrap_or(("", ""));
    let parent = if parent.is_empty() { "/" } else { parent };
    Ok((parent, name))
}
