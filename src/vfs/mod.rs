//! Virtual filesystem used by the scanner and the package loader.
//!
//! `OsFileSystem` reads the real disk through `walkdir`, `MemoryFileSystem`
//! keeps a map of paths to contents and mirrors the behaviour of an on-disk
//! tree closely enough for tests.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::trace;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A single entry produced by listing or walking a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full path of the entry, rooted at the path handed to the filesystem
    pub path: PathBuf,

    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl WalkEntry {
    /// Name of the last path component
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

/// Directory listing and whole-file reads by path
pub trait FileSystem: Send + Sync {
    /// List the direct children of `dir` in lexical order
    fn read_dir(&self, dir: &Path) -> Result<Vec<WalkEntry>>;

    /// Read the whole file at `path`
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Check whether `path` exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Walk the tree below `root` in lexical pre-order, `root` included
    fn walk(&self, root: &Path) -> Result<Vec<WalkEntry>> {
        if !self.is_dir(root) {
            return Err(Error::io(
                root,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut entries = vec![WalkEntry {
            path: root.to_path_buf(),
            is_dir: true,
        }];
        walk_into(self, root, &mut entries)?;
        Ok(entries)
    }
}

fn walk_into<F: FileSystem + ?Sized>(fs: &F, dir: &Path, entries: &mut Vec<WalkEntry>) -> Result<()> {
    for entry in fs.read_dir(dir)? {
        let descend = entry.is_dir;
        let path = entry.path.clone();
        entries.push(entry);
        if descend {
            walk_into(fs, &path, entries)?;
        }
    }
    Ok(())
}

/// Filesystem backed by the real disk
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn read_dir(&self, dir: &Path) -> Result<Vec<WalkEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
            entries.push(WalkEntry {
                path: entry.path(),
                is_dir: file_type.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| Error::io(path, e))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk(&self, root: &Path) -> Result<Vec<WalkEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                Error::io(path, e.into())
            })?;
            trace!("Walked: {}", entry.path().display());
            entries.push(WalkEntry {
                path: entry.path().to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            });
        }

        Ok(entries)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(String),
}

/// In-memory filesystem keyed by path
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    nodes: BTreeMap<PathBuf, Node>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory together with its ancestors
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }

    /// Add a file together with its ancestor directories
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes.insert(path.to_path_buf(), Node::File(content.into()));
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_dir(&self, dir: &Path) -> Result<Vec<WalkEntry>> {
        match self.nodes.get(dir) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(Error::io(
                    dir,
                    io::Error::new(io::ErrorKind::Other, "not a directory"),
                ));
            }
            None => {
                return Err(Error::io(
                    dir,
                    io::Error::new(io::ErrorKind::NotFound, "no such directory"),
                ));
            }
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, node)| WalkEntry {
                path: path.clone(),
                is_dir: matches!(node, Node::Dir),
            })
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.nodes.get(path) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Dir) => Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::Other, "is a directory"),
            )),
            None => Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            )),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes.get(path), Some(Node::Dir))
    }
}
