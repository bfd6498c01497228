use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{ContainerCounts, RecordStore, StoreError, StorePath};

const VALUE_SUFFIX: &str = ".value";

/// Directory-backed store: containers are directories, values are `<name>.value` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsStore {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsHandle {
    path: StorePath,
    dir: PathBuf,
}

impl FsHandle {
    pub fn path(&self) -> &StorePath {
        &self.path
    }
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create_container(&self, path: &StorePath) -> Result<(), StoreError> {
        let dir = self.container_dir(path)?;
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))
    }

    pub fn set_value(&self, path: &StorePath, name: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_segment(path, name)?;
        self.create_container(path)?;
        let file = self.container_dir(path)?.join(value_file_name(name));
        fs::write(&file, value).map_err(|source| io_error(&file, source))
    }

    fn container_dir(&self, path: &StorePath) -> Result<PathBuf, StoreError> {
        let mut dir = self.root.clone();
        let mut walked = StorePath::root();
        for segment in path.segments() {
            validate_segment(&walked, segment)?;
            dir.push(segment);
            walked = walked.join(segment.clone());
        }
        Ok(dir)
    }
}

impl RecordStore for FsStore {
    type Handle = FsHandle;

    fn open_container(&self, path: &StorePath) -> Result<FsHandle, StoreError> {
        let dir = self.container_dir(path)?;
        match fs::metadata(&dir) {
            Ok(metadata) if metadata.is_dir() => Ok(FsHandle {
                path: path.clone(),
                dir,
            }),
            Ok(_) => Err(StoreError::NotFound(path.to_string())),
            Err(source) => Err(io_error(&dir, source)),
        }
    }

    fn child_names(&self, handle: &FsHandle) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in read_entries(&handle.dir)? {
            if entry.is_dir {
                names.push(entry.name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn values(&self, handle: &FsHandle) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut values = Vec::new();
        for entry in read_entries(&handle.dir)? {
            if entry.is_dir {
                continue;
            }
            let Some(name) = entry.name.strip_suffix(VALUE_SUFFIX) else {
                continue;
            };
            let file = handle.dir.join(&entry.name);
            match fs::read(&file) {
                Ok(value) => values.push((name.to_string(), value)),
                Err(source) if source.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(io_error(&file, source)),
            }
        }
        values.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(values)
    }

    fn read_value(&self, handle: &FsHandle, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_segment(&handle.path, name)?;
        let file = handle.dir.join(value_file_name(name));
        fs::read(&file).map_err(|source| io_error(&file, source))
    }

    fn delete_child(&self, handle: &FsHandle, name: &str, recursive: bool) -> Result<(), StoreError> {
        validate_segment(&handle.path, name)?;
        let child = self.open_container(&handle.path.join(name))?;
        if recursive {
            return fs::remove_dir_all(&child.dir).map_err(|source| io_error(&child.dir, source));
        }

        if !self.counts(&child)?.is_empty() {
            return Err(StoreError::NotEmpty(child.path.to_string()));
        }
        fs::remove_dir(&child.dir).map_err(|source| io_error(&child.dir, source))
    }

    fn counts(&self, handle: &FsHandle) -> Result<ContainerCounts, StoreError> {
        let mut counts = ContainerCounts::default();
        for entry in read_entries(&handle.dir)? {
            if entry.is_dir {
                counts.children += 1;
            } else if entry.name.ends_with(VALUE_SUFFIX) {
                counts.values += 1;
            }
        }
        Ok(counts)
    }
}

struct DirEntry {
    name: String,
    is_dir: bool,
}

fn read_entries(dir: &Path) -> Result<Vec<DirEntry>, StoreError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| io_error(dir, source))? {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let file_type = entry
            .file_type()
            .map_err(|source| io_error(&entry.path(), source))?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: file_type.is_dir(),
        });
    }
    Ok(entries)
}

fn value_file_name(name: &str) -> String {
    format!("{name}{VALUE_SUFFIX}")
}

fn validate_segment(parent: &StorePath, segment: &str) -> Result<(), StoreError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidPath {
            path: parent.to_string(),
            segment: segment.to_string(),
        });
    }
    Ok(())
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    if source.kind() == io::ErrorKind::NotFound {
        return StoreError::NotFound(path.display().to_string());
    }
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
