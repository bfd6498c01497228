//! Hierarchical key/value record store used by the finalizer.
//!
//! Containers are addressed by [`StorePath`]. Every container holds named values and named child
//! containers. Enumeration returns a snapshot taken at call time, so callers may delete entries
//! while walking a previously returned listing.

mod error;
mod fs_store;
mod memory;
mod path;

pub use error::StoreError;
pub use fs_store::{FsHandle, FsStore};
pub use memory::MemoryStore;
pub use path::StorePath;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerCounts {
    pub children: usize,
    pub values: usize,
}

impl ContainerCounts {
    pub fn is_empty(&self) -> bool {
        self.children == 0 && self.values == 0
    }
}

pub trait RecordStore {
    type Handle;

    fn open_container(&self, path: &StorePath) -> Result<Self::Handle, StoreError>;

    fn child_names(&self, handle: &Self::Handle) -> Result<Vec<String>, StoreError>;

    fn values(&self, handle: &Self::Handle) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    fn read_value(&self, handle: &Self::Handle, name: &str) -> Result<Vec<u8>, StoreError>;

    fn delete_child(
        &self,
        handle: &Self::Handle,
        name: &str,
        recursive: bool,
    ) -> Result<(), StoreError>;

    fn counts(&self, handle: &Self::Handle) -> Result<ContainerCounts, StoreError>;

    /// Like [`RecordStore::open_container`], with a missing container reported as `None`.
    fn try_open_container(&self, path: &StorePath) -> Result<Option<Self::Handle>, StoreError> {
        match self.open_container(path) {
            Ok(handle) => Ok(Some(handle)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn read_string(&self, handle: &Self::Handle, name: &str) -> Result<String, StoreError> {
        let raw = self.read_value(handle, name)?;
        let value = String::from_utf8(raw).map_err(|source| StoreError::InvalidUtf8 {
            name: name.to_string(),
            source,
        })?;
        Ok(value.trim_end_matches('\0').to_string())
    }
}
