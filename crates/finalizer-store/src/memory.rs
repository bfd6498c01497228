use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{ContainerCounts, RecordStore, StoreError, StorePath};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    children: BTreeMap<String, Node>,
    values: BTreeMap<String, Vec<u8>>,
}

impl Node {
    fn lookup(&self, path: &StorePath) -> Option<&Node> {
        let mut node = self;
        for segment in path.segments() {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    fn lookup_mut(&mut self, path: &StorePath) -> Option<&mut Node> {
        let mut node = self;
        for segment in path.segments() {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }

    fn ensure(&mut self, path: &StorePath) -> &mut Node {
        let mut node = self;
        for segment in path.segments() {
            node = node.children.entry(segment.clone()).or_default();
        }
        node
    }

    fn collect_entries(&self, path: &StorePath, entries: &mut Vec<String>) {
        for name in self.values.keys() {
            entries.push(format!("{path}@{name}"));
        }
        for (name, child) in &self.children {
            let child_path = path.join(name.clone());
            entries.push(child_path.to_string());
            child.collect_entries(&child_path, entries);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    root: RefCell<Node>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_container(&self, path: &StorePath) {
        self.root.borrow_mut().ensure(path);
    }

    pub fn set_value(&self, path: &StorePath, name: &str, value: impl Into<Vec<u8>>) {
        self.root
            .borrow_mut()
            .ensure(path)
            .values
            .insert(name.to_string(), value.into());
    }

    pub fn contains(&self, path: &StorePath) -> bool {
        self.root.borrow().lookup(path).is_some()
    }

    /// Flattened listing of every container path and `container@value` pair, in sorted order.
    pub fn entries(&self) -> Vec<String> {
        let mut entries = Vec::new();
        self.root
            .borrow()
            .collect_entries(&StorePath::root(), &mut entries);
        entries
    }

    fn with_node<T>(
        &self,
        path: &StorePath,
        read: impl FnOnce(&Node) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let root = self.root.borrow();
        let node = root
            .lookup(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        read(node)
    }
}

impl RecordStore for MemoryStore {
    type Handle = StorePath;

    fn open_container(&self, path: &StorePath) -> Result<StorePath, StoreError> {
        self.with_node(path, |_| Ok(path.clone()))
    }

    fn child_names(&self, handle: &StorePath) -> Result<Vec<String>, StoreError> {
        self.with_node(handle, |node| Ok(node.children.keys().cloned().collect()))
    }

    fn values(&self, handle: &StorePath) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        self.with_node(handle, |node| {
            Ok(node
                .values
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect())
        })
    }

    fn read_value(&self, handle: &StorePath, name: &str) -> Result<Vec<u8>, StoreError> {
        self.with_node(handle, |node| {
            node.values
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("{handle}@{name}")))
        })
    }

    fn delete_child(
        &self,
        handle: &StorePath,
        name: &str,
        recursive: bool,
    ) -> Result<(), StoreError> {
        let mut root = self.root.borrow_mut();
        let parent = root
            .lookup_mut(handle)
            .ok_or_else(|| StoreError::NotFound(handle.to_string()))?;
        let child = parent
            .children
            .get(name)
            .ok_or_else(|| StoreError::NotFound(handle.join(name).to_string()))?;
        if !recursive && !(child.children.is_empty() && child.values.is_empty()) {
            return Err(StoreError::NotEmpty(handle.join(name).to_string()));
        }

        parent.children.remove(name);
        Ok(())
    }

    fn counts(&self, handle: &StorePath) -> Result<ContainerCounts, StoreError> {
        self.with_node(handle, |node| {
            Ok(ContainerCounts {
                children: node.children.len(),
                values: node.values.len(),
            })
        })
    }
}
