//! Read-only catalog index.
//!
//! Records live in a single `Vec` filled in load order. Two lookup paths
//! point back into it by position:
//!
//! - an id slot table (`id - 1` → position) for constant-time id lookup;
//! - an unbalanced binary search tree keyed by ASCII case-insensitive name.
//!
//! Tree nodes are stored in an arena and refer to records by position, so
//! nothing is copied and no node owns a record. The index is built once and
//! never mutated afterwards; share it behind an `Arc` for concurrent reads.
//!
//! Name lookup is O(log n) on average and O(n) for adversarial (sorted)
//! input, since the tree is never rebalanced.

use std::cmp::Ordering;

use crate::error::CatalogError;
use crate::models::Record;

/// Catalog of records with id and name lookup.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    capacity: usize,
    records: Vec<Record>,
    slots: Vec<Option<usize>>,
    names: NameTree,
    shadowed: usize,
}

impl CatalogIndex {
    /// Builds the index from records in load order.
    ///
    /// Each record is stored at the next position, its id is mapped to that
    /// position, and its name is inserted into the tree. A name equal
    /// (ignoring ASCII case) to an earlier one is not inserted, so the first
    /// record keeps the name; the later record stays reachable by id.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CapacityExceeded`] if more than `capacity` records
    ///   are supplied.
    /// - [`CatalogError::IdOutOfRange`] for an id outside `1..=capacity`.
    /// - [`CatalogError::DuplicateId`] when an id repeats.
    pub fn build<I>(records: I, capacity: usize) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut index = Self {
            capacity,
            records: Vec::with_capacity(capacity),
            slots: vec![None; capacity],
            names: NameTree::default(),
            shadowed: 0,
        };

        for record in records {
            if index.records.len() == capacity {
                return Err(CatalogError::CapacityExceeded { capacity });
            }
            let slot = index
                .slot_of(record.id)
                .ok_or(CatalogError::IdOutOfRange {
                    id: record.id,
                    capacity,
                })?;
            if index.slots[slot].is_some() {
                return Err(CatalogError::DuplicateId { id: record.id });
            }

            let position = index.records.len();
            index.records.push(record);
            index.slots[slot] = Some(position);
            if !index.names.insert(&index.records, position) {
                index.shadowed += 1;
            }
        }

        Ok(index)
    }

    /// Record with the given id, or `None` outside `1..=capacity` or for an
    /// id that was never loaded.
    pub fn lookup_by_id(&self, id: u32) -> Option<&Record> {
        let slot = self.slot_of(id)?;
        self.slots[slot].map(|position| &self.records[position])
    }

    /// Record whose name matches `name` ignoring ASCII case.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Record> {
        self.names
            .find(&self.records, name)
            .map(|position| &self.records[position])
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The fixed record count `N` the index was built for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Records reachable by name, in case-insensitive name order.
    pub fn iter_by_name(&self) -> ByName<'_> {
        ByName {
            records: &self.records,
            nodes: &self.names.nodes,
            stack: Vec::new(),
            next: self.names.root,
        }
    }

    /// Records whose name was already taken by an earlier record, so they
    /// are reachable by id only.
    pub fn shadowed_names(&self) -> usize {
        self.shadowed
    }

    /// Ids in `1..=capacity` with no loaded record.
    pub fn missing_ids(&self) -> Vec<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, position)| position.is_none())
            .map(|(slot, _)| slot as u32 + 1)
            .collect()
    }

    fn slot_of(&self, id: u32) -> Option<usize> {
        let id = id as usize;
        (1..=self.capacity).contains(&id).then(|| id - 1)
    }
}

/// Compares two names the way `strcasecmp` does: byte-wise after ASCII
/// lowercasing, shorter prefix first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

#[derive(Debug, Clone, Copy)]
struct Node {
    record: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl Node {
    fn leaf(record: usize) -> Self {
        Self {
            record,
            left: None,
            right: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct NameTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl NameTree {
    /// Inserts the record at `position`. Returns `false` if an equal name is
    /// already present, leaving the tree unchanged.
    fn insert(&mut self, records: &[Record], position: usize) -> bool {
        let key = records[position].name.as_str();
        let new_node = self.nodes.len();

        let Some(mut current) = self.root else {
            self.nodes.push(Node::leaf(position));
            self.root = Some(new_node);
            return true;
        };

        loop {
            let node = self.nodes[current];
            let child = match compare_names(key, &records[node.record].name) {
                Ordering::Less => &mut self.nodes[current].left,
                Ordering::Greater => &mut self.nodes[current].right,
                Ordering::Equal => return false,
            };
            match *child {
                Some(next) => current = next,
                None => {
                    *child = Some(new_node);
                    self.nodes.push(Node::leaf(position));
                    return true;
                }
            }
        }
    }

    fn find(&self, records: &[Record], name: &str) -> Option<usize> {
        let mut current = self.root;
        while let Some(index) = current {
            let node = &self.nodes[index];
            current = match compare_names(name, &records[node.record].name) {
                Ordering::Equal => return Some(node.record),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }
}

/// In-order traversal of the name tree. See [`CatalogIndex::iter_by_name`].
pub struct ByName<'a> {
    records: &'a [Record],
    nodes: &'a [Node],
    stack: Vec<usize>,
    next: Option<usize>,
}

impl<'a> Iterator for ByName<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(index) = self.next {
            self.stack.push(index);
            self.next = self.nodes[index].left;
        }
        let index = self.stack.pop()?;
        self.next = self.nodes[index].right;
        Some(&self.records[self.nodes[index].record])
    }
}
