//! Cache index management
//!
//! `CacheIndex` maps keys to their `Header` and keeps them ordered by recency.
//! Nodes live in a `Vec` arena linked into a doubly-linked list: the head is the
//! least recently used entry, the tail the most recently used. Touching, inserting,
//! removing and popping the head are all O(1).

use crate::cache::entry::Header;
use std::collections::HashMap;

type Slot = usize;

#[derive(Debug)]
struct Node {
    header: Header,
    prev: Option<Slot>,
    next: Option<Slot>,
}

/// In-memory recency-ordered index of cached entries
#[derive(Debug, Default)]
pub struct CacheIndex {
    slots: HashMap<String, Slot>,
    nodes: Vec<Option<Node>>,
    free: Vec<Slot>,
    head: Option<Slot>,
    tail: Option<Slot>,
    total_size: u64,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Look up a header without changing recency
    pub fn peek(&self, key: &str) -> Option<&Header> {
        let slot = *self.slots.get(key)?;
        Some(&self.node(slot).header)
    }

    /// Look up a header and mark it most recently used
    pub fn get(&mut self, key: &str) -> Option<&Header> {
        let slot = *self.slots.get(key)?;
        self.move_to_back(slot);
        Some(&self.node(slot).header)
    }

    /// Insert or replace the header for `header.key`, marking it most recently used.
    ///
    /// Returns the replaced header, if any.
    pub fn insert(&mut self, header: Header) -> Option<Header> {
        self.total_size += header.size;

        let existing = self.slots.get(&header.key).copied();
        if let Some(slot) = existing {
            let node = self.node_mut(slot);
            let old = std::mem::replace(&mut node.header, header);
            self.total_size -= old.size;
            self.move_to_back(slot);
            return Some(old);
        }

        let key = header.key.clone();
        let node = Node {
            header,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.slots.insert(key, slot);
        self.link_back(slot);
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Header> {
        let slot = self.slots.remove(key)?;
        Some(self.release(slot))
    }

    /// Least recently used header, without removing it
    pub fn peek_lru(&self) -> Option<&Header> {
        self.head.map(|slot| &self.node(slot).header)
    }

    /// Remove and return the least recently used header
    pub fn pop_lru(&mut self) -> Option<Header> {
        let slot = self.head?;
        let key = self.node(slot).header.key.clone();
        self.slots.remove(&key);
        Some(self.release(slot))
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.total_size = 0;
    }

    /// Iterate headers from least to most recently used
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    fn node(&self, slot: Slot) -> &Node {
        self.nodes[slot].as_ref().expect("index slot must be occupied")
    }

    fn node_mut(&mut self, slot: Slot) -> &mut Node {
        self.nodes[slot].as_mut().expect("index slot must be occupied")
    }

    fn release(&mut self, slot: Slot) -> Header {
        self.unlink(slot);
        let node = self.nodes[slot].take().expect("index slot must be occupied");
        self.free.push(slot);
        self.total_size -= node.header.size;
        node.header
    }

    fn unlink(&mut self, slot: Slot) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
    }

    fn link_back(&mut self, slot: Slot) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(slot);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => self.node_mut(t).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    fn move_to_back(&mut self, slot: Slot) {
        if self.tail == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_back(slot);
    }
}

/// Iterator over headers in recency order (least recent first)
pub struct Iter<'a> {
    index: &'a CacheIndex,
    cursor: Option<Slot>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Header;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.index.node(slot);
        self.cursor = node.next;
        Some(&node.header)
    }
}
