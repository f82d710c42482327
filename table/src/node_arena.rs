//! Index-linked node storage for the chains of a [`ChainedTable`](crate::ChainedTable).
//!
//! Nodes are stored in a single vector and refer to each other by [`NodeId`]. Released nodes are
//! threaded onto a free list through their `next` link and handed out again by later
//! allocations, so the arena only ever grows.
use std::ops::{Index, IndexMut};

use crate::{
    error::{try_reserve, AllocError},
    Key, Value,
};

/// Index of a node within its [`NodeArena`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(NodeId)
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Link to the next node of a chain, or to the next free node.
pub(crate) type Link = Option<NodeId>;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub key: Key,
    pub value: Value,
    pub next: Link,
}

/// Node counts of an arena.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    /// Nodes currently linked into a chain.
    pub live: usize,
    /// Nodes ever created, live or on the free list.
    pub reserved: usize,
}

#[derive(Clone, Default, Debug)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    free: Link,
    live: usize,
}

impl NodeArena {
    /// Ensures the next `additional` allocations won't need to grow the backing storage.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let free = self.nodes.len() - self.live;
        if additional > free {
            try_reserve(&mut self.nodes, additional - free)?;
        }
        Ok(())
    }

    /// Stores a new node, reusing a released one when available.
    pub fn alloc(&mut self, key: Key, value: Value, next: Link) -> Result<NodeId, AllocError> {
        let node = Node { key, value, next };
        let id = match self.free {
            Some(id) => {
                let slot = &mut self.nodes[id.index()];
                self.free = slot.next;
                *slot = node;
                id
            }
            None => {
                let id = NodeId::from_index(self.nodes.len()).ok_or(AllocError::CapacityOverflow)?;
                try_reserve(&mut self.nodes, 1)?;
                self.nodes.push(node);
                id
            }
        };
        self.live += 1;
        Ok(id)
    }

    /// Releases a node that is no longer linked into any chain and returns its contents.
    pub fn dealloc(&mut self, id: NodeId) -> Node {
        let slot = &mut self.nodes[id.index()];
        let node = std::mem::replace(
            slot,
            Node {
                key: 0,
                value: 0,
                next: self.free,
            },
        );
        self.free = Some(id);
        self.live -= 1;
        node
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            live: self.live,
            reserved: self.nodes.len(),
        }
    }

    #[cfg(test)]
    pub fn free_list_len(&self) -> usize {
        let mut len = 0;
        let mut cur = self.free;
        while let Some(id) = cur {
            len += 1;
            cur = self.nodes[id.index()].next;
        }
        len
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline(always)]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}
