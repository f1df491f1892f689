/*!
 * Node List
 * Arena-backed doubly-linked list with stable node indices
 *
 * # Design: Index Links Over Pointers
 *
 * Nodes live in a `Vec` of slots and refer to their neighbours by index, so
 * there are no ownership cycles and no unsafe code. Vacated slots are chained
 * into a free list and reused by the next push, which keeps steady-state
 * put/get cycles allocation-free.
 */

use crate::core::errors::{QueueError, QueueResult};
use crate::core::limits::MAX_RETAINED_FREE_SLOTS;

/// Stable index of a node inside the arena
pub(crate) type NodeIndex = usize;

struct Node<T> {
    prev: Option<NodeIndex>,
    next: Option<NodeIndex>,
    data: T,
}

enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<NodeIndex> },
}

/// FIFO chain of nodes from `head` (oldest) to `tail` (newest)
pub(crate) struct NodeList<T> {
    slots: Vec<Slot<T>>,
    free: Option<NodeIndex>,
    head: Option<NodeIndex>,
    tail: Option<NodeIndex>,
    length: usize,
}

impl<T> NodeList<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: None,
            head: None,
            tail: None,
            length: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Link a new node after the tail
    pub fn push_back(&mut self, data: T) {
        let node = Node {
            prev: self.tail,
            next: None,
            data,
        };
        let index = self.allocate(node);

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.length += 1;
    }

    /// Detach the head node and return its value
    pub fn pop_front(&mut self) -> Option<T> {
        let index = self.head?;
        let node = self.release(index);

        match node.next {
            Some(next) => {
                self.node_mut(next).prev = None;
                self.head = Some(next);
            }
            None => {
                self.head = None;
                self.tail = None;
            }
        }
        self.length -= 1;

        Some(node.data)
    }

    /// Borrow the oldest value
    pub fn front(&self) -> Option<&T> {
        self.head.map(|index| &self.node(index).data)
    }

    /// Drop every node; keeps at most `MAX_RETAINED_FREE_SLOTS` of capacity
    pub fn clear(&mut self) {
        self.slots.clear();
        self.slots.shrink_to(MAX_RETAINED_FREE_SLOTS);
        self.free = None;
        self.head = None;
        self.tail = None;
        self.length = 0;
    }

    /// Iterate from head to tail
    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.length,
        }
    }

    /// Walk the chain and verify every structural invariant
    ///
    /// O(n). Intended for tests and debugging, never for hot paths.
    pub fn validate(&self) -> QueueResult<()> {
        if self.head.is_none() != self.tail.is_none() || self.head.is_none() != (self.length == 0) {
            return Err(QueueError::EndpointMismatch {
                head: self.head,
                tail: self.tail,
                length: self.length,
            });
        }

        let mut counted = 0;
        let mut expected_prev = None;
        let mut cursor = self.head;

        while let Some(index) = cursor {
            let node = match self.slots.get(index) {
                Some(Slot::Occupied(node)) => node,
                Some(Slot::Vacant { .. }) => {
                    return Err(QueueError::BrokenLink {
                        index,
                        reason: "linked into a vacant slot".into(),
                    })
                }
                None => {
                    return Err(QueueError::BrokenLink {
                        index,
                        reason: "index outside the arena".into(),
                    })
                }
            };

            if node.prev != expected_prev {
                return Err(QueueError::BrokenLink {
                    index,
                    reason: format!("prev is {:?}, expected {:?}", node.prev, expected_prev),
                });
            }

            counted += 1;
            // A cycle would never terminate; more steps than slots means one exists
            if counted > self.slots.len() {
                return Err(QueueError::BrokenLink {
                    index,
                    reason: "cycle in next chain".into(),
                });
            }

            if node.next.is_none() && self.tail != Some(index) {
                return Err(QueueError::BrokenLink {
                    index,
                    reason: format!("chain ends here but tail is {:?}", self.tail),
                });
            }

            expected_prev = Some(index);
            cursor = node.next;
        }

        if counted != self.length {
            return Err(QueueError::LengthMismatch {
                recorded: self.length,
                counted,
            });
        }

        Ok(())
    }

    fn allocate(&mut self, node: Node<T>) -> NodeIndex {
        match self.free {
            Some(index) => {
                self.free = match self.slots[index] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {}", index),
                };
                self.slots[index] = Slot::Occupied(node);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: NodeIndex) -> Node<T> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(index);
                node
            }
            Slot::Vacant { .. } => unreachable!("released vacant slot {}", index),
        }
    }

    #[inline]
    fn node(&self, index: NodeIndex) -> &Node<T> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("linked index {} is vacant", index),
        }
    }

    #[inline]
    fn node_mut(&mut self, index: NodeIndex) -> &mut Node<T> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("linked index {} is vacant", index),
        }
    }
}

#[cfg(test)]
impl<T: std::fmt::Debug> std::fmt::Debug for NodeList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Head-to-tail iterator over a `NodeList`
#[cfg(test)]
pub(crate) struct Iter<'a, T> {
    list: &'a NodeList<T>,
    cursor: Option<NodeIndex>,
    remaining: usize,
}

#[cfg(test)]
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.list.node(index);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
impl<T> ExactSizeIterator for Iter<'_, T> {}
