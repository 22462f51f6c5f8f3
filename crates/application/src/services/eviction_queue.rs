use ferrous_rpz_domain::RpzAddress;
use rustc_hash::FxHashMap;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node {
    address: RpzAddress,
    prev: usize,
    next: usize,
}

/// Order-preserving FIFO of addresses with O(1) move-to-tail and O(1)
/// pop-from-head. Head is the most idle address (next shearing candidate),
/// tail the freshest.
///
/// Nodes live in a slab and are addressed through integer handles held in a
/// side index; associations never hold pointers into the queue.
#[derive(Debug)]
pub struct EvictionQueue {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: FxHashMap<RpzAddress, usize>,
    head: usize,
    tail: usize,
}

impl EvictionQueue {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            index: FxHashMap::default(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Move `address` to the tail, inserting it when unknown.
    pub fn touch(&mut self, address: RpzAddress) {
        if let Some(&idx) = self.index.get(&address) {
            if self.tail == idx {
                return;
            }
            self.unlink(idx);
            self.link_tail(idx);
        } else {
            let idx = self.allocate(address);
            self.index.insert(address, idx);
            self.link_tail(idx);
        }
    }

    /// Remove and return up to `n` addresses from the head. The second
    /// element reports the shortfall when the queue ran out early.
    pub fn shear(&mut self, n: usize) -> (Vec<RpzAddress>, usize) {
        let mut sheared = Vec::with_capacity(n.min(self.len()));
        while sheared.len() < n {
            let idx = self.head;
            if idx == NIL {
                break;
            }
            let address = self.nodes[idx].address;
            self.unlink(idx);
            self.release(idx);
            self.index.remove(&address);
            sheared.push(address);
        }
        let shortfall = n - sheared.len();
        (sheared, shortfall)
    }

    pub fn remove(&mut self, address: &RpzAddress) -> bool {
        match self.index.remove(address) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, address: &RpzAddress) -> bool {
        self.index.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Walk head → tail.
    pub fn iter(&self) -> QueueIter<'_> {
        QueueIter {
            queue: self,
            cursor: self.head,
        }
    }

    /// Up to `n` addresses from the head (oldest first).
    pub fn peek_head(&self, n: usize) -> Vec<RpzAddress> {
        self.iter().take(n).collect()
    }

    /// Up to `n` addresses from the tail (freshest first).
    pub fn peek_tail(&self, n: usize) -> Vec<RpzAddress> {
        let mut out = Vec::with_capacity(n.min(self.len()));
        let mut cursor = self.tail;
        while cursor != NIL && out.len() < n {
            out.push(self.nodes[cursor].address);
            cursor = self.nodes[cursor].prev;
        }
        out
    }

    fn allocate(&mut self, address: RpzAddress) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Node {
                    address,
                    prev: NIL,
                    next: NIL,
                };
                idx
            }
            None => {
                self.nodes.push(Node {
                    address,
                    prev: NIL,
                    next: NIL,
                });
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) {
        self.free.push(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }

    fn link_tail(&mut self, idx: usize) {
        self.nodes[idx].prev = self.tail;
        self.nodes[idx].next = NIL;
        if self.tail != NIL {
            self.nodes[self.tail].next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
    }
}

impl Default for EvictionQueue {
    fn default() -> Self {
        Self::new()
    }
}

pub struct QueueIter<'a> {
    queue: &'a EvictionQueue,
    cursor: usize,
}

impl Iterator for QueueIter<'_> {
    type Item = RpzAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.queue.nodes[self.cursor];
        self.cursor = node.next;
        Some(node.address)
    }
}
