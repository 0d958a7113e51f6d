/// Process-unique identifier of a live map object.
///
/// Valid ids are strictly positive; zero and negative values never name a
/// live object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub i32);

impl ObjectId {
    pub fn new(n: i32) -> Option<Self> {
        (n > 0).then_some(ObjectId(n))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source owned by an object store.
///
/// Ids increase by one per allocation. On overflow the counter wraps back to
/// 1 (never to zero or a negative value) and skips ids that are still live.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: i32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts allocation at `first` (clamped to 1).
    pub fn starting_at(first: i32) -> Self {
        Self { next: first.max(1) }
    }

    pub fn allocate(&mut self, is_live: impl Fn(ObjectId) -> bool) -> ObjectId {
        loop {
            let id = ObjectId(self.next);
            self.next = if self.next == i32::MAX { 1 } else { self.next + 1 };
            if !is_live(id) {
                return id;
            }
        }
    }

    /// Keeps the counter ahead of an id that was assigned elsewhere
    /// (replicated from another store).
    pub fn observe(&mut self, id: ObjectId) {
        if id.0 >= self.next && id.0 < i32::MAX {
            self.next = id.0 + 1;
        }
    }

    pub fn peek(&self) -> ObjectId {
        ObjectId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdAllocator, ObjectId};

    #[test]
    fn ids_are_positive_and_monotonic() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate(|_| false);
        let b = ids.allocate(|_| false);
        assert_eq!(a, ObjectId(1));
        assert_eq!(b, ObjectId(2));
        assert!(ObjectId::new(0).is_none());
        assert!(ObjectId::new(-4).is_none());
    }

    #[test]
    fn wraps_away_from_non_positive_and_skips_live() {
        let mut ids = IdAllocator::starting_at(i32::MAX);
        assert_eq!(ids.allocate(|_| false), ObjectId(i32::MAX));
        // 1 and 2 are still alive: the allocator must skip them.
        let next = ids.allocate(|id| id.0 <= 2);
        assert_eq!(next, ObjectId(3));
    }

    #[test]
    fn observe_moves_counter_forward_only() {
        let mut ids = IdAllocator::new();
        ids.observe(ObjectId(10));
        assert_eq!(ids.peek(), ObjectId(11));
        ids.observe(ObjectId(4));
        assert_eq!(ids.peek(), ObjectId(11));
    }
}
