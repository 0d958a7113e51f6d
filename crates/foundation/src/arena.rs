use std::collections::BTreeMap;

use crate::ids::ObjectId;

/// Id-keyed arena owning every object of one category.
///
/// Iteration is in ascending id order, which is also creation order while
/// the id counter has not wrapped.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: BTreeMap<ObjectId, T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `v` under `id`, returning the previous occupant.
    pub fn insert(&mut self, id: ObjectId, v: T) -> Option<T> {
        self.items.insert(id, v)
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &T)> + '_ {
        self.items.iter().map(|(id, v)| (*id, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut T)> + '_ {
        self.items.iter_mut().map(|(id, v)| (*id, v))
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.items.keys().copied().collect()
    }

    /// Ids of entries matching `pred`, in ascending order.
    pub fn ids_where(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<ObjectId> {
        self.items
            .iter()
            .filter(|(_, v)| pred(v))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Arena;
    use crate::ids::ObjectId;

    #[test]
    fn insert_get_remove() {
        let mut arena = Arena::new();
        assert!(arena.insert(ObjectId(3), "c").is_none());
        arena.insert(ObjectId(1), "a");
        assert_eq!(arena.get(ObjectId(3)), Some(&"c"));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.remove(ObjectId(1)), Some("a"));
        assert!(!arena.contains(ObjectId(1)));
    }

    #[test]
    fn iterates_in_id_order() {
        let mut arena = Arena::new();
        arena.insert(ObjectId(7), 70);
        arena.insert(ObjectId(2), 20);
        arena.insert(ObjectId(5), 50);
        let ids: Vec<i32> = arena.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![2, 5, 7]);
        assert_eq!(arena.ids_where(|v| *v > 30), vec![ObjectId(5), ObjectId(7)]);
    }
}
