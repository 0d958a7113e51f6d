use std::collections::BTreeSet;

use foundation::ObjectId;

/// Ids picked out of one store category by a selection or bulk query.
///
/// Iteration yields ids in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<ObjectId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns `true` if the set changed.
    pub fn insert(&mut self, id: ObjectId) -> bool {
        self.ids.insert(id)
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<ObjectId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionSet;
    use foundation::ObjectId;

    #[test]
    fn membership_tracks_inserts() {
        let mut s = SelectionSet::new();
        assert!(s.is_empty());
        assert!(s.insert(ObjectId(7)));
        assert!(!s.insert(ObjectId(7)));
        assert!(s.contains(ObjectId(7)));
        assert!(!s.contains(ObjectId(8)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn ids_come_back_sorted() {
        let s: SelectionSet = [ObjectId(130), ObjectId(3), ObjectId(64)].into_iter().collect();
        let got: Vec<i32> = s.iter_ids().map(ObjectId::get).collect();
        assert_eq!(got, vec![3, 64, 130]);
    }

    #[test]
    fn large_ids_stay_small() {
        let s: SelectionSet = [ObjectId(i32::MAX), ObjectId(1)].into_iter().collect();
        assert_eq!(s.len(), 2);
        assert_eq!(s.iter_ids().last(), Some(ObjectId(i32::MAX)));
    }
}
