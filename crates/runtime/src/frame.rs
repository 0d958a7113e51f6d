/// Redraw-cycle counter.
///
/// Every completed draw pass advances the frame; events are stamped with
/// the frame they were raised in so a host can order them against redraws.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Frame {
    /// 0-based pass index.
    pub index: u64,
}

impl Frame {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;

    #[test]
    fn next_advances_index() {
        let f0 = Frame::default();
        assert_eq!(f0.index, 0);
        assert_eq!(f0.next().next(), Frame::new(2));
        assert!(f0 < f0.next());
    }
}
