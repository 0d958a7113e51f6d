use tracing::trace;

/// How much of the map must be redrawn.
///
/// Ordered by cost: a larger variant implies every smaller one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Redraw {
    #[default]
    None,
    /// Only the cursor overlay (crosshair, rubber-band measurement).
    Cursor,
    /// Object overlays on top of unchanged themes.
    Overlays,
    /// Everything, including re-projection of all geometry.
    Full,
}

/// Coalesces redraw requests between draw passes.
#[derive(Debug, Clone, Default)]
pub struct Redisplay {
    pending: Redraw,
    requests: u64,
}

impl Redisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, level: Redraw) {
        self.requests += 1;
        if level > self.pending {
            trace!(?level, "redraw escalated");
            self.pending = level;
        }
    }

    pub fn pending(&self) -> Redraw {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending != Redraw::None
    }

    /// Number of requests folded into the pending level.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    pub fn take(&mut self) -> Redraw {
        self.requests = 0;
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::{Redisplay, Redraw};

    #[test]
    fn requests_coalesce_to_the_largest() {
        let mut r = Redisplay::new();
        assert!(!r.is_pending());
        r.request(Redraw::Cursor);
        r.request(Redraw::Full);
        r.request(Redraw::Overlays);
        assert_eq!(r.pending(), Redraw::Full);
        assert_eq!(r.request_count(), 3);
        assert_eq!(r.take(), Redraw::Full);
        assert_eq!(r.take(), Redraw::None);
        assert_eq!(r.request_count(), 0);
    }
}
