use serde::{Deserialize, Serialize};

/// Per-object display mode.
///
/// Locked modes ignore bulk show/hide requests; only an explicit per-object
/// change moves an object out of a locked mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    Off,
    #[default]
    On,
    LockedOff,
    LockedOn,
    SelectedOn,
}

impl DisplayMode {
    pub fn is_visible(self) -> bool {
        matches!(
            self,
            DisplayMode::On | DisplayMode::LockedOn | DisplayMode::SelectedOn
        )
    }

    pub fn is_locked(self) -> bool {
        matches!(self, DisplayMode::LockedOff | DisplayMode::LockedOn)
    }

    /// Result of a bulk show/hide request targeting `target`.
    pub fn bulk(self, target: DisplayMode) -> DisplayMode {
        if self.is_locked() { self } else { target }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub mode: DisplayMode,
    pub selected: bool,
}

impl DisplayState {
    pub fn with_mode(mode: DisplayMode) -> Self {
        Self {
            mode,
            selected: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.mode.is_visible()
    }
}

#[cfg(test)]
mod tests {
    use super::DisplayMode;

    #[test]
    fn locked_modes_survive_bulk_requests() {
        assert_eq!(DisplayMode::LockedOn.bulk(DisplayMode::Off), DisplayMode::LockedOn);
        assert_eq!(DisplayMode::LockedOff.bulk(DisplayMode::On), DisplayMode::LockedOff);
        assert_eq!(DisplayMode::On.bulk(DisplayMode::Off), DisplayMode::Off);
        assert_eq!(DisplayMode::SelectedOn.bulk(DisplayMode::Off), DisplayMode::Off);
    }

    #[test]
    fn visibility_by_mode() {
        assert!(DisplayMode::SelectedOn.is_visible());
        assert!(DisplayMode::LockedOn.is_visible());
        assert!(!DisplayMode::LockedOff.is_visible());
        assert!(!DisplayMode::Off.is_visible());
    }
}
