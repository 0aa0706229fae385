//! Load state of the selected model and the indicator shown while it loads

use std::str::FromStr;

/// Represents where the selected model is in its load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing selected
    Idle,

    /// Selected, load not started yet
    Pending,

    /// Bytes are being fetched
    Fetching,

    /// Bytes arrived, model is being parsed and attached
    Attaching,

    /// Attached, waiting out the debounce before hiding the indicator
    Settling,

    /// Visible and interactive
    Ready,

    /// The primary load failed; the indicator stays up
    Failed(String),
}

impl LoadState {
    /// Whether the loading indicator should be shown
    pub fn is_loading(&self) -> bool {
        !matches!(self, LoadState::Idle | LoadState::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }

    /// Rough progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        match self {
            LoadState::Idle | LoadState::Pending | LoadState::Failed(_) => 0.0,
            LoadState::Fetching => 0.1,
            LoadState::Attaching => 0.7,
            LoadState::Settling => 0.9,
            LoadState::Ready => 1.0,
        }
    }
}

/// Visual style of the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorKind {
    #[default]
    LineSpinner,
}

/// Indicator size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl IndicatorSize {
    /// Spinner diameter in CSS pixels
    pub fn pixels(self) -> u32 {
        match self {
            IndicatorSize::Sm => 40,
            IndicatorSize::Md => 60,
            IndicatorSize::Lg => 80,
        }
    }
}

impl FromStr for IndicatorSize {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `Md`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "sm" => IndicatorSize::Sm,
            "lg" => IndicatorSize::Lg,
            _ => IndicatorSize::Md,
        })
    }
}

/// Spinner overlay shown above the viewport while a model loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingIndicator {
    pub kind: IndicatorKind,
    pub size: IndicatorSize,
    pub label: Option<String>,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self {
            kind: IndicatorKind::LineSpinner,
            size: IndicatorSize::Md,
            label: Some("Loading...".to_string()),
        }
    }
}

impl LoadingIndicator {
    pub fn with_size(mut self, size: IndicatorSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn spinner_px(&self) -> u32 {
        self.size.pixels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_loading_flag() {
        assert!(!LoadState::Idle.is_loading());
        assert!(LoadState::Pending.is_loading());
        assert!(LoadState::Settling.is_loading());
        assert!(LoadState::Failed("boom".into()).is_loading());
        assert!(!LoadState::Ready.is_loading());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let steps = [
            LoadState::Pending,
            LoadState::Fetching,
            LoadState::Attaching,
            LoadState::Settling,
            LoadState::Ready,
        ];
        for pair in steps.windows(2) {
            assert!(pair[0].progress() < pair[1].progress());
        }
    }

    #[test]
    fn test_indicator_defaults() {
        let indicator = LoadingIndicator::default();
        assert_eq!(indicator.kind, IndicatorKind::LineSpinner);
        assert_eq!(indicator.spinner_px(), 60);
        assert_eq!(indicator.label.as_deref(), Some("Loading..."));
    }

    #[test]
    fn test_indicator_size_parse() {
        assert_eq!("sm".parse::<IndicatorSize>().unwrap().pixels(), 40);
        assert_eq!("LG".parse::<IndicatorSize>().unwrap().pixels(), 80);
        assert_eq!("huge".parse::<IndicatorSize>().unwrap(), IndicatorSize::Md);
    }
}
