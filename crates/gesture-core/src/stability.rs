//! Rolling-history vote over recent classifications.
//!
//! A single noisy frame must not trigger a capture. The filter keeps the
//! last `window` labels (about one second at 30 fps) and confirms a
//! candidate only when it makes up at least `match_ratio` of the recent
//! non-empty labels.
//!
//! Until the history holds more than `min_samples` labels every non-empty
//! candidate is accepted provisionally. This keeps the first half second
//! of a session from stalling while the window fills.

use std::collections::{HashMap, VecDeque};

use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_hand_model::Gesture;
use serde::{Deserialize, Serialize};

/// Stability filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Number of recent labels kept.
    pub window: usize,

    /// History length at or below which candidates fail open.
    pub min_samples: usize,

    /// Fraction of non-empty history that must match the candidate.
    pub match_ratio: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window: 30,
            min_samples: 15,
            match_ratio: 0.5,
        }
    }
}

impl StabilityConfig {
    pub fn validate(&self) -> PalmcapResult<()> {
        if self.window == 0 {
            return Err(PalmcapError::config("stability window must be at least 1"));
        }
        if self.min_samples >= self.window {
            return Err(PalmcapError::config(format!(
                "stability min_samples ({}) must be below the window ({})",
                self.min_samples, self.window
            )));
        }
        if !(self.match_ratio > 0.0 && self.match_ratio <= 1.0) {
            return Err(PalmcapError::config(format!(
                "stability match_ratio must be in (0, 1], got {}",
                self.match_ratio
            )));
        }
        Ok(())
    }
}

/// Bounded history of per-frame gesture labels.
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    config: StabilityConfig,
    history: VecDeque<Gesture>,
}

impl StabilityFilter {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.window),
            config,
        }
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Append one frame's label, evicting the oldest beyond the window.
    ///
    /// A zero window behaves as a window of one.
    pub fn push(&mut self, gesture: Gesture) {
        let window = self.config.window.max(1);
        while self.history.len() >= window {
            self.history.pop_front();
        }
        self.history.push_back(gesture);
    }

    /// Whether the history is still short enough to fail open.
    pub fn is_warming_up(&self) -> bool {
        self.history.len() <= self.config.min_samples
    }

    /// Whether `candidate` is stable against the current history.
    ///
    /// [`Gesture::None`] is never confirmed.
    pub fn is_confirmed(&self, candidate: Gesture) -> bool {
        if candidate.is_none() {
            return false;
        }
        if self.is_warming_up() {
            return true;
        }

        let (matches, non_empty) = self
            .history
            .iter()
            .filter(|g| !g.is_none())
            .fold((0usize, 0usize), |(m, n), g| {
                (m + usize::from(*g == candidate), n + 1)
            });

        non_empty > 0 && matches as f64 >= self.config.match_ratio * non_empty as f64
    }

    /// Record `gesture` and return it if it is now confirmed.
    pub fn observe(&mut self, gesture: Gesture) -> Option<Gesture> {
        self.push(gesture);
        self.is_confirmed(gesture).then_some(gesture)
    }

    /// Most frequent non-empty label in the history, for diagnostics.
    ///
    /// Ties resolve to the label seen most recently.
    pub fn dominant(&self) -> Option<Gesture> {
        let mut counts: HashMap<Gesture, usize> = HashMap::new();
        for g in self.history.iter().filter(|g| !g.is_none()) {
            *counts.entry(*g).or_default() += 1;
        }
        let best = counts.values().copied().max()?;
        self.history
            .iter()
            .rev()
            .find(|g| counts.get(g) == Some(&best))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Labels from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = Gesture> + '_ {
        self.history.iter().copied()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(StabilityConfig::default())
    }
}
