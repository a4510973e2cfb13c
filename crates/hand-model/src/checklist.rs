//! The list of gestures a capture session must collect.

use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;
use crate::ModelError;

/// One required gesture and whether it has been captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub gesture: Gesture,
    pub captured: bool,
}

/// Ordered, duplicate-free set of required gestures.
///
/// An entry flips from pending to captured at most once; only [`reset`]
/// clears it again.
///
/// [`reset`]: CaptureChecklist::reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureChecklist {
    entries: Vec<ChecklistEntry>,
}

impl CaptureChecklist {
    /// Build a checklist from required gestures, in order.
    ///
    /// Rejects [`Gesture::None`] and repeated gestures.
    pub fn new(required: impl IntoIterator<Item = Gesture>) -> Result<Self, ModelError> {
        let mut entries: Vec<ChecklistEntry> = Vec::new();
        for gesture in required {
            if gesture.is_none() {
                return Err(ModelError::InvalidChecklistEntry { gesture });
            }
            if entries.iter().any(|e| e.gesture == gesture) {
                return Err(ModelError::DuplicateGesture { gesture });
            }
            entries.push(ChecklistEntry {
                gesture,
                captured: false,
            });
        }
        Ok(Self { entries })
    }

    /// The three-step sequence: right palm, left palm, both thumbs back.
    pub fn palm_reading() -> Self {
        Self {
            entries: Gesture::CAPTURABLE[..3]
                .iter()
                .map(|&gesture| ChecklistEntry {
                    gesture,
                    captured: false,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, gesture: Gesture) -> bool {
        self.entries.iter().any(|e| e.gesture == gesture)
    }

    /// Whether `gesture` is required and not yet captured.
    pub fn is_pending(&self, gesture: Gesture) -> bool {
        self.entries
            .iter()
            .any(|e| e.gesture == gesture && !e.captured)
    }

    pub fn is_captured(&self, gesture: Gesture) -> bool {
        self.entries
            .iter()
            .any(|e| e.gesture == gesture && e.captured)
    }

    /// First entry, in checklist order, still waiting for a capture.
    pub fn next_pending(&self) -> Option<Gesture> {
        self.entries
            .iter()
            .find(|e| !e.captured)
            .map(|e| e.gesture)
    }

    /// Mark `gesture` captured.
    ///
    /// Returns `true` only for the pending→captured transition. Gestures that
    /// are already captured or not on the list return `false` and leave the
    /// checklist untouched.
    pub fn mark_captured(&mut self, gesture: Gesture) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.gesture == gesture && !e.captured)
        {
            Some(entry) => {
                entry.captured = true;
                true
            }
            None => false,
        }
    }

    pub fn captured_count(&self) -> usize {
        self.entries.iter().filter(|e| e.captured).count()
    }

    /// All entries captured. An empty checklist is trivially complete.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.captured)
    }

    /// Clear every captured flag (explicit session restart).
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.captured = false;
        }
    }
}

impl Default for CaptureChecklist {
    fn default() -> Self {
        Self::palm_reading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_matches_palm_reading_sequence() {
        let checklist = CaptureChecklist::default();
        let order: Vec<Gesture> = checklist.entries().iter().map(|e| e.gesture).collect();
        assert_eq!(
            order,
            vec![Gesture::RightPalm, Gesture::LeftPalm, Gesture::BothThumbs]
        );
        assert_eq!(checklist.next_pending(), Some(Gesture::RightPalm));
    }

    #[test]
    fn rejects_duplicates_and_none() {
        assert!(matches!(
            CaptureChecklist::new([Gesture::LeftPalm, Gesture::LeftPalm]),
            Err(ModelError::DuplicateGesture { .. })
        ));
        assert!(matches!(
            CaptureChecklist::new([Gesture::None]),
            Err(ModelError::InvalidChecklistEntry { .. })
        ));
    }

    #[test]
    fn capture_transitions_only_once() {
        let mut checklist = CaptureChecklist::new([Gesture::RightPalm, Gesture::LeftPalm]).unwrap();
        assert!(checklist.mark_captured(Gesture::RightPalm));
        assert!(!checklist.mark_captured(Gesture::RightPalm));
        assert!(!checklist.mark_captured(Gesture::RightPalm));
        assert_eq!(checklist.captured_count(), 1);
        assert!(checklist.is_captured(Gesture::RightPalm));
        assert!(!checklist.is_pending(Gesture::RightPalm));
        assert_eq!(checklist.next_pending(), Some(Gesture::LeftPalm));
    }

    #[test]
    fn unknown_gesture_is_ignored() {
        let mut checklist = CaptureChecklist::new([Gesture::RightPalm]).unwrap();
        assert!(!checklist.mark_captured(Gesture::LeftThumb));
        assert_eq!(checklist.captured_count(), 0);
    }

    #[test]
    fn completes_and_resets() {
        let mut checklist = CaptureChecklist::new([Gesture::RightPalm, Gesture::LeftPalm]).unwrap();
        checklist.mark_captured(Gesture::LeftPalm);
        assert!(!checklist.is_complete());
        checklist.mark_captured(Gesture::RightPalm);
        assert!(checklist.is_complete());
        assert_eq!(checklist.next_pending(), None);

        checklist.reset();
        assert_eq!(checklist.captured_count(), 0);
        assert!(checklist.mark_captured(Gesture::RightPalm));
    }

    proptest! {
        #[test]
        fn each_entry_transitions_at_most_once(picks in prop::collection::vec(0usize..5, 0..60)) {
            let mut checklist = CaptureChecklist::palm_reading();
            let mut transitions = std::collections::HashMap::new();
            for pick in picks {
                let gesture = Gesture::CAPTURABLE[pick];
                if checklist.mark_captured(gesture) {
                    *transitions.entry(gesture).or_insert(0) += 1;
                }
            }
            for (gesture, count) in &transitions {
                prop_assert_eq!(*count, 1);
                prop_assert!(checklist.contains(*gesture));
            }
            prop_assert_eq!(checklist.captured_count(), transitions.len());
        }
    }
}
