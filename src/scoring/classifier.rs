//! Score-to-tier classification

use crate::config::TierBoundaries;
use crate::error::EngineError;
use crate::types::Tier;

/// Maps a risk score to an action tier via contiguous, boundary-inclusive
/// lower bounds. Total over the full 0-100 score domain.
pub struct Classifier {
    boundaries: TierBoundaries,
}

impl Classifier {
    /// Build a classifier, rejecting overlapping or gapped boundaries with
    /// a configuration error. This is the only place boundaries are
    /// checked; classification itself cannot fail.
    pub fn new(boundaries: TierBoundaries) -> Result<Self, EngineError> {
        boundaries.validate()?;
        Ok(Self { boundaries })
    }

    pub fn classify(&self, score: u8) -> Tier {
        if score >= self.boundaries.blocked {
            Tier::Blocked
        } else if score >= self.boundaries.flagged {
            Tier::Flagged
        } else if score >= self.boundaries.suspicious {
            Tier::Suspicious
        } else {
            Tier::Approved
        }
    }

    pub fn boundaries(&self) -> &TierBoundaries {
        &self.boundaries
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            boundaries: TierBoundaries::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tier_ranges() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(0), Tier::Approved);
        assert_eq!(classifier.classify(29), Tier::Approved);
        assert_eq!(classifier.classify(30), Tier::Suspicious);
        assert_eq!(classifier.classify(64), Tier::Suspicious);
        assert_eq!(classifier.classify(65), Tier::Flagged);
        assert_eq!(classifier.classify(69), Tier::Flagged);
        assert_eq!(classifier.classify(70), Tier::Blocked);
        assert_eq!(classifier.classify(100), Tier::Blocked);
    }

    #[test]
    fn test_totality_and_contiguity() {
        let classifier = Classifier::default();
        let mut previous = classifier.classify(0);
        for score in 1..=100u8 {
            let tier = classifier.classify(score);
            // Tiers never decrease as the score increases.
            assert!(tier >= previous, "tier regressed at score {}", score);
            previous = tier;
        }
    }

    #[test]
    fn test_custom_boundaries() {
        let classifier = Classifier::new(TierBoundaries {
            suspicious: 20,
            flagged: 50,
            blocked: 80,
        })
        .unwrap();
        assert_eq!(classifier.classify(19), Tier::Approved);
        assert_eq!(classifier.classify(20), Tier::Suspicious);
        assert_eq!(classifier.classify(79), Tier::Flagged);
        assert_eq!(classifier.classify(80), Tier::Blocked);
    }

    #[test]
    fn test_invalid_boundaries_rejected() {
        let result = Classifier::new(TierBoundaries {
            suspicious: 65,
            flagged: 30,
            blocked: 70,
        });
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }
}
