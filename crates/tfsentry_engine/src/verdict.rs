//! The validation verdict.

use serde::{Deserialize, Serialize};

/// Outcome of one validation call: the AND over every rule/event pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// True when every evaluated pair permitted the event.
    pub valid: bool,
    /// Rule documents that took part.
    pub rules: usize,
    /// Events that took part.
    pub events: usize,
    /// Pairs evaluated (`rules * events`).
    pub evaluations: usize,
}

impl Verdict {
    pub(crate) fn vacuous(rules: usize, events: usize) -> Self {
        Self {
            valid: true,
            rules,
            events,
            evaluations: 0,
        }
    }

    /// True when nothing was evaluated: an empty rule set or an empty
    /// event stream. Valid, but distinct from a real pass.
    pub fn is_vacuous(&self) -> bool {
        self.evaluations == 0
    }

    /// Human-readable one-liner for the caller.
    pub fn summary(&self) -> String {
        if self.is_vacuous() {
            format!(
                "vacuously valid: nothing to evaluate ({} rules, {} events)",
                self.rules, self.events
            )
        } else if self.valid {
            format!(
                "valid: {} events permitted under {} rules ({} evaluations)",
                self.events, self.rules, self.evaluations
            )
        } else {
            format!(
                "invalid: at least one of {} events denied under {} rules",
                self.events, self.rules
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vacuous_verdict_is_valid_but_distinct() {
        let verdict = Verdict::vacuous(0, 3);
        assert!(verdict.valid);
        assert!(verdict.is_vacuous());
        assert!(verdict.summary().contains("vacuously"));
    }

    #[test]
    fn test_real_pass_summary() {
        let verdict = Verdict {
            valid: true,
            rules: 2,
            events: 3,
            evaluations: 6,
        };
        assert!(!verdict.is_vacuous());
        assert!(verdict.summary().starts_with("valid"));
    }
}
