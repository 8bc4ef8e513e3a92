//! Name-resolution state machine
//!
//! One resolver instance belongs to one adapter node and tracks its
//! configured resource identifier. The state machine replaces a trio of
//! booleans (resolving / resolved / suppressed) with a single enum whose
//! transitions are checked, so the invariants hold by construction:
//!
//! - A lookup can only start from `Idle`, which makes starting one the
//!   mutual-exclusion guard against duplicate concurrent lookups.
//! - A cached name is never cleared.
//! - `Resolving` and `Suppressed` cannot coexist.

use thiserror::Error;

/// Where a finished lookup leaves the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupDisposition {
    /// The failure may be transient; allow another attempt later
    Retry,
    /// The name resolved; cache it for the lifetime of the instance
    Cache(String),
    /// The failure is conclusive; never look up again
    Suppress,
}

/// Rejected state transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resolution transition from '{from}' to '{to}'")]
pub struct TransitionRejected {
    pub from: &'static str,
    pub to: &'static str,
}

/// Resolution state of one adapter's resource reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    /// No lookup has concluded; a lookup may be started
    Idle,
    /// A lookup is in flight; starting another is rejected
    Resolving,
    /// The human-readable name is cached; no further lookups
    Resolved(String),
    /// A conclusive failure happened; no further lookups
    Suppressed,
}

impl ResolutionState {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Resolved(_) => "resolved",
            Self::Suppressed => "suppressed",
        }
    }

    /// Start a lookup: `Idle -> Resolving`
    ///
    /// Rejected from every other state, which is exactly the no-op guard
    /// of the resolver: already resolving, already resolved, or
    /// suppressed.
    pub fn begin_lookup(&mut self) -> Result<(), TransitionRejected> {
        match self {
            Self::Idle => {
                *self = Self::Resolving;
                Ok(())
            }
            other => Err(TransitionRejected {
                from: other.label(),
                to: "resolving",
            }),
        }
    }

    /// Finish a lookup: `Resolving -> Idle | Resolved | Suppressed`
    ///
    /// Every lookup outcome maps to a disposition, so `Resolving` is
    /// always exited regardless of which branch the lookup took.
    pub fn finish_lookup(
        &mut self,
        disposition: LookupDisposition,
    ) -> Result<(), TransitionRejected> {
        match self {
            Self::Resolving => {
                *self = match disposition {
                    LookupDisposition::Retry => Self::Idle,
                    LookupDisposition::Cache(name) => Self::Resolved(name),
                    LookupDisposition::Suppress => Self::Suppressed,
                };
                Ok(())
            }
            other => Err(TransitionRejected {
                from: other.label(),
                to: match disposition {
                    LookupDisposition::Retry => "idle",
                    LookupDisposition::Cache(_) => "resolved",
                    LookupDisposition::Suppress => "suppressed",
                },
            }),
        }
    }

    /// The cached name, if resolution succeeded
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name),
            _ => None,
        }
    }

    /// Whether lookups have permanently ceased
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_only_from_idle() {
        let mut state = ResolutionState::Idle;
        assert!(state.begin_lookup().is_ok());
        assert_eq!(state, ResolutionState::Resolving);

        // Second begin while resolving is rejected
        let err = state.begin_lookup().unwrap_err();
        assert_eq!(err.from, "resolving");
    }

    #[test]
    fn test_finish_retry_returns_to_idle() {
        let mut state = ResolutionState::Idle;
        state.begin_lookup().unwrap();
        state.finish_lookup(LookupDisposition::Retry).unwrap();
        assert_eq!(state, ResolutionState::Idle);

        // Retryable failures permit another attempt
        assert!(state.begin_lookup().is_ok());
    }

    #[test]
    fn test_cached_name_is_terminal() {
        let mut state = ResolutionState::Idle;
        state.begin_lookup().unwrap();
        state
            .finish_lookup(LookupDisposition::Cache("Sensor readings".to_string()))
            .unwrap();
        assert_eq!(state.name(), Some("Sensor readings"));

        // No further lookups once resolved
        assert!(state.begin_lookup().is_err());
        assert_eq!(state.name(), Some("Sensor readings"));
    }

    #[test]
    fn test_suppression_is_terminal() {
        let mut state = ResolutionState::Idle;
        state.begin_lookup().unwrap();
        state.finish_lookup(LookupDisposition::Suppress).unwrap();
        assert!(state.is_suppressed());
        assert!(state.begin_lookup().is_err());
    }

    #[test]
    fn test_finish_without_begin_is_rejected() {
        let mut state = ResolutionState::Idle;
        let err = state.finish_lookup(LookupDisposition::Retry).unwrap_err();
        assert_eq!(err.from, "idle");
        assert_eq!(err.to, "idle");
    }
}
