//! Record retrieval state machine
//!
//! ```text
//!  Unrequested ──request──► Pending ──response accepted──► Available
//!       ▲                      │
//!       │                 timeout passed
//!       │                      ▼
//!       └──timeout settled── TimedOut
//! ```
//!
//! This module is pure: [`decide`] maps a state and an observation to the remote action to
//! take, and [`transition`] applies the result of that action. Remote calls live in
//! [`crate::retrieval`].
//!
//! A request can also leave the market chain without this handle's help: another party
//! answers or times it out. Both Pending and TimedOut observe before acting, so such a
//! request resolves to Available or Unrequested instead of being settled again.

use crate::{Error, Result};
use region_core::{Hash, RecordStatus, RegionRecord, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Retrieval state of one region's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalState {
    /// No request in flight
    Unrequested,
    /// Request submitted, waiting for the record or the timeout
    Pending {
        /// Request commitment
        commitment: Hash,
    },
    /// Timeout passed, settlement not yet accepted
    TimedOut {
        /// Request commitment
        commitment: Hash,
    },
    /// Record delivered
    Available {
        /// The delivered record
        record: RegionRecord,
    },
}

impl RetrievalState {
    /// Status as reported to region metadata
    pub fn status(&self) -> RecordStatus {
        match self {
            RetrievalState::Unrequested => RecordStatus::Unavailable,
            RetrievalState::Pending { .. } | RetrievalState::TimedOut { .. } => {
                RecordStatus::Pending
            }
            RetrievalState::Available { .. } => RecordStatus::Available,
        }
    }

    /// Commitment of the in-flight request
    pub fn commitment(&self) -> Option<Hash> {
        match self {
            RetrievalState::Pending { commitment } | RetrievalState::TimedOut { commitment } => {
                Some(*commitment)
            }
            RetrievalState::Unrequested | RetrievalState::Available { .. } => None,
        }
    }

    /// Short name, used in logs and metric labels
    pub fn name(&self) -> &'static str {
        match self {
            RetrievalState::Unrequested => "unrequested",
            RetrievalState::Pending { .. } => "pending",
            RetrievalState::TimedOut { .. } => "timed_out",
            RetrievalState::Available { .. } => "available",
        }
    }
}

impl fmt::Display for RetrievalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a poll saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The record is readable at its source
    Found(RegionRecord),
    /// The record is not readable yet
    NotFound {
        /// Current market-chain timestamp
        now: Timestamp,
        /// Request timeout
        timeout: Timestamp,
    },
    /// The market chain no longer holds the request
    Resolved {
        /// Record delivered in answer, if it was answered
        answer: Option<RegionRecord>,
    },
}

/// Remote action to take next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit a response carrying this record
    Respond(RegionRecord),
    /// Submit a timeout settlement
    SettleTimeout,
    /// Nothing to do until the next poll
    Wait,
    /// The request was answered elsewhere; take over this record
    Adopt(RegionRecord),
    /// The request was settled elsewhere; drop it
    Forget,
}

/// Result of a successful remote action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A record request was accepted with this commitment
    Requested(Hash),
    /// The response was accepted
    ResponseAccepted(RegionRecord),
    /// The timeout passed without a record
    TimeoutDetected,
    /// The timeout settlement was accepted
    TimeoutSettled,
    /// The chain no longer knows the commitment
    RequestVanished,
}

/// Action to take in `state` given `observation`.
///
/// A found record is answered regardless of the timeout. A missing record is timed out only
/// once `now` is strictly past the timeout. Once timed out, settlement is retried for as
/// long as the request is still outstanding.
pub fn decide(state: &RetrievalState, observation: &Observation) -> Action {
    match (state, observation) {
        (
            RetrievalState::Pending { .. } | RetrievalState::TimedOut { .. },
            Observation::Resolved { answer },
        ) => match answer {
            Some(record) => Action::Adopt(record.clone()),
            None => Action::Forget,
        },
        (RetrievalState::Pending { .. }, Observation::Found(record)) => {
            Action::Respond(record.clone())
        }
        (RetrievalState::Pending { .. }, Observation::NotFound { now, timeout }) => {
            if now > timeout {
                Action::SettleTimeout
            } else {
                Action::Wait
            }
        }
        (RetrievalState::TimedOut { .. }, _) => Action::SettleTimeout,
        (RetrievalState::Unrequested | RetrievalState::Available { .. }, _) => Action::Wait,
    }
}

/// Apply `transition` to `state`
pub fn transition(state: &RetrievalState, transition: Transition) -> Result<RetrievalState> {
    use RetrievalState::*;

    let next = match (state, transition) {
        (Unrequested, Transition::Requested(commitment)) => Pending { commitment },
        (Pending { .. } | TimedOut { .. }, Transition::ResponseAccepted(record)) => {
            Available { record }
        }
        (Pending { commitment }, Transition::TimeoutDetected) => TimedOut {
            commitment: *commitment,
        },
        (TimedOut { .. }, Transition::TimeoutSettled) => Unrequested,
        (Pending { .. } | TimedOut { .. }, Transition::RequestVanished) => Unrequested,
        (state, transition) => {
            return Err(Error::InvalidState(format!(
                "cannot apply {:?} in state {}",
                transition, state
            )))
        }
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use region_core::AccountId;

    fn record() -> RegionRecord {
        RegionRecord {
            end: 200,
            owner: AccountId::new([1u8; 32]),
            paid: Some(1_000),
        }
    }

    fn pending() -> RetrievalState {
        RetrievalState::Pending {
            commitment: Hash::digest(b"request"),
        }
    }

    #[test]
    fn test_not_found_before_timeout_waits() {
        let obs = Observation::NotFound {
            now: 999,
            timeout: 1_000,
        };
        assert_eq!(decide(&pending(), &obs), Action::Wait);

        // Exactly at the timeout is not past it
        let obs = Observation::NotFound {
            now: 1_000,
            timeout: 1_000,
        };
        assert_eq!(decide(&pending(), &obs), Action::Wait);
    }

    #[test]
    fn test_not_found_after_timeout_settles() {
        let obs = Observation::NotFound {
            now: 1_001,
            timeout: 1_000,
        };
        assert_eq!(decide(&pending(), &obs), Action::SettleTimeout);
    }

    #[test]
    fn test_found_responds_even_after_timeout() {
        let obs = Observation::Found(record());
        assert_eq!(decide(&pending(), &obs), Action::Respond(record()));
    }

    #[test]
    fn test_timed_out_retries_settlement() {
        let state = RetrievalState::TimedOut {
            commitment: Hash::digest(b"request"),
        };
        assert_eq!(decide(&state, &Observation::Found(record())), Action::SettleTimeout);
    }

    #[test]
    fn test_resolved_elsewhere() {
        let timed_out = RetrievalState::TimedOut {
            commitment: Hash::digest(b"request"),
        };
        let answered = Observation::Resolved {
            answer: Some(record()),
        };
        let settled = Observation::Resolved { answer: None };

        for state in [pending(), timed_out] {
            assert_eq!(decide(&state, &answered), Action::Adopt(record()));
            assert_eq!(decide(&state, &settled), Action::Forget);
        }
    }

    #[test]
    fn test_answer_accepted_after_timeout_detected() {
        let timed_out = transition(&pending(), Transition::TimeoutDetected).unwrap();
        let s = transition(&timed_out, Transition::ResponseAccepted(record())).unwrap();
        assert_eq!(s.status(), RecordStatus::Available);
    }

    #[test]
    fn test_full_timeout_cycle() {
        let commitment = Hash::digest(b"request");
        let s = transition(&RetrievalState::Unrequested, Transition::Requested(commitment)).unwrap();
        assert_eq!(s.status(), RecordStatus::Pending);
        assert_eq!(s.commitment(), Some(commitment));

        let s = transition(&s, Transition::TimeoutDetected).unwrap();
        assert_eq!(s.status(), RecordStatus::Pending);

        let s = transition(&s, Transition::TimeoutSettled).unwrap();
        assert_eq!(s, RetrievalState::Unrequested);
        assert_eq!(s.status(), RecordStatus::Unavailable);
    }

    #[test]
    fn test_response_makes_available() {
        let s = transition(&pending(), Transition::ResponseAccepted(record())).unwrap();
        assert_eq!(s.status(), RecordStatus::Available);
        assert_eq!(s.commitment(), None);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        assert!(transition(&RetrievalState::Unrequested, Transition::TimeoutSettled).is_err());
        assert!(transition(&pending(), Transition::Requested(Hash::digest(b"x"))).is_err());
        let available = RetrievalState::Available { record: record() };
        assert!(transition(&available, Transition::RequestVanished).is_err());
    }
}
