use thiserror::Error;

use crate::cause::PeriodCause;
use crate::seq::Seq;
use crate::state::PeriodState;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Completion for a request that is no longer the latest one.
    #[error("stale completion {got} (latest issued: {expected:?})")]
    Stale { expected: Option<Seq>, got: Seq },

    #[error("request {seq} issued after newer request {after}")]
    NonMonotonic { after: Seq, seq: Seq },
}

pub fn transition(state: PeriodState, cause: PeriodCause) -> Result<PeriodState, TransitionError> {
    let next = match (state, cause) {
        // --- Issue ----------------------------------------------------------
        (PeriodState::Idle, PeriodCause::FetchIssued { period, seq }) => PeriodState::Fetching {
            requested: period,
            seq,
        },
        // новый запрос вытесняет предыдущий, старый ответ станет stale
        (PeriodState::Fetching { seq: current, .. }, PeriodCause::FetchIssued { period, seq })
            if seq > current =>
        {
            PeriodState::Fetching {
                requested: period,
                seq,
            }
        }
        (PeriodState::Fetching { seq: current, .. }, PeriodCause::FetchIssued { seq, .. }) => {
            return Err(TransitionError::NonMonotonic { after: current, seq });
        }

        // --- Completion -----------------------------------------------------
        (
            PeriodState::Fetching { seq: current, .. },
            PeriodCause::FetchResolved { seq } | PeriodCause::FetchFailed { seq },
        ) if seq == current => PeriodState::Idle,
        (
            PeriodState::Fetching { seq: current, .. },
            PeriodCause::FetchResolved { seq } | PeriodCause::FetchFailed { seq },
        ) => {
            return Err(TransitionError::Stale {
                expected: Some(current),
                got: seq,
            });
        }
        (PeriodState::Idle, PeriodCause::FetchResolved { seq } | PeriodCause::FetchFailed { seq }) => {
            return Err(TransitionError::Stale {
                expected: None,
                got: seq,
            });
        }
    };

    Ok(next)
}
