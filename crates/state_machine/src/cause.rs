use market_core::Period;

use crate::seq::Seq;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PeriodCause {
    // Issue
    FetchIssued { period: Period, seq: Seq },

    // Completion
    FetchResolved { seq: Seq },
    FetchFailed { seq: Seq },
}
