use market_core::Period;

use crate::seq::Seq;

/// Period change lifecycle. There is at most one fetch the controller cares
/// about: the most recently issued one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PeriodState {
    Idle,
    Fetching { requested: Period, seq: Seq },
}
