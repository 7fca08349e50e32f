use std::fmt;

/// Monotonic tag attached to every asynchronous request on a channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seq(pub u64);

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues sequence numbers for one channel, starting at #1.
#[derive(Debug, Default, Clone)]
pub struct SeqCounter {
    last: u64,
}

impl SeqCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> Seq {
        self.last += 1;
        Seq(self.last)
    }
}

/// Remembers the highest sequence let through so far; anything not newer is
/// refused.
#[derive(Debug, Default, Copy, Clone)]
pub struct LatestGate {
    accepted: Option<Seq>,
}

impl LatestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, seq: Seq) -> bool {
        match self.accepted {
            Some(prev) if seq <= prev => false,
            _ => {
                self.accepted = Some(seq);
                true
            }
        }
    }
}
