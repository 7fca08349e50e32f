//! One chart session: live polling, period switching and the chart binding,
//! all driven from a single task.

pub mod chart;
pub mod error;
pub mod event;
pub mod feed;
pub mod period;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod sink;

#[cfg(test)]
mod testkit;

pub use chart::{ChartBinding, ChartConfig, ChartHost, DisplayMode, OptionsPatch, RenderSurface};
pub use error::SessionError;
pub use event::{Channel, FeedKind, SessionEvent};
pub use feed::MarketFeed;
pub use runtime::{Command, Session, SessionHandle};
pub use scheduler::{Cadence, DEFAULT_POLL_FLOOR};
pub use session::{SessionConfig, SessionCore, SessionStatus, Snapshot};
