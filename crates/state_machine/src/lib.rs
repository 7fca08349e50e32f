pub mod cause;
pub mod seq;
pub mod state;
pub mod transition;
