pub mod grid;
pub mod session;

pub use grid::{classify_symbol, Grid, GridError, Placement, WinLine};
pub use session::{Session, SessionError, SessionPhase};
