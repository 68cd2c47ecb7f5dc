//! The turn orchestrator: sequencing, staleness protection, and derived
//! status text.
//!
//! [`session`] holds the synchronous state machine, [`guard`] the request
//! tagging that keeps late arrivals from landing on superseded boards,
//! [`runtime`] the async shell that owns everything, and [`status`] the
//! text derivation the UI displays.

pub mod guard;
pub mod runtime;
pub mod session;
pub mod status;

pub use guard::{Ticket, TicketCounter};
pub use runtime::{Command, Orchestrator, SessionView};
pub use session::{Fault, GameSession, Phase, ScoreTally, Step};
pub use status::{Difficulty, Forecast};
