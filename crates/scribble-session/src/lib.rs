//! Connection session registry for Scribble.
//!
//! A session is the server's record of one live connection: which
//! participant handle it was given and which room, if any, it currently
//! belongs to. The Connection Lifecycle Handler uses it to find the room a
//! dropped connection has to be removed from.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)     <- removes the participant the session points at
//!     ↕
//! Session Layer (this)   <- participant handle -> room binding
//!     ↕
//! Protocol Layer (below) <- ParticipantId, RoomCode
//! ```
//!
//! There is no authentication and no reconnection: a session lives exactly
//! as long as its connection.

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::Session;
