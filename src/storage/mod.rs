//!  Storage is organized through [session_storage::JsonSessionStorage].
//!  The basic idea is:
//!   - There is a directory acting as a tiny key-value store.
//!   - `sessions.json` holds every completed session, `current_session.json` exists only while
//!     the user is tapped in.
//!   - Every write replaces a whole file, there are no partial updates.

pub mod entities;
pub mod export;
pub mod session_storage;
