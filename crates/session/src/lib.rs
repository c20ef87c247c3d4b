//! `tms-session`: who is signed in.
//!
//! [`SessionStore`] is the single writer of session state: only `bootstrap`, `login`
//! and `logout` change it. Everything else reads.

pub mod outcome;
pub mod state;
pub mod store;

pub use outcome::{LoginOutcome, RegisterOutcome};
pub use state::{AuthState, Session};
pub use store::SessionStore;
