//! Built-in audited call sites.
//!
//! These emitters own no policy of their own: they raise the event,
//! honor a veto by aborting the operation, and re-raise whatever failure
//! the dispatcher surfaced, verbatim, to their own caller.

mod attrs;
mod decode;

pub use attrs::AttrTable;
pub use decode::{Constructor, DecodeError, GlobalResolver, PayloadDecoder};
