//! Reload Module
//!
//! Long-poll live reload for development.
//!
//! # Protocol
//!
//! ```text
//! Browser --GET /_wait--> (held open)          Editor/script --GET /_notify-->
//!    ^                                                    |
//!    +------------ 200, page reloads <--- ReloadChannel --+
//! ```
//!
//! The bootstrap page issues `/_wait` after starting the module. Anything
//! that knows a rebuild is due (an editor hook, a file watcher script)
//! requests `/_notify`, which releases every pending `/_wait`.
//!
//! # Modules
//!
//! - `channel` - Rendezvous channel handing reload tokens to waiters

mod channel;

pub use channel::{ReloadChannel, WaitOutcome};
