//! MemberPress event classification
//!
//! ```text
//! payload ──▶ classify ──▶ EventKind (name, type, related entities)
//!                 │
//!                 ▼
//!          MemberpressEvent ──validate once──▶ is_valid / ValidationError
//!                 │
//!                 ▼
//!     member() membership() subscription() transaction()   (lazy, memoized)
//! ```

/// The generic event and its validation
pub mod event;
/// Payload classification entry points
pub mod factory;
/// The event taxonomy
pub mod kind;

pub use event::{EventLogEntry, MemberpressEvent, ValidationError, ENVELOPE_KEYS};
pub use factory::{classify, classify_slice};
pub use kind::{EventKind, UNIDENTIFIED_EVENT};
