//! # rowguard-enforce
//!
//! Request-time enforcement of compiled policies: the capability gate,
//! the row/field filter, and the two-stage pipeline that orders them.
//!
//! The pipeline is explicit about the two layers and their precedence:
//! the gate decides allow/deny from the caller's identity and role alone
//! ("deny fast", no row data, no storage access), and only on allow does
//! the row/field filter apply the compiled predicates and column masks.
//! The storage layer is never consulted for a denied request.
//!
//! Everything here is synchronous, side-effect-free, and evaluates against
//! an immutable policy snapshot, so concurrent requests need no locking.

pub mod error;
pub mod eval;
pub mod filter;
pub mod gate;
pub mod pipeline;
pub mod record;
pub mod session;

pub use error::{DenyCause, DenyMasking, EnforceError};
pub use filter::WriteOutcome;
pub use gate::{authorize, Decision};
pub use pipeline::Pipeline;
pub use record::{Record, WritePayload};
pub use session::{Session, StaticSession};
