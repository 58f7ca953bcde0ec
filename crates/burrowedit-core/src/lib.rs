//! burrowedit core library
//!
//! Everything behind the `burrowedit` binary: editing burrowd
//! configuration without ever leaving it broken or silently changed.
//! The design centers on an edit-validate-recover loop backed by a
//! git-versioned checkpoint store:
//!
//! - [`validator`]: wraps the daemon's parse-and-dump mode; the daemon
//!   owns the config grammar, this crate never parses it
//! - [`fingerprint`]: digests the security-sensitive dump lines so the
//!   session can warn when an edit drifts them
//! - [`store`]: append-only checkpoint history over the external `git`
//!   binary, the sole mechanism behind `undo`
//! - [`session`]: the interactive state machine driving edit, validate,
//!   drift warnings and the recovery menu
//! - [`restart`]: detached, delayed, best-effort daemon restart
//! - [`settings`] / [`target`] / [`pager`] / [`error`]: environment
//!   knobs, target resolution, advisory display, error taxonomy

pub mod error;
pub mod fingerprint;
pub mod pager;
pub mod restart;
pub mod session;
pub mod settings;
pub mod store;
pub mod target;
pub mod validator;

pub use error::{EditError, EditResult};
pub use session::{EditSession, MenuChoice, SessionOutcome};
pub use settings::Settings;
pub use target::ConfigTarget;
