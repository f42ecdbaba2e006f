//! Ledgerly Gatekeeper
//!
//! Quality control between per-page parsing and storage:
//! - Page merging with a single statement envelope
//! - Natural-key deduplication across pages
//! - Structural validation of the merged statement
//!
//! # Examples
//!
//! ```
//! use ledgerly_gatekeeper::{merge_pages, GatekeeperError};
//!
//! // Nothing parsed means nothing to merge
//! assert!(matches!(merge_pages(Vec::new()), Err(GatekeeperError::NoPagesParsed)));
//! ```

#![warn(missing_docs)]

mod error;
mod merge;
mod validator;

pub use error::GatekeeperError;
pub use merge::{merge_pages, MergedStatement};
pub use validator::{validate, RejectionReason};
