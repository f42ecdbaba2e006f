//! Gatekeeper error types

use crate::validator::RejectionReason;
use thiserror::Error;

/// Errors that fail a statement before storage
#[derive(Error, Debug, PartialEq)]
pub enum GatekeeperError {
    /// No page of the document parsed successfully
    #[error("No pages parsed")]
    NoPagesParsed,

    /// The merged statement broke one or more structural rules
    #[error("Statement rejected: {}", join_reasons(.0))]
    Rejected(Vec<RejectionReason>),
}

fn join_reasons(reasons: &[RejectionReason]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
