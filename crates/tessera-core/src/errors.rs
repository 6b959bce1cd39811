//! Error types for the Tessera layout engine.

use crate::types::ViewId;
use thiserror::Error;

/// Top-level error type for the Tessera layout engine.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Errors while building layout expressions.
///
/// These are raised when a leaf is constructed, never at layout time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Invalid argument '{parameter}': {reason} (got {value})")]
    InvalidArgument {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Errors during a layout pass.
///
/// None of these are retried; the pass stops at the first one and views
/// resolved before it keep their new frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Layout cycle detected involving {}: {detail}", join_views(.views))]
    StructuralCycle { views: Vec<ViewId>, detail: String },

    #[error("{view} references {target}, which was never added to the view tree being laid out")]
    UnreachableReference { view: ViewId, target: ViewId },

    #[error("{subview} uses {term} relative to its Auto-sized superview {superview}")]
    AutoSizeCircularity {
        superview: ViewId,
        subview: ViewId,
        term: String,
    },

    #[error("{view} references {target}, which does not exist")]
    NullTarget { view: ViewId, target: ViewId },

    #[error("Unknown view {view}")]
    UnknownView { view: ViewId },

    #[error("Cannot add {child} to {parent}: {reason}")]
    InvalidHierarchy {
        parent: ViewId,
        child: ViewId,
        reason: &'static str,
    },
}

fn join_views(views: &[ViewId]) -> String {
    views
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_views() {
        let err = LayoutError::StructuralCycle {
            views: vec![ViewId(1), ViewId(2)],
            detail: "peers depend on each other".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Layout cycle detected involving #1, #2: peers depend on each other"
        );
    }

    #[test]
    fn test_wraps_into_top_level_error() {
        let err: TesseraError = ExprError::InvalidArgument {
            parameter: "percent",
            value: "101".to_string(),
            reason: "must be between 0 and 100",
        }
        .into();
        assert!(matches!(err, TesseraError::Expr(_)));
        assert_eq!(
            err.to_string(),
            "Invalid argument 'percent': must be between 0 and 100 (got 101)"
        );
    }
}
