//! Reference extraction.
//!
//! Collects the views an expression reads through `View` terms and decides
//! how the scheduler treats each of them. `Func` leaves are opaque and
//! contribute nothing.

use indexmap::IndexSet;
use smallvec::SmallVec;
use tessera_core::{LayoutError, ViewId};

use crate::dim::{Dim, DimKind};
use crate::pos::{Pos, PosKind};
use crate::tree::{View, ViewTree};

/// Referenced views, in first-seen order.
pub type References = SmallVec<[ViewId; 4]>;

/// How a reference from a view to a target relates the two in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// The view reads its own frame
    SelfRef,
    /// The target is a strict ancestor and resolves first anyway
    Ancestor,
    /// The target is a strict descendant, which can never resolve first
    Descendant,
    /// Neither ancestor nor descendant; needs an ordering edge
    Peer,
    /// The target exists but is not in the tree being laid out
    Unreachable,
    /// The target no longer exists
    Dangling,
}

/// Push every view `pos` reads onto `out`.
pub fn pos_references(pos: &Pos, out: &mut References) {
    match pos.kind() {
        PosKind::View { target, .. } => push_unique(out, *target),
        PosKind::Combine { left, right, .. } => {
            pos_references(left, out);
            pos_references(right, out);
        }
        PosKind::Absolute(_)
        | PosKind::Percent(_)
        | PosKind::Center
        | PosKind::AnchorEnd { .. }
        | PosKind::Align { .. }
        | PosKind::Func(_) => {}
    }
}

/// Push every view `dim` reads onto `out`, including auto bounds.
pub fn dim_references(dim: &Dim, out: &mut References) {
    match dim.kind() {
        DimKind::View { target, .. } => push_unique(out, *target),
        DimKind::Auto(auto) => {
            for bound in auto.min.iter().chain(auto.max.iter()) {
                dim_references(bound, out);
            }
        }
        DimKind::Combine { left, right, .. } => {
            dim_references(left, out);
            dim_references(right, out);
        }
        DimKind::Absolute(_) | DimKind::Percent { .. } | DimKind::Fill(_) | DimKind::Func(_) => {}
    }
}

/// Every view read by any of `view`'s four slots.
pub fn view_references(view: &View) -> References {
    let mut out = References::new();
    pos_references(view.x(), &mut out);
    pos_references(view.y(), &mut out);
    dim_references(view.width(), &mut out);
    dim_references(view.height(), &mut out);
    out
}

fn push_unique(out: &mut References, target: ViewId) {
    if !out.contains(&target) {
        out.push(target);
    }
}

/// Classify a reference from `view` to `target`.
///
/// `reachable` is the set of views in the tree being laid out.
pub fn classify(
    tree: &ViewTree,
    reachable: &IndexSet<ViewId>,
    view: ViewId,
    target: ViewId,
) -> ReferenceKind {
    if target == view {
        ReferenceKind::SelfRef
    } else if !tree.contains(target) {
        ReferenceKind::Dangling
    } else if !reachable.contains(&target) {
        ReferenceKind::Unreachable
    } else if tree.is_ancestor(target, view) {
        ReferenceKind::Ancestor
    } else if tree.is_ancestor(view, target) {
        ReferenceKind::Descendant
    } else {
        ReferenceKind::Peer
    }
}

/// Classify a reference and turn the illegal kinds into errors.
pub fn check(
    tree: &ViewTree,
    reachable: &IndexSet<ViewId>,
    view: ViewId,
    target: ViewId,
) -> Result<ReferenceKind, LayoutError> {
    match classify(tree, reachable, view, target) {
        ReferenceKind::Dangling => Err(LayoutError::NullTarget { view, target }),
        ReferenceKind::Unreachable => Err(LayoutError::UnreachableReference { view, target }),
        ReferenceKind::Descendant => Err(LayoutError::StructuralCycle {
            views: vec![view, target],
            detail: format!(
                "{} reads the frame of its descendant {}",
                tree.describe(view),
                tree.describe(target)
            ),
        }),
        kind => Ok(kind),
    }
}
