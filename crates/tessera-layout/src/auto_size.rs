//! Auto sizing.
//!
//! A `Dim::auto` derives a view's size from its text, its subviews, or
//! both, clamped between optional min and max expressions. Nothing is
//! remembered between passes: a view that was large last time shrinks back
//! as soon as its content does.

use std::fmt;

use tessera_core::{Axis, LayoutError, ViewId};

use crate::dim::{Dim, DimKind};
use crate::pos::{Pos, PosKind};
use crate::resolve::LayoutContext;
use crate::tree::{View, ViewTree};

/// What an auto-sized view measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutoStyle {
    /// The view's text
    Text,
    /// The view's content size, or the extent of its subviews
    Content,
    /// The larger of text and content
    #[default]
    Auto,
}

impl AutoStyle {
    pub fn includes_text(self) -> bool {
        matches!(self, AutoStyle::Text | AutoStyle::Auto)
    }

    pub fn includes_content(self) -> bool {
        matches!(self, AutoStyle::Content | AutoStyle::Auto)
    }
}

impl fmt::Display for AutoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoStyle::Text => f.write_str("Text"),
            AutoStyle::Content => f.write_str("Content"),
            AutoStyle::Auto => f.write_str("Auto"),
        }
    }
}

/// Settings of a `Dim::auto` leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct DimAuto {
    pub style: AutoStyle,
    /// Lower bound, evaluated against the superview dimension
    pub min: Option<Box<Dim>>,
    /// Upper bound, evaluated against the superview dimension
    pub max: Option<Box<Dim>>,
}

impl DimAuto {
    pub fn new(style: AutoStyle, min: Option<Dim>, max: Option<Dim>) -> Self {
        Self {
            style,
            min: min.map(Box::new),
            max: max.map(Box::new),
        }
    }
}

/// Size of an auto-sized view on the context axis.
pub fn calculate(auto: &DimAuto, superview_dim: i32, cx: &LayoutContext<'_>) -> i32 {
    let min = auto
        .min
        .as_ref()
        .map_or(0, |min| min.calculate(0, superview_dim, cx));
    let max = auto
        .max
        .as_ref()
        .map(|max| max.calculate(0, superview_dim, cx));

    let mut natural = 0;
    if auto.style.includes_text() {
        natural = natural.max(text_extent(cx, max.unwrap_or(superview_dim)));
    }
    if auto.style.includes_content() {
        natural = natural.max(content_extent(cx));
    }

    natural.min(max.unwrap_or(i32::MAX)).max(min)
}

/// Measured text extent. Width wraps at `wrap_limit`, height at the view's
/// own resolved width.
fn text_extent(cx: &LayoutContext<'_>, wrap_limit: i32) -> i32 {
    let Some(view) = cx.tree().get(cx.view()) else {
        return 0;
    };
    if view.text.is_empty() {
        return 0;
    }
    match cx.axis() {
        Axis::Width => cx.measure().measure(&view.text, Some(wrap_limit)).width,
        Axis::Height => cx.measure().measure(&view.text, Some(cx.own_width())).height,
    }
}

/// Explicit content size, or the far edge of every settled subview.
fn content_extent(cx: &LayoutContext<'_>) -> i32 {
    let tree = cx.tree();
    let axis = cx.axis();
    if let Some(size) = tree.get(cx.view()).and_then(View::explicit_content_size) {
        return size.get(axis);
    }
    tree.subviews(cx.view())
        .iter()
        .filter(|&&subview| cx.is_settled(subview))
        .map(|&subview| tree.frame(subview).end(axis))
        .fold(0, i32::max)
}

/// Whether the layout of `parent`'s subviews feeds its own size on `axis`.
pub(crate) fn sizes_from_subviews(view: &View, axis: Axis) -> bool {
    view.explicit_content_size().is_none()
        && view
            .dim(axis)
            .as_auto()
            .is_some_and(|auto| auto.style.includes_content())
}

/// Reject direct subviews of an auto-sized `parent` whose same-axis
/// expressions resolve against the parent's own size.
pub fn validate_subviews(tree: &ViewTree, parent: ViewId, axis: Axis) -> Result<(), LayoutError> {
    for &subview in tree.subviews(parent) {
        let Some(view) = tree.get(subview) else {
            continue;
        };
        let term = forbidden_pos_term(view.pos(axis), parent)
            .or_else(|| forbidden_dim_term(view.dim(axis), parent));
        if let Some(term) = term {
            return Err(LayoutError::AutoSizeCircularity {
                superview: parent,
                subview,
                term,
            });
        }
    }
    Ok(())
}

fn forbidden_pos_term(pos: &Pos, parent: ViewId) -> Option<String> {
    match pos.kind() {
        PosKind::Percent(_) | PosKind::Center | PosKind::Align { .. } => Some(pos.to_string()),
        PosKind::View { target, .. } if *target == parent => Some(pos.to_string()),
        PosKind::Combine { left, right, .. } => {
            forbidden_pos_term(left, parent).or_else(|| forbidden_pos_term(right, parent))
        }
        _ => None,
    }
}

fn forbidden_dim_term(dim: &Dim, parent: ViewId) -> Option<String> {
    match dim.kind() {
        DimKind::Percent { .. } | DimKind::Fill(_) => Some(dim.to_string()),
        DimKind::View { target, .. } if *target == parent => Some(dim.to_string()),
        DimKind::Auto(auto) => auto
            .min
            .iter()
            .chain(auto.max.iter())
            .find_map(|bound| forbidden_dim_term(bound, parent)),
        DimKind::Combine { left, right, .. } => {
            forbidden_dim_term(left, parent).or_else(|| forbidden_dim_term(right, parent))
        }
        _ => None,
    }
}

/// Whether `view` can be resolved before its superview `parent` is sized:
/// none of its expressions reads the superview's size or frame.
pub(crate) fn independent_of_superview(view: &View, parent: ViewId) -> bool {
    Axis::ALL.into_iter().all(|axis| {
        pos_independent(view.pos(axis), parent) && dim_independent(view.dim(axis), parent)
    })
}

fn pos_independent(pos: &Pos, parent: ViewId) -> bool {
    match pos.kind() {
        PosKind::Absolute(_) | PosKind::Func(_) => true,
        PosKind::Percent(_) | PosKind::Center | PosKind::AnchorEnd { .. } | PosKind::Align { .. } => {
            false
        }
        PosKind::View { target, .. } => *target != parent,
        PosKind::Combine { left, right, .. } => {
            pos_independent(left, parent) && pos_independent(right, parent)
        }
    }
}

fn dim_independent(dim: &Dim, parent: ViewId) -> bool {
    match dim.kind() {
        DimKind::Absolute(_) | DimKind::Func(_) => true,
        DimKind::Percent { .. } | DimKind::Fill(_) => false,
        DimKind::Auto(auto) => auto
            .min
            .iter()
            .chain(auto.max.iter())
            .all(|bound| dim_independent(bound, parent)),
        DimKind::View { target, .. } => *target != parent,
        DimKind::Combine { left, right, .. } => {
            dim_independent(left, parent) && dim_independent(right, parent)
        }
    }
}
