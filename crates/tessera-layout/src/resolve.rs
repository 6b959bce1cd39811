//! Per-view resolution.
//!
//! Turns a view's four expression slots into a concrete frame, given the
//! superview's content size. Sizes are computed before positions on both
//! axes, and a size is floored at zero only after its whole expression has
//! been evaluated.

use std::collections::HashSet;

use tessera_core::{Axis, LayoutError, Rect, Size, ViewId};
use tracing::trace;

use crate::references;
use crate::text::{CellMeasure, TextMeasure};
use crate::tree::{View, ViewTree};

/// Everything an expression may read while it is evaluated.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    tree: &'a ViewTree,
    view: ViewId,
    axis: Axis,
    measure: &'a dyn TextMeasure,
    /// Views resolved so far in the current pass; `None` outside a pass
    settled: Option<&'a HashSet<ViewId>>,
    own_width: Option<i32>,
}

impl<'a> LayoutContext<'a> {
    /// Context for evaluating `view`'s expressions on `axis` outside a pass.
    pub fn new(tree: &'a ViewTree, view: ViewId, axis: Axis) -> Self {
        Self {
            tree,
            view,
            axis,
            measure: &CellMeasure,
            settled: None,
            own_width: None,
        }
    }

    pub fn with_measure(mut self, measure: &'a dyn TextMeasure) -> Self {
        self.measure = measure;
        self
    }

    /// Restrict content sizing to subviews already resolved in this pass.
    pub fn with_settled(mut self, settled: &'a HashSet<ViewId>) -> Self {
        self.settled = Some(settled);
        self
    }

    /// The same context on another axis.
    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Record the width just resolved for the view, used to wrap text.
    pub fn with_own_width(mut self, width: i32) -> Self {
        self.own_width = Some(width);
        self
    }

    pub fn tree(&self) -> &'a ViewTree {
        self.tree
    }

    /// The view whose expression is being evaluated.
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn measure(&self) -> &'a dyn TextMeasure {
        self.measure
    }

    /// Whether `id` may be read as resolved.
    pub fn is_settled(&self, id: ViewId) -> bool {
        self.settled.map_or(true, |settled| settled.contains(&id))
    }

    /// The view's width for this evaluation: freshly resolved if known,
    /// otherwise its current frame width.
    pub fn own_width(&self) -> i32 {
        self.own_width
            .unwrap_or_else(|| self.tree.frame(self.view).width())
    }
}

/// Resolve `id` against its superview's content size and write its frame.
///
/// Every subview is treated as resolved for content sizing. Referenced
/// views are read as currently laid out.
pub fn resolve(tree: &mut ViewTree, id: ViewId, superview_size: Size) -> Result<Rect, LayoutError> {
    let cx = LayoutContext::new(tree, id, Axis::Width);
    let frame = compute_frame(&cx, superview_size)?;
    commit(tree, id, frame)
}

/// Compute the frame `cx.view()` would get, without writing it.
pub fn compute_frame(cx: &LayoutContext<'_>, superview_size: Size) -> Result<Rect, LayoutError> {
    let tree = cx.tree();
    let id = cx.view();
    let view = tree.view(id)?;

    if let Some(frame) = absolute_frame(view) {
        return Ok(frame);
    }
    if let Some(target) = references::view_references(view)
        .into_iter()
        .find(|target| !tree.contains(*target))
    {
        return Err(LayoutError::NullTarget { view: id, target });
    }

    let width_cx = cx.on_axis(Axis::Width);
    let x_hint = location_hint(view, superview_size, &width_cx);
    let width = view
        .width()
        .calculate(x_hint.unwrap_or(0), superview_size.width, &width_cx)
        .max(0);

    let height_cx = cx.on_axis(Axis::Height).with_own_width(width);
    let y_hint = location_hint(view, superview_size, &height_cx);
    let height = view
        .height()
        .calculate(y_hint.unwrap_or(0), superview_size.height, &height_cx)
        .max(0);

    let x = x_hint.unwrap_or_else(|| view.x().calculate(superview_size.width, width, &width_cx));
    let y = y_hint.unwrap_or_else(|| view.y().calculate(superview_size.height, height, &height_cx));

    Ok(Rect::new(x, y, width, height))
}

/// The view's position on the context axis, if it can be computed before
/// its size.
fn location_hint(view: &View, superview_size: Size, cx: &LayoutContext<'_>) -> Option<i32> {
    let pos = view.pos(cx.axis());
    if pos.depends_on_own_dim() {
        return None;
    }
    Some(pos.calculate(superview_size.get(cx.axis()), 0, cx))
}

/// The frame of a view whose four slots are all `Absolute`.
fn absolute_frame(view: &View) -> Option<Rect> {
    Some(Rect::new(
        view.x().as_absolute()?,
        view.y().as_absolute()?,
        view.width().as_absolute()?,
        view.height().as_absolute()?,
    ))
}

pub(crate) fn commit(tree: &mut ViewTree, id: ViewId, frame: Rect) -> Result<Rect, LayoutError> {
    tree.view_mut(id)?.write_frame(frame);
    trace!(view = %id, %frame, "resolved view");
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dim, Pos};

    #[test]
    fn test_absolute_short_circuit() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new().with_x(1).with_y(2).with_width(3).with_height(4));
        let frame = resolve(&mut tree, id, Size::new(100, 100)).unwrap();
        assert_eq!(frame, Rect::new(1, 2, 3, 4));
        assert!(!tree.get(id).unwrap().needs_layout());
        assert!(tree.get(id).unwrap().is_initialized());
    }

    #[test]
    fn test_dims_before_positions() {
        let mut tree = ViewTree::new();
        let id = tree.insert(
            View::new()
                .with_x(Pos::anchor_end())
                .with_y(Pos::center())
                .with_width(10)
                .with_height(Dim::percent(50.0).unwrap()),
        );
        let frame = resolve(&mut tree, id, Size::new(25, 20)).unwrap();
        assert_eq!(frame, Rect::new(15, 5, 10, 10));
    }

    #[test]
    fn test_fill_uses_own_position() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new().with_x(4).with_width(Dim::fill_margin(1)).with_height(1));
        let frame = resolve(&mut tree, id, Size::new(20, 5)).unwrap();
        assert_eq!(frame, Rect::new(4, 0, 15, 1));
    }

    #[test]
    fn test_negative_size_floors_last() {
        let mut tree = ViewTree::new();
        let id = tree.insert(
            View::new()
                .with_x(Pos::anchor_end())
                .with_width(Dim::fill_margin(30))
                .with_height(1),
        );
        let frame = resolve(&mut tree, id, Size::new(20, 5)).unwrap();
        assert_eq!(frame.width(), 0);
        assert_eq!(frame.x, 20);
    }

    #[test]
    fn test_self_reference_keeps_frame() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new().with_frame(Rect::new(0, 0, 7, 3)));
        tree.get_mut(id).unwrap().set_width(Dim::width(id));
        let frame = resolve(&mut tree, id, Size::new(50, 50)).unwrap();
        assert_eq!(frame.width(), 7);
    }

    #[test]
    fn test_dangling_reference_is_null_target() {
        let mut tree = ViewTree::new();
        let gone = tree.insert(View::new());
        tree.destroy(gone).unwrap();
        let id = tree.insert(View::new().with_x(Pos::right(gone)));
        assert_eq!(
            resolve(&mut tree, id, Size::new(10, 10)),
            Err(LayoutError::NullTarget { view: id, target: gone })
        );
    }

    #[test]
    fn test_compute_does_not_write() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new().with_width(Dim::fill()));
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        let frame = compute_frame(&cx, Size::new(9, 9)).unwrap();
        assert_eq!(frame.width(), 9);
        assert_eq!(tree.frame(id).width(), 0);
    }
}
