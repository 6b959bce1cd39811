//! View tree data structures.
//!
//! The tree is an arena: it owns every view, subviews are listed by id in
//! insertion order, and the superview link is a plain id back-reference.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;
use tessera_core::{Axis, LayoutError, Rect, Size, ViewId};

use crate::dim::Dim;
use crate::pos::Pos;

/// A node in the view tree.
#[derive(Debug, Clone)]
pub struct View {
    id: ViewId,
    /// Optional name for debugging
    pub name: Option<String>,
    frame: Rect,
    content_size: Option<Size>,
    superview: Option<ViewId>,
    subviews: Vec<ViewId>,
    x: Pos,
    y: Pos,
    width: Dim,
    height: Dim,
    /// Text content, measured by `Dim::auto` text styles
    pub text: String,
    needs_layout: bool,
    /// Reject Auto-size circularities among direct subviews
    pub validate_pos_dim: bool,
    initialized: bool,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    /// Create a detached view with an empty frame and absolute slots.
    pub fn new() -> Self {
        Self {
            id: ViewId(u64::MAX),
            name: None,
            frame: Rect::default(),
            content_size: None,
            superview: None,
            subviews: Vec::new(),
            x: Pos::absolute(0),
            y: Pos::absolute(0),
            width: Dim::absolute(0),
            height: Dim::absolute(0),
            text: String::new(),
            needs_layout: false,
            validate_pos_dim: false,
            initialized: false,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_x(mut self, x: impl Into<Pos>) -> Self {
        self.set_x(x);
        self
    }

    pub fn with_y(mut self, y: impl Into<Pos>) -> Self {
        self.set_y(y);
        self
    }

    pub fn with_width(mut self, width: impl Into<Dim>) -> Self {
        self.set_width(width);
        self
    }

    pub fn with_height(mut self, height: impl Into<Dim>) -> Self {
        self.set_height(height);
        self
    }

    /// Set the frame directly; all four slots become absolute.
    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.set_frame(frame);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_content_size(mut self, size: Size) -> Self {
        self.content_size = Some(size);
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_pos_dim = validate;
        self
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Resolved rectangle in the superview's content coordinates.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn superview(&self) -> Option<ViewId> {
        self.superview
    }

    pub fn subviews(&self) -> &[ViewId] {
        &self.subviews
    }

    pub fn x(&self) -> &Pos {
        &self.x
    }

    pub fn y(&self) -> &Pos {
        &self.y
    }

    pub fn width(&self) -> &Dim {
        &self.width
    }

    pub fn height(&self) -> &Dim {
        &self.height
    }

    /// The position slot for an axis.
    pub fn pos(&self, axis: Axis) -> &Pos {
        match axis {
            Axis::Width => &self.x,
            Axis::Height => &self.y,
        }
    }

    /// The dimension slot for an axis.
    pub fn dim(&self, axis: Axis) -> &Dim {
        match axis {
            Axis::Width => &self.width,
            Axis::Height => &self.height,
        }
    }

    pub fn set_x(&mut self, x: impl Into<Pos>) {
        self.x = x.into();
        self.after_pos_set(Axis::Width);
    }

    pub fn set_y(&mut self, y: impl Into<Pos>) {
        self.y = y.into();
        self.after_pos_set(Axis::Height);
    }

    pub fn set_width(&mut self, width: impl Into<Dim>) {
        self.width = width.into();
        self.after_dim_set(Axis::Width);
    }

    pub fn set_height(&mut self, height: impl Into<Dim>) {
        self.height = height.into();
        self.after_dim_set(Axis::Height);
    }

    /// Replace the frame. The four slots become `Absolute` of its parts.
    pub fn set_frame(&mut self, frame: Rect) {
        self.x = Pos::absolute(frame.x);
        self.y = Pos::absolute(frame.y);
        self.width = Dim::absolute(frame.width());
        self.height = Dim::absolute(frame.height());
        self.frame = frame;
    }

    fn after_pos_set(&mut self, axis: Axis) {
        match self.pos(axis).as_absolute() {
            Some(n) => self.frame.set_origin(axis, n),
            None => self.needs_layout = true,
        }
    }

    fn after_dim_set(&mut self, axis: Axis) {
        match self.dim(axis).as_absolute() {
            Some(n) => self.frame.set_extent(axis, n),
            None => self.needs_layout = true,
        }
    }

    /// Explicitly set content size, if any.
    pub fn explicit_content_size(&self) -> Option<Size> {
        self.content_size
    }

    /// Set or clear the explicit content size.
    pub fn set_content_size(&mut self, size: Option<Size>) {
        self.content_size = size;
        self.needs_layout = true;
    }

    /// Content size: explicit if set, otherwise the frame size.
    pub fn content_size(&self) -> Size {
        self.content_size.unwrap_or_else(|| self.frame.size())
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether every slot is `Absolute`, so the frame is already final.
    pub fn is_fully_absolute(&self) -> bool {
        self.x.as_absolute().is_some()
            && self.y.as_absolute().is_some()
            && self.width.as_absolute().is_some()
            && self.height.as_absolute().is_some()
    }

    pub(crate) fn write_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.needs_layout = false;
        self.initialized = true;
    }

    pub(crate) fn set_origin(&mut self, axis: Axis, value: i32) {
        self.frame.set_origin(axis, value);
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("View");
        write!(f, "{}({}){}", name, self.id, self.frame)
    }
}

/// The arena holding every view.
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    /// All views, indexed by ID
    views: HashMap<ViewId, View>,
    /// Counter for generating unique IDs
    next_id: u64,
}

impl ViewTree {
    /// Create an empty view tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a view and return its id. The view starts detached.
    pub fn insert(&mut self, mut view: View) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        view.id = id;
        view.superview = None;
        view.subviews.clear();
        self.views.insert(id, view);
        id
    }

    /// Check whether an id refers to a live view.
    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    /// Get a view by ID.
    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    /// Get a mutable view by ID.
    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(&id)
    }

    /// Get a view or fail with `UnknownView`.
    pub fn view(&self, id: ViewId) -> Result<&View, LayoutError> {
        self.views.get(&id).ok_or(LayoutError::UnknownView { view: id })
    }

    /// Get a mutable view or fail with `UnknownView`.
    pub fn view_mut(&mut self, id: ViewId) -> Result<&mut View, LayoutError> {
        self.views
            .get_mut(&id)
            .ok_or(LayoutError::UnknownView { view: id })
    }

    /// Frame of a view; empty for unknown ids.
    pub fn frame(&self, id: ViewId) -> Rect {
        self.views.get(&id).map(View::frame).unwrap_or_default()
    }

    /// Content size of a view; empty for unknown ids.
    pub fn content_size(&self, id: ViewId) -> Size {
        self.views
            .get(&id)
            .map(View::content_size)
            .unwrap_or_default()
    }

    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(&id).and_then(View::superview)
    }

    pub fn subviews(&self, id: ViewId) -> &[ViewId] {
        self.views.get(&id).map(View::subviews).unwrap_or(&[])
    }

    /// Iterate over all views.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Append `child` to `parent`'s subviews.
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> Result<(), LayoutError> {
        self.view(parent)?;
        let existing = self.view(child)?.superview;

        if parent == child {
            return Err(LayoutError::InvalidHierarchy {
                parent,
                child,
                reason: "a view cannot contain itself",
            });
        }
        if existing.is_some() {
            return Err(LayoutError::InvalidHierarchy {
                parent,
                child,
                reason: "the view already has a superview",
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(LayoutError::InvalidHierarchy {
                parent,
                child,
                reason: "the view is an ancestor of the new superview",
            });
        }

        self.view_mut(child)?.superview = Some(parent);
        let parent_view = self.view_mut(parent)?;
        parent_view.subviews.push(child);
        parent_view.needs_layout = true;
        Ok(())
    }

    /// Detach `child` from `parent`. The child stays in the arena with an
    /// empty frame.
    pub fn remove_subview(&mut self, parent: ViewId, child: ViewId) -> Result<(), LayoutError> {
        let parent_view = self.view_mut(parent)?;
        let before = parent_view.subviews.len();
        parent_view.subviews.retain(|&id| id != child);
        if parent_view.subviews.len() == before {
            return Err(LayoutError::InvalidHierarchy {
                parent,
                child,
                reason: "the view is not a subview of this superview",
            });
        }
        parent_view.needs_layout = true;

        let child_view = self.view_mut(child)?;
        child_view.superview = None;
        child_view.frame = Rect::default();
        child_view.needs_layout = true;
        Ok(())
    }

    /// Remove a view and its whole subtree from the arena.
    pub fn destroy(&mut self, id: ViewId) -> Result<(), LayoutError> {
        if let Some(parent) = self.view(id)?.superview {
            self.remove_subview(parent, id)?;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(view) = self.views.remove(&next) {
                stack.extend(view.subviews);
            }
        }
        Ok(())
    }

    /// Iterate from the superview of `id` up to the root.
    pub fn ancestors(&self, id: ViewId) -> impl Iterator<Item = ViewId> + '_ {
        std::iter::successors(self.superview(id), move |&current| self.superview(current))
    }

    /// Whether `ancestor` is a strict ancestor of `view`.
    pub fn is_ancestor(&self, ancestor: ViewId, view: ViewId) -> bool {
        self.ancestors(view).any(|id| id == ancestor)
    }

    /// The top-most ancestor of `id` (or `id` itself).
    pub fn root_of(&self, id: ViewId) -> ViewId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Every view reachable from `root` through subview links, in pre-order.
    pub fn reachable_from(&self, root: ViewId) -> IndexSet<ViewId> {
        let mut seen = IndexSet::new();
        if !self.contains(root) {
            return seen;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.subviews(id).iter().rev().copied());
            }
        }
        seen
    }

    /// Mark a view and all of its ancestors as needing layout.
    pub fn invalidate(&mut self, id: ViewId) {
        let mut current = Some(id);
        while let Some(view_id) = current {
            match self.views.get_mut(&view_id) {
                Some(view) => {
                    view.needs_layout = true;
                    current = view.superview;
                }
                None => break,
            }
        }
    }

    /// Render a view as `name(#id){frame}`.
    pub fn describe(&self, id: ViewId) -> String {
        match self.views.get(&id) {
            Some(view) => view.to_string(),
            None => format!("<missing {}>", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_chain() -> (ViewTree, ViewId, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let root = tree.insert(View::new().with_name("root"));
        let child = tree.insert(View::new().with_name("child"));
        let grandchild = tree.insert(View::new().with_name("grandchild"));
        tree.add_subview(root, child).unwrap();
        tree.add_subview(child, grandchild).unwrap();
        (tree, root, child, grandchild)
    }

    #[test]
    fn test_ancestry() {
        let (tree, root, child, grandchild) = tree_with_chain();
        assert_eq!(tree.ancestors(grandchild).collect::<Vec<_>>(), vec![child, root]);
        assert!(tree.is_ancestor(root, grandchild));
        assert!(!tree.is_ancestor(grandchild, root));
        assert!(!tree.is_ancestor(child, child));
        assert_eq!(tree.root_of(grandchild), root);
        assert_eq!(tree.root_of(root), root);
    }

    #[test]
    fn test_reachable_is_preorder() {
        let (mut tree, root, child, grandchild) = tree_with_chain();
        let sibling = tree.insert(View::new());
        tree.add_subview(root, sibling).unwrap();
        let detached = tree.insert(View::new());

        let reachable = tree.reachable_from(root);
        assert_eq!(
            reachable.iter().copied().collect::<Vec<_>>(),
            vec![root, child, grandchild, sibling]
        );
        assert!(!reachable.contains(&detached));
    }

    #[test]
    fn test_add_subview_rejects_bad_hierarchy() {
        let (mut tree, root, child, grandchild) = tree_with_chain();

        assert!(matches!(
            tree.add_subview(root, root),
            Err(LayoutError::InvalidHierarchy { .. })
        ));
        assert!(matches!(
            tree.add_subview(root, grandchild),
            Err(LayoutError::InvalidHierarchy { .. })
        ));
        let orphan = tree.insert(View::new());
        tree.add_subview(orphan, root).unwrap();
        assert!(matches!(
            tree.add_subview(grandchild, orphan),
            Err(LayoutError::InvalidHierarchy { .. })
        ));
        assert_eq!(
            tree.add_subview(child, ViewId(999)),
            Err(LayoutError::UnknownView { view: ViewId(999) })
        );
    }

    #[test]
    fn test_remove_and_destroy() {
        let (mut tree, root, child, grandchild) = tree_with_chain();
        tree.get_mut(child).unwrap().set_frame(Rect::new(1, 1, 5, 5));

        tree.remove_subview(root, child).unwrap();
        assert_eq!(tree.superview(child), None);
        assert_eq!(tree.frame(child), Rect::default());
        assert!(tree.subviews(root).is_empty());

        tree.destroy(child).unwrap();
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.contains(root));
    }

    #[test]
    fn test_absolute_slots_write_frame() {
        let mut view = View::new().with_x(3).with_width(10);
        assert_eq!(view.frame(), Rect::new(3, 0, 10, 0));
        assert!(!view.needs_layout());

        view.set_width(Dim::fill());
        assert!(view.needs_layout());
        assert_eq!(view.frame().width(), 10);
    }

    #[test]
    fn test_invalidate_walks_up() {
        let (mut tree, root, child, grandchild) = tree_with_chain();
        for id in [root, child, grandchild] {
            tree.get_mut(id).unwrap().write_frame(Rect::default());
        }
        tree.invalidate(child);
        assert!(tree.get(root).unwrap().needs_layout());
        assert!(tree.get(child).unwrap().needs_layout());
        assert!(!tree.get(grandchild).unwrap().needs_layout());
    }

    #[test]
    fn test_content_size_defaults_to_frame() {
        let mut view = View::new().with_frame(Rect::new(0, 0, 8, 3));
        assert_eq!(view.content_size(), Size::new(8, 3));
        view.set_content_size(Some(Size::new(20, 20)));
        assert_eq!(view.content_size(), Size::new(20, 20));
    }
}
