//! Layout passes over a view tree.
//!
//! A pass resolves the view it starts at, orders that view's subviews by
//! their dependencies, then resolves each subview and recurses into its
//! subtree before moving on to the next one.

use std::collections::HashSet;

use indexmap::IndexSet;
use tessera_core::{Axis, LayoutError, Size, ViewId};
use tracing::debug;

use crate::auto_size;
use crate::graph::{self, AlignGroups, DependencyGraph};
use crate::references;
use crate::resolve::{self, LayoutContext};
use crate::text::{CellMeasure, TextMeasure};
use crate::tree::ViewTree;

/// Options for layout passes.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Check every auto-sized view as if its `validate_pos_dim` flag were set
    pub validate_pos_dim: bool,
    /// Reposition align groups once all of their members are sized
    pub align_second_pass: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            validate_pos_dim: false,
            align_second_pass: true,
        }
    }
}

/// Notification fired around each `layout_subviews` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    Started(ViewId),
    Complete(ViewId),
}

/// Observer of layout passes.
pub trait LayoutObserver {
    fn layout_started(&mut self, _view: ViewId) {}

    /// Only fired when the pass succeeded.
    fn layout_complete(&mut self, _view: ViewId) {}
}

impl<F> LayoutObserver for F
where
    F: FnMut(LayoutEvent),
{
    fn layout_started(&mut self, view: ViewId) {
        self(LayoutEvent::Started(view));
    }

    fn layout_complete(&mut self, view: ViewId) {
        self(LayoutEvent::Complete(view));
    }
}

/// Runs layout passes with a text measurer and a set of observers.
pub struct LayoutEngine<M: TextMeasure = CellMeasure> {
    options: LayoutOptions,
    measure: M,
    observers: Vec<Box<dyn LayoutObserver>>,
}

impl LayoutEngine<CellMeasure> {
    pub fn new() -> Self {
        Self::with_measure(CellMeasure)
    }
}

impl Default for LayoutEngine<CellMeasure> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMeasure> LayoutEngine<M> {
    /// Create an engine that measures text with `measure`.
    pub fn with_measure(measure: M) -> Self {
        Self {
            options: LayoutOptions::default(),
            measure,
            observers: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn add_observer(&mut self, observer: impl LayoutObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Lay out `root` and everything below it.
    ///
    /// `available` is the size `root` is resolved against: the content
    /// size of its superview, or the screen for a top-level view. On error
    /// the views resolved before the failure keep their new frames.
    pub fn layout_subviews(
        &mut self,
        tree: &mut ViewTree,
        root: ViewId,
        available: Size,
    ) -> Result<(), LayoutError> {
        tree.view(root)?;
        for observer in &mut self.observers {
            observer.layout_started(root);
        }
        debug!(%root, %available, "layout pass started");

        let reachable = tree.reachable_from(tree.root_of(root));
        let mut pass = Pass {
            tree,
            reachable,
            settled: HashSet::new(),
            measure: &self.measure,
            options: &self.options,
        };

        if let Err(err) = pass.run(root, available) {
            debug!(%root, error = %err, "layout pass failed");
            return Err(err);
        }

        for observer in &mut self.observers {
            observer.layout_complete(root);
        }
        Ok(())
    }
}

/// Lay out `root` with a default engine.
pub fn compute_layout(tree: &mut ViewTree, root: ViewId, available: Size) -> Result<(), LayoutError> {
    LayoutEngine::new().layout_subviews(tree, root, available)
}

/// Mark `view` and its ancestors as needing layout.
pub fn invalidate(tree: &mut ViewTree, view: ViewId) {
    tree.invalidate(view);
}

/// State of one layout pass.
struct Pass<'a> {
    tree: &'a mut ViewTree,
    /// Views in the tree being laid out
    reachable: IndexSet<ViewId>,
    /// Views resolved so far
    settled: HashSet<ViewId>,
    measure: &'a dyn TextMeasure,
    options: &'a LayoutOptions,
}

impl Pass<'_> {
    fn run(&mut self, root: ViewId, available: Size) -> Result<(), LayoutError> {
        let view = self.tree.view(root)?;
        for target in references::view_references(view) {
            references::check(self.tree, &self.reachable, root, target)?;
        }
        self.layout_view(root, available)
    }

    /// Resolve `id` and then its whole subtree.
    fn layout_view(&mut self, id: ViewId, superview_size: Size) -> Result<(), LayoutError> {
        let view = self.tree.view(id)?;
        if Axis::ALL
            .into_iter()
            .any(|axis| auto_size::sizes_from_subviews(view, axis))
        {
            self.pre_resolve_subviews(id)?;
        }
        self.resolve_view(id, superview_size)?;
        self.layout_subtree(id)
    }

    fn resolve_view(&mut self, id: ViewId, superview_size: Size) -> Result<(), LayoutError> {
        let cx = LayoutContext::new(self.tree, id, Axis::Width)
            .with_measure(self.measure)
            .with_settled(&self.settled);
        let frame = resolve::compute_frame(&cx, superview_size)?;
        resolve::commit(self.tree, id, frame)?;
        self.settled.insert(id);
        Ok(())
    }

    /// Lay out the subviews of `parent` that do not read its size, so that
    /// its content size can be measured from them.
    fn pre_resolve_subviews(&mut self, parent: ViewId) -> Result<(), LayoutError> {
        let view = self.tree.view(parent)?;
        if self.options.validate_pos_dim || view.validate_pos_dim {
            for axis in Axis::ALL {
                if auto_size::sizes_from_subviews(view, axis) {
                    auto_size::validate_subviews(self.tree, parent, axis)?;
                }
            }
        }

        let graph = DependencyGraph::build(self.tree, parent, &self.reachable)?;
        let order = graph.order()?;
        // The parent is still being measured: nothing wraps against its old size
        let unbounded = Size::new(i32::MAX, i32::MAX);
        let mut early = HashSet::new();

        for id in order {
            let independent = auto_size::independent_of_superview(self.tree.view(id)?, parent);
            if !independent || graph.dependencies(id).any(|dep| !early.contains(&dep)) {
                continue;
            }
            self.layout_view(id, unbounded)?;
            early.insert(id);
        }

        if !early.is_empty() {
            debug!(superview = %parent, count = early.len(), "pre-resolved subviews");
        }
        Ok(())
    }

    fn layout_subtree(&mut self, parent: ViewId) -> Result<(), LayoutError> {
        if self.tree.subviews(parent).is_empty() {
            return Ok(());
        }

        let graph = DependencyGraph::build(self.tree, parent, &self.reachable)?;
        let order = graph.order()?;
        debug!(superview = %parent, ?order, "ordered subviews");

        let groups = graph::align_groups(self.tree, parent);
        let content = self.tree.content_size(parent);

        for id in order {
            if !self.settled.contains(&id) {
                self.layout_view(id, content)?;
            }
            if self.options.align_second_pass {
                self.finish_align_groups(&groups, id, content)?;
            }
        }
        Ok(())
    }

    /// Reposition the members of every group `resolved` belongs to, once
    /// all of them have their final size.
    fn finish_align_groups(
        &mut self,
        groups: &AlignGroups,
        resolved: ViewId,
        content: Size,
    ) -> Result<(), LayoutError> {
        for (&(axis, _), members) in groups {
            if !members.contains(&resolved) || !members.iter().all(|m| self.settled.contains(m)) {
                continue;
            }

            let mut updates = Vec::with_capacity(members.len());
            for &member in members {
                let cx = LayoutContext::new(self.tree, member, axis)
                    .with_measure(self.measure)
                    .with_settled(&self.settled);
                let own = self.tree.frame(member).extent(axis);
                let origin = self
                    .tree
                    .view(member)?
                    .pos(axis)
                    .calculate(content.get(axis), own, &cx);
                updates.push((member, origin));
            }
            for (member, origin) in updates {
                self.tree.view_mut(member)?.set_origin(axis, origin);
            }
        }
        Ok(())
    }
}
