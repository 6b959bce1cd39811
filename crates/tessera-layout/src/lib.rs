//! Layout computation for terminal view trees.
//!
//! Every view carries four expressions, `x`, `y`, `width` and `height`,
//! built from [`Pos`] and [`Dim`] leaves. A layout pass evaluates them in
//! an order derived from the references between views; nothing is solved
//! simultaneously.
//!
//! # Architecture
//!
//! 1. **Reference extraction**: collect the views each expression reads
//! 2. **Scheduling**: order a superview's subviews with Kahn's algorithm,
//!    rejecting cycles and references that can never resolve
//! 3. **Resolution**: evaluate sizes, then positions, into each frame
//! 4. **Auto-size**: size views from their text and subviews
//!
//! # Example
//!
//! ```
//! use tessera_core::Size;
//! use tessera_layout::{compute_layout, Dim, Pos, View, ViewTree};
//!
//! let mut tree = ViewTree::new();
//! let root = tree.insert(View::new().with_width(Dim::fill()).with_height(Dim::fill()));
//! let first = tree.insert(View::new().with_width(10).with_height(1));
//! let second = tree.insert(
//!     View::new()
//!         .with_x(Pos::right(first) + 1)
//!         .with_width(Dim::fill())
//!         .with_height(1),
//! );
//! tree.add_subview(root, first)?;
//! tree.add_subview(root, second)?;
//!
//! compute_layout(&mut tree, root, Size::new(80, 25))?;
//! assert_eq!(tree.frame(second).x, 11);
//! assert_eq!(tree.frame(second).width(), 69);
//! # Ok::<(), tessera_core::LayoutError>(())
//! ```

mod align;
mod auto_size;
mod compute;
mod dim;
mod graph;
mod pos;
mod references;
mod resolve;
mod text;
mod tree;

pub use align::{Aligner, Alignment};
pub use auto_size::{validate_subviews, AutoStyle, DimAuto};
pub use compute::{
    compute_layout, invalidate, LayoutEngine, LayoutEvent, LayoutObserver, LayoutOptions,
};
pub use dim::{Dim, DimDisplay, DimFn, DimKind, PercentMode};
pub use graph::{align_groups, AlignGroups, DependencyGraph};
pub use pos::{Pos, PosDisplay, PosFn, PosKind};
pub use references::{
    check as check_reference, classify as classify_reference, dim_references, pos_references,
    view_references, ReferenceKind, References,
};
pub use resolve::{compute_frame, resolve, LayoutContext};
pub use text::{measure_text, CellMeasure, TextMeasure};
pub use tree::{View, ViewTree};
