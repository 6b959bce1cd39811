//! Dimension expressions.
//!
//! A [`Dim`] describes one axis of a view's size. Like [`Pos`](crate::Pos)
//! it is an immutable value built from validated leaves and `+`/`-`.

use std::fmt;
use std::ops::{Add, Sub};
use std::rc::Rc;

use tessera_core::{Axis, CombineOp, ExprError, ViewId};

use crate::auto_size::{self, AutoStyle, DimAuto};
use crate::pos::{check_percent, percent_of};
use crate::resolve::LayoutContext;
use crate::tree::ViewTree;

/// Callback evaluated on every pass. Opaque to dependency tracking.
pub type DimFn = Rc<dyn Fn() -> i32>;

/// What a percentage dimension is taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PercentMode {
    /// The whole superview dimension
    #[default]
    WholeSize,
    /// The superview dimension left after the view's own position
    RemainingAfterPosition,
}

impl fmt::Display for PercentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentMode::WholeSize => f.write_str("WholeSize"),
            PercentMode::RemainingAfterPosition => f.write_str("RemainingAfterPosition"),
        }
    }
}

/// A dimension expression.
#[derive(Clone)]
pub struct Dim(DimKind);

/// The closed set of dimension variants.
#[derive(Clone)]
pub enum DimKind {
    Absolute(i32),
    Percent {
        percent: f32,
        mode: PercentMode,
    },
    /// Everything up to the superview's far edge, less `margin`
    Fill(i32),
    Auto(DimAuto),
    Func(DimFn),
    View {
        target: ViewId,
        axis: Axis,
    },
    Combine {
        op: CombineOp,
        left: Box<Dim>,
        right: Box<Dim>,
    },
}

impl Dim {
    pub fn absolute(n: i32) -> Self {
        Dim(DimKind::Absolute(n))
    }

    /// Percentage of the whole superview dimension.
    pub fn percent(percent: f32) -> Result<Self, ExprError> {
        Self::percent_with_mode(percent, PercentMode::WholeSize)
    }

    pub fn percent_with_mode(percent: f32, mode: PercentMode) -> Result<Self, ExprError> {
        Ok(Dim(DimKind::Percent {
            percent: check_percent(percent)?,
            mode,
        }))
    }

    /// Fill to the superview's far edge.
    pub fn fill() -> Self {
        Self::fill_margin(0)
    }

    /// Fill to `margin` cells before the far edge. Negative margins reach past it.
    pub fn fill_margin(margin: i32) -> Self {
        Dim(DimKind::Fill(margin))
    }

    /// Size to fit both text and subviews, unbounded.
    pub fn auto() -> Self {
        Self::auto_with(AutoStyle::Auto, None, None)
    }

    pub fn auto_with(style: AutoStyle, min: Option<Dim>, max: Option<Dim>) -> Self {
        Dim(DimKind::Auto(DimAuto::new(style, min, max)))
    }

    pub fn func(f: impl Fn() -> i32 + 'static) -> Self {
        Dim(DimKind::Func(Rc::new(f)))
    }

    /// The size of another view along `axis`.
    pub fn view(target: ViewId, axis: Axis) -> Self {
        Dim(DimKind::View { target, axis })
    }

    pub fn width(target: ViewId) -> Self {
        Self::view(target, Axis::Width)
    }

    pub fn height(target: ViewId) -> Self {
        Self::view(target, Axis::Height)
    }

    fn combine(op: CombineOp, left: Dim, right: Dim) -> Self {
        if let (DimKind::Absolute(l), DimKind::Absolute(r)) = (&left.0, &right.0) {
            return Dim::absolute(op.apply(*l, *r));
        }
        Dim(DimKind::Combine {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn kind(&self) -> &DimKind {
        &self.0
    }

    /// The value if this is an `Absolute` leaf.
    pub fn as_absolute(&self) -> Option<i32> {
        match self.0 {
            DimKind::Absolute(n) => Some(n),
            _ => None,
        }
    }

    /// The top-level `Auto` settings, if this is an `Auto` leaf.
    pub fn as_auto(&self) -> Option<&DimAuto> {
        match &self.0 {
            DimKind::Auto(auto) => Some(auto),
            _ => None,
        }
    }

    /// Evaluate against the view's own location and the superview dimension.
    ///
    /// The result may be negative; the resolver floors sizes at zero only
    /// after the whole expression has been evaluated.
    pub fn calculate(&self, location: i32, superview_dim: i32, cx: &LayoutContext<'_>) -> i32 {
        match &self.0 {
            DimKind::Absolute(n) => *n,
            DimKind::Percent { percent, mode } => match mode {
                PercentMode::WholeSize => percent_of(superview_dim, *percent),
                PercentMode::RemainingAfterPosition => {
                    percent_of(superview_dim.saturating_sub(location), *percent)
                }
            },
            DimKind::Fill(margin) => superview_dim.saturating_sub(location).saturating_sub(*margin),
            DimKind::Auto(auto) => auto_size::calculate(auto, superview_dim, cx),
            DimKind::Func(f) => f(),
            DimKind::View { target, axis } => cx.tree().frame(*target).extent(*axis),
            DimKind::Combine { op, left, right } => op.apply(
                left.calculate(location, superview_dim, cx),
                right.calculate(location, superview_dim, cx),
            ),
        }
    }

    /// Textual form with referenced views rendered with their live frames.
    pub fn display<'a>(&'a self, tree: &'a ViewTree) -> DimDisplay<'a> {
        DimDisplay {
            dim: self,
            tree: Some(tree),
        }
    }
}

impl Default for Dim {
    fn default() -> Self {
        Dim::absolute(0)
    }
}

impl From<i32> for Dim {
    fn from(n: i32) -> Self {
        Dim::absolute(n)
    }
}

impl Add for Dim {
    type Output = Dim;

    fn add(self, rhs: Dim) -> Dim {
        Dim::combine(CombineOp::Add, self, rhs)
    }
}

impl Sub for Dim {
    type Output = Dim;

    fn sub(self, rhs: Dim) -> Dim {
        Dim::combine(CombineOp::Subtract, self, rhs)
    }
}

impl Add<i32> for Dim {
    type Output = Dim;

    fn add(self, rhs: i32) -> Dim {
        self + Dim::absolute(rhs)
    }
}

impl Sub<i32> for Dim {
    type Output = Dim;

    fn sub(self, rhs: i32) -> Dim {
        self - Dim::absolute(rhs)
    }
}

/// Structural equality; `Func` leaves compare by current value.
impl PartialEq for Dim {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (DimKind::Absolute(a), DimKind::Absolute(b)) => a == b,
            (
                DimKind::Percent {
                    percent: pa,
                    mode: ma,
                },
                DimKind::Percent {
                    percent: pb,
                    mode: mb,
                },
            ) => pa == pb && ma == mb,
            (DimKind::Fill(a), DimKind::Fill(b)) => a == b,
            (DimKind::Auto(a), DimKind::Auto(b)) => a == b,
            (DimKind::Func(a), DimKind::Func(b)) => a() == b(),
            (
                DimKind::View {
                    target: ta,
                    axis: aa,
                },
                DimKind::View {
                    target: tb,
                    axis: ab,
                },
            ) => ta == tb && aa == ab,
            (
                DimKind::Combine {
                    op: oa,
                    left: la,
                    right: ra,
                },
                DimKind::Combine {
                    op: ob,
                    left: lb,
                    right: rb,
                },
            ) => oa == ob && la == lb && ra == rb,
            _ => false,
        }
    }
}

/// Display adapter returned by [`Dim::display`].
pub struct DimDisplay<'a> {
    dim: &'a Dim,
    tree: Option<&'a ViewTree>,
}

impl DimDisplay<'_> {
    fn nested<'b>(&'b self, dim: &'b Dim) -> DimDisplay<'b> {
        DimDisplay {
            dim,
            tree: self.tree,
        }
    }
}

impl fmt::Display for DimDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dim.0 {
            DimKind::Absolute(n) => write!(f, "Absolute({})", n),
            DimKind::Percent { percent, mode } => write!(f, "Percent({},{})", percent, mode),
            DimKind::Fill(margin) => write!(f, "Fill({})", margin),
            DimKind::Auto(auto) => {
                write!(f, "Auto({},", auto.style)?;
                if let Some(min) = &auto.min {
                    write!(f, "{}", self.nested(min))?;
                }
                f.write_str(",")?;
                if let Some(max) = &auto.max {
                    write!(f, "{}", self.nested(max))?;
                }
                f.write_str(")")
            }
            DimKind::Func(func) => write!(f, "DimFunc({})", func()),
            DimKind::View { target, axis } => match self.tree {
                Some(tree) => write!(f, "View({},{})", axis, tree.describe(*target)),
                None => write!(f, "View({},{})", axis, target),
            },
            DimKind::Combine { op, left, right } => write!(
                f,
                "Combine({}{}{})",
                self.nested(left),
                op.symbol(),
                self.nested(right)
            ),
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DimDisplay {
            dim: self,
            tree: None,
        }
        .fmt(f)
    }
}

impl fmt::Debug for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dim::{}", self)
    }
}

impl fmt::Debug for DimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Dim(self.clone()), f)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use tessera_core::Rect;

    use super::*;
    use crate::tree::View;

    fn single_view() -> (ViewTree, ViewId) {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new());
        (tree, id)
    }

    #[test]
    fn test_fill_allows_negative_margin() {
        let (tree, id) = single_view();
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        for margin in [-2, 0, 1, 2] {
            assert_eq!(Dim::fill_margin(margin).calculate(0, 25, &cx), 25 - margin);
        }
        assert_eq!(Dim::fill().calculate(5, 25, &cx), 20);
    }

    #[test]
    fn test_fill_saturates() {
        let (tree, id) = single_view();
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        assert_eq!(Dim::fill_margin(i32::MIN).calculate(0, 25, &cx), i32::MAX);
        assert_eq!(Dim::fill().calculate(i32::MAX, i32::MIN, &cx), i32::MIN);
    }

    #[test]
    fn test_percent_modes() {
        let (tree, id) = single_view();
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        let whole = Dim::percent(50.0).unwrap();
        let remaining =
            Dim::percent_with_mode(50.0, PercentMode::RemainingAfterPosition).unwrap();
        assert_eq!(whole.calculate(20, 100, &cx), 50);
        assert_eq!(remaining.calculate(20, 100, &cx), 40);
        assert_eq!(remaining.calculate(21, 100, &cx), 39);
    }

    #[test]
    fn test_percent_plus_absolute() {
        let (tree, id) = single_view();
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        let dim = Dim::percent(50.0).unwrap() + 1;
        assert_eq!(dim.calculate(0, 100, &cx), 51);
    }

    #[test]
    fn test_percent_bounds() {
        assert!(Dim::percent(0.0).is_ok());
        assert!(Dim::percent(100.0).is_ok());
        assert!(matches!(
            Dim::percent(-0.5),
            Err(ExprError::InvalidArgument { parameter: "percent", .. })
        ));
        assert!(Dim::percent(101.0).is_err());
    }

    #[test]
    fn test_combine_keeps_intermediate_negatives() {
        let (tree, id) = single_view();
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        let dim = Dim::absolute(2) - Dim::fill() + Dim::fill();
        assert!(dim.as_absolute().is_none());
        assert_eq!(dim.calculate(0, 10, &cx), 2);
        let negative = Dim::func(|| 3) - 10;
        assert_eq!(negative.calculate(0, 10, &cx), -7);
    }

    #[test]
    fn test_view_dims() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new());
        let other = tree.insert(View::new().with_frame(Rect::new(2, 3, 10, 4)));
        let cx = LayoutContext::new(&tree, id, Axis::Width);
        assert_eq!(Dim::width(other).calculate(0, 0, &cx), 10);
        assert_eq!(Dim::height(other).calculate(0, 0, &cx), 4);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Dim::fill_margin(1), Dim::fill_margin(1));
        assert_ne!(Dim::fill_margin(1), Dim::fill());
        assert_eq!(Dim::width(ViewId(1)), Dim::width(ViewId(1)));
        assert_ne!(Dim::width(ViewId(1)), Dim::height(ViewId(1)));
        assert_eq!(
            Dim::auto_with(AutoStyle::Content, Some(Dim::absolute(3)), None),
            Dim::auto_with(AutoStyle::Content, Some(Dim::absolute(3)), None)
        );
        assert_ne!(
            Dim::auto_with(AutoStyle::Content, None, None),
            Dim::auto_with(AutoStyle::Text, None, None)
        );
        assert_eq!(Dim::func(|| 2), Dim::func(|| 1 + 1));
    }

    #[test]
    fn test_display() {
        assert_snapshot!(Dim::absolute(4).to_string(), @"Absolute(4)");
        assert_snapshot!(Dim::percent(25.0).unwrap().to_string(), @"Percent(25,WholeSize)");
        assert_snapshot!(Dim::fill_margin(-2).to_string(), @"Fill(-2)");
        assert_snapshot!(Dim::auto().to_string(), @"Auto(Auto,,)");
        assert_snapshot!(
            Dim::auto_with(AutoStyle::Content, Some(Dim::absolute(10)), Some(Dim::percent(50.0).unwrap())).to_string(),
            @"Auto(Content,Absolute(10),Percent(50,WholeSize))"
        );
        assert_snapshot!((Dim::width(ViewId(3)) - 1).to_string(), @"Combine(View(Width,#3)-Absolute(1))");
        assert_snapshot!(Dim::func(|| 12).to_string(), @"DimFunc(12)");
    }
}
