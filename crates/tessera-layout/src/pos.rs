//! Position expressions.
//!
//! A [`Pos`] describes one axis of a view's location relative to its
//! superview's content area. Leaves are validated when they are built and
//! compose with `+`/`-` into [`PosKind::Combine`] trees.

use std::fmt;
use std::ops::{Add, Sub};
use std::rc::Rc;

use tessera_core::{CombineOp, ExprError, Side, ViewId};

use crate::align::{Aligner, Alignment};
use crate::resolve::LayoutContext;
use crate::tree::ViewTree;

/// Tolerance applied to percentage bounds.
pub(crate) const PERCENT_EPSILON: f32 = 1e-4;

/// Callback evaluated on every pass. Opaque to dependency tracking.
pub type PosFn = Rc<dyn Fn() -> i32>;

/// A position expression.
#[derive(Clone)]
pub struct Pos(PosKind);

/// The closed set of position variants.
#[derive(Clone)]
pub enum PosKind {
    Absolute(i32),
    /// Percentage (0..=100) of the superview dimension
    Percent(f32),
    Center,
    AnchorEnd {
        offset: i32,
        use_dim_for_offset: bool,
    },
    Align {
        aligner: Aligner,
        group_id: i32,
    },
    Func(PosFn),
    View {
        target: ViewId,
        side: Side,
    },
    Combine {
        op: CombineOp,
        left: Box<Pos>,
        right: Box<Pos>,
    },
}

impl Pos {
    pub fn absolute(n: i32) -> Self {
        Pos(PosKind::Absolute(n))
    }

    /// Percentage of the superview dimension.
    pub fn percent(percent: f32) -> Result<Self, ExprError> {
        Ok(Pos(PosKind::Percent(check_percent(percent)?)))
    }

    pub fn center() -> Self {
        Pos(PosKind::Center)
    }

    /// Anchor to the far edge using the view's own size as the offset.
    pub fn anchor_end() -> Self {
        Pos(PosKind::AnchorEnd {
            offset: 0,
            use_dim_for_offset: true,
        })
    }

    /// Anchor `offset` cells before the far edge.
    pub fn anchor_end_offset(offset: i32) -> Result<Self, ExprError> {
        if offset < 0 {
            return Err(ExprError::InvalidArgument {
                parameter: "offset",
                value: offset.to_string(),
                reason: "must be non-negative",
            });
        }
        Ok(Pos(PosKind::AnchorEnd {
            offset,
            use_dim_for_offset: false,
        }))
    }

    /// Align within group 0.
    pub fn align(alignment: Alignment) -> Self {
        Self::align_group(Aligner::new(alignment), 0)
    }

    pub fn align_group(aligner: Aligner, group_id: i32) -> Self {
        Pos(PosKind::Align { aligner, group_id })
    }

    pub fn func(f: impl Fn() -> i32 + 'static) -> Self {
        Pos(PosKind::Func(Rc::new(f)))
    }

    /// The edge of another view.
    pub fn view(target: ViewId, side: Side) -> Self {
        Pos(PosKind::View { target, side })
    }

    pub fn left(target: ViewId) -> Self {
        Self::view(target, Side::Left)
    }

    /// Alias of [`Pos::left`].
    pub fn x(target: ViewId) -> Self {
        Self::left(target)
    }

    pub fn top(target: ViewId) -> Self {
        Self::view(target, Side::Top)
    }

    /// Alias of [`Pos::top`].
    pub fn y(target: ViewId) -> Self {
        Self::top(target)
    }

    pub fn right(target: ViewId) -> Self {
        Self::view(target, Side::Right)
    }

    pub fn bottom(target: ViewId) -> Self {
        Self::view(target, Side::Bottom)
    }

    fn combine(op: CombineOp, left: Pos, right: Pos) -> Self {
        if let (PosKind::Absolute(l), PosKind::Absolute(r)) = (&left.0, &right.0) {
            return Pos::absolute(op.apply(*l, *r));
        }
        Pos(PosKind::Combine {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn kind(&self) -> &PosKind {
        &self.0
    }

    /// The value if this is an `Absolute` leaf.
    pub fn as_absolute(&self) -> Option<i32> {
        match self.0 {
            PosKind::Absolute(n) => Some(n),
            _ => None,
        }
    }

    /// Whether evaluation needs the view's own resolved size.
    pub fn depends_on_own_dim(&self) -> bool {
        match &self.0 {
            PosKind::Center | PosKind::Align { .. } => true,
            PosKind::AnchorEnd {
                use_dim_for_offset, ..
            } => *use_dim_for_offset,
            PosKind::Combine { left, right, .. } => {
                left.depends_on_own_dim() || right.depends_on_own_dim()
            }
            PosKind::Absolute(_)
            | PosKind::Percent(_)
            | PosKind::Func(_)
            | PosKind::View { .. } => false,
        }
    }

    /// The align group this expression takes part in, if any.
    pub fn align_group_id(&self) -> Option<i32> {
        self.aligner().map(|(_, group_id)| group_id)
    }

    pub(crate) fn aligner(&self) -> Option<(&Aligner, i32)> {
        match &self.0 {
            PosKind::Align { aligner, group_id } => Some((aligner, *group_id)),
            PosKind::Combine { left, right, .. } => left.aligner().or_else(|| right.aligner()),
            _ => None,
        }
    }

    /// Evaluate against the superview dimension and the view's own size on
    /// the same axis.
    pub fn calculate(&self, superview_dim: i32, own_dim: i32, cx: &LayoutContext<'_>) -> i32 {
        match &self.0 {
            PosKind::Absolute(n) => *n,
            PosKind::Percent(percent) => percent_of(superview_dim, *percent),
            PosKind::Center => superview_dim.saturating_sub(own_dim) / 2,
            PosKind::AnchorEnd {
                offset,
                use_dim_for_offset,
            } => {
                if *use_dim_for_offset {
                    superview_dim.saturating_sub(own_dim)
                } else {
                    superview_dim.saturating_sub(*offset)
                }
            }
            PosKind::Align { aligner, group_id } => {
                calculate_align(aligner, *group_id, superview_dim, own_dim, cx)
            }
            PosKind::Func(f) => f(),
            PosKind::View { target, side } => cx.tree().frame(*target).edge(*side),
            PosKind::Combine { op, left, right } => op.apply(
                left.calculate(superview_dim, own_dim, cx),
                right.calculate(superview_dim, own_dim, cx),
            ),
        }
    }

    /// Textual form with referenced views rendered with their live frames.
    pub fn display<'a>(&'a self, tree: &'a ViewTree) -> PosDisplay<'a> {
        PosDisplay {
            pos: self,
            tree: Some(tree),
        }
    }
}

/// Position of the view within its align group.
fn calculate_align(
    aligner: &Aligner,
    group_id: i32,
    superview_dim: i32,
    own_dim: i32,
    cx: &LayoutContext<'_>,
) -> i32 {
    let tree = cx.tree();
    let axis = cx.axis();
    let Some(superview) = tree.superview(cx.view()) else {
        return aligner.align(&[own_dim], superview_dim)[0];
    };

    let mut sizes = Vec::new();
    let mut index = None;
    for &member in tree.subviews(superview) {
        let in_group = tree
            .get(member)
            .is_some_and(|v| v.pos(axis).align_group_id() == Some(group_id));
        if !in_group {
            continue;
        }
        if member == cx.view() {
            index = Some(sizes.len());
            sizes.push(own_dim);
        } else {
            sizes.push(tree.frame(member).extent(axis));
        }
    }

    match index {
        Some(i) => aligner.align(&sizes, superview_dim)[i],
        None => aligner.align(&[own_dim], superview_dim)[0],
    }
}

pub(crate) fn check_percent(percent: f32) -> Result<f32, ExprError> {
    if percent.is_nan() || percent < -PERCENT_EPSILON || percent > 100.0 + PERCENT_EPSILON {
        return Err(ExprError::InvalidArgument {
            parameter: "percent",
            value: percent.to_string(),
            reason: "must be between 0 and 100",
        });
    }
    Ok(percent.clamp(0.0, 100.0))
}

pub(crate) fn percent_of(dim: i32, percent: f32) -> i32 {
    (f64::from(dim) * f64::from(percent) / 100.0).floor() as i32
}

impl Default for Pos {
    fn default() -> Self {
        Pos::absolute(0)
    }
}

impl From<i32> for Pos {
    fn from(n: i32) -> Self {
        Pos::absolute(n)
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::combine(CombineOp::Add, self, rhs)
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::combine(CombineOp::Subtract, self, rhs)
    }
}

impl Add<i32> for Pos {
    type Output = Pos;

    fn add(self, rhs: i32) -> Pos {
        self + Pos::absolute(rhs)
    }
}

impl Sub<i32> for Pos {
    type Output = Pos;

    fn sub(self, rhs: i32) -> Pos {
        self - Pos::absolute(rhs)
    }
}

/// Structural equality.
///
/// `Func` leaves compare by the values their callbacks return right now,
/// which invokes both callbacks.
impl PartialEq for Pos {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (PosKind::Absolute(a), PosKind::Absolute(b)) => a == b,
            (PosKind::Percent(a), PosKind::Percent(b)) => a == b,
            (PosKind::Center, PosKind::Center) => true,
            (
                PosKind::AnchorEnd {
                    offset: a,
                    use_dim_for_offset: ua,
                },
                PosKind::AnchorEnd {
                    offset: b,
                    use_dim_for_offset: ub,
                },
            ) => a == b && ua == ub,
            (
                PosKind::Align {
                    aligner: a,
                    group_id: ga,
                },
                PosKind::Align {
                    aligner: b,
                    group_id: gb,
                },
            ) => a == b && ga == gb,
            (PosKind::Func(a), PosKind::Func(b)) => a() == b(),
            (
                PosKind::View {
                    target: ta,
                    side: sa,
                },
                PosKind::View {
                    target: tb,
                    side: sb,
                },
            ) => ta == tb && sa == sb,
            (
                PosKind::Combine {
                    op: oa,
                    left: la,
                    right: ra,
                },
                PosKind::Combine {
                    op: ob,
                    left: lb,
                    right: rb,
                },
            ) => oa == ob && la == lb && ra == rb,
            _ => false,
        }
    }
}

/// Display adapter returned by [`Pos::display`].
pub struct PosDisplay<'a> {
    pos: &'a Pos,
    tree: Option<&'a ViewTree>,
}

impl fmt::Display for PosDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pos.0 {
            PosKind::Absolute(n) => write!(f, "Absolute({})", n),
            PosKind::Percent(percent) => write!(f, "Percent({})", percent),
            PosKind::Center => f.write_str("Center"),
            PosKind::AnchorEnd {
                offset,
                use_dim_for_offset,
            } => {
                if *use_dim_for_offset {
                    f.write_str("AnchorEnd")
                } else {
                    write!(f, "AnchorEnd({})", offset)
                }
            }
            PosKind::Align { aligner, group_id } => write!(
                f,
                "Align(alignment={},spaced={},groupId={})",
                aligner.alignment, aligner.add_space_between, group_id
            ),
            PosKind::Func(func) => write!(f, "PosFunc({})", func()),
            PosKind::View { target, side } => match self.tree {
                Some(tree) => write!(f, "View(Side={},Target={})", side, tree.describe(*target)),
                None => write!(f, "View(Side={},Target={})", side, target),
            },
            PosKind::Combine { op, left, right } => {
                let left = PosDisplay {
                    pos: left,
                    tree: self.tree,
                };
                let right = PosDisplay {
                    pos: right,
                    tree: self.tree,
                };
                write!(f, "Combine({}{}{})", left, op.symbol(), right)
            }
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PosDisplay {
            pos: self,
            tree: None,
        }
        .fmt(f)
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos::{}", self)
    }
}

impl fmt::Debug for PosKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Pos(self.clone()), f)
    }
}
