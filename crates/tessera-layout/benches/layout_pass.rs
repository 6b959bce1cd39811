//! Layout pass benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tessera_core::{Size, ViewId};
use tessera_layout::{compute_layout, AutoStyle, Dim, Pos, View, ViewTree};

/// A form: rows of label + field pairs, each row below the previous one.
fn form(rows: usize) -> (ViewTree, ViewId) {
    let mut tree = ViewTree::new();
    let root = tree.insert(View::new().with_width(Dim::fill()).with_height(Dim::fill()));
    let mut previous: Option<ViewId> = None;

    for row in 0..rows {
        let y = match previous {
            Some(prev) => Pos::bottom(prev),
            None => Pos::absolute(0),
        };
        let label = tree.insert(
            View::new()
                .with_text(format!("Field {}:", row))
                .with_y(y.clone())
                .with_width(Dim::auto_with(AutoStyle::Text, None, None))
                .with_height(1),
        );
        let field = tree.insert(
            View::new()
                .with_x(Pos::right(label) + 1)
                .with_y(y)
                .with_width(Dim::fill_margin(2))
                .with_height(1),
        );
        tree.add_subview(root, label).unwrap();
        tree.add_subview(root, field).unwrap();
        previous = Some(label);
    }
    (tree, root)
}

/// Nested auto-sized panels, each holding a text label.
fn nested_auto(depth: usize) -> (ViewTree, ViewId) {
    let mut tree = ViewTree::new();
    let root = tree.insert(View::new().with_width(Dim::fill()).with_height(Dim::fill()));
    let mut parent = root;
    for level in 0..depth {
        let panel = tree.insert(
            View::new()
                .with_x(1)
                .with_y(1)
                .with_width(Dim::auto())
                .with_height(Dim::auto()),
        );
        let label = tree.insert(
            View::new()
                .with_text(format!("level {}", level))
                .with_width(Dim::auto())
                .with_height(Dim::auto()),
        );
        tree.add_subview(parent, panel).unwrap();
        tree.add_subview(panel, label).unwrap();
        parent = panel;
    }
    (tree, root)
}

fn layout_form(c: &mut Criterion) {
    let (mut tree, root) = form(200);
    c.bench_function("layout_form_200_rows", |b| {
        b.iter(|| compute_layout(&mut tree, black_box(root), black_box(Size::new(120, 400))))
    });
}

fn layout_nested_auto(c: &mut Criterion) {
    let (mut tree, root) = nested_auto(32);
    c.bench_function("layout_nested_auto_32", |b| {
        b.iter(|| compute_layout(&mut tree, black_box(root), black_box(Size::new(120, 40))))
    });
}

criterion_group!(benches, layout_form, layout_nested_auto);
criterion_main!(benches);
