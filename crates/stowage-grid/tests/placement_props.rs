//! Property invariants for overlap, first-fit placement, and resize eviction.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use stowage_grid::{
    GridEvent, GridEventKind, InventoryGrid, ItemRef, ListProvider, Point, RenderMode, Shape,
    StowedItem, bounding_rect, overlaps,
};

fn shape_strategy(max_side: u16) -> impl Strategy<Value = Shape> {
    (1..=max_side, 1..=max_side)
        .prop_flat_map(|(w, h)| {
            prop::collection::vec(any::<bool>(), usize::from(w) * usize::from(h))
                .prop_map(move |cells| (h, cells))
        })
        .prop_map(|(h, cells)| {
            let columns = cells
                .chunks(usize::from(h))
                .map(<[bool]>::to_vec)
                .collect::<Vec<_>>();
            Shape::from_columns(columns).expect("non-empty dimensions")
        })
}

fn solid_shape_strategy(max_side: u16) -> impl Strategy<Value = Shape> {
    shape_strategy(max_side).prop_filter("needs an occupied cell", |shape| !shape.is_vacant())
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-6i32..6, -6i32..6).prop_map(|(x, y)| Point::new(x, y))
}

fn place(label: &str, shape: &Shape, at: Point) -> ItemRef {
    StowedItem::new(label, Rc::new(shape.clone())).at(at).into_ref()
}

fn occupied(shape: &Shape, at: Point) -> HashSet<Point> {
    shape.points().iter().map(|&local| at + local).collect()
}

fn grid(width: u16, height: u16) -> InventoryGrid {
    InventoryGrid::new(ListProvider::new(RenderMode::Grid), width, height).expect("grid")
}

/// Brute-force first fit: x outer, y inner, from the origin.
fn reference_first_fit(grid: &InventoryGrid, item: &ItemRef) -> Option<Point> {
    let max_x = i32::from(grid.width()) - i32::from(item.width());
    let max_y = i32::from(grid.height()) - i32::from(item.height());
    for x in 0..=max_x {
        for y in 0..=max_y {
            let point = Point::new(x, y);
            if grid.can_add_at(item, point) {
                return Some(point);
            }
        }
    }
    None
}

proptest! {
    #[test]
    fn solid_shape_overlaps_itself(shape in solid_shape_strategy(5), at in point_strategy()) {
        let a = place("a", &shape, at);
        let twin = place("twin", &shape, at);
        prop_assert!(overlaps(a.as_ref(), twin.as_ref()));
        prop_assert!(overlaps(a.as_ref(), a.as_ref()));
    }

    #[test]
    fn overlap_is_symmetric_and_matches_cell_sets(
        shape_a in shape_strategy(4),
        shape_b in shape_strategy(4),
        at_a in point_strategy(),
        at_b in point_strategy(),
    ) {
        let a = place("a", &shape_a, at_a);
        let b = place("b", &shape_b, at_b);
        let expected = !occupied(&shape_a, at_a).is_disjoint(&occupied(&shape_b, at_b));
        prop_assert_eq!(overlaps(a.as_ref(), b.as_ref()), expected);
        prop_assert_eq!(overlaps(b.as_ref(), a.as_ref()), expected);
    }

    #[test]
    fn add_then_remove_restores_state(
        width in 1u16..7,
        height in 1u16..7,
        prefill in prop::collection::vec(solid_shape_strategy(3), 0..5),
        shape in solid_shape_strategy(3),
    ) {
        let mut g = grid(width, height);
        for (i, shape) in prefill.iter().enumerate() {
            let _ = g.try_add(&place(&format!("p{i}"), shape, Point::ZERO));
        }
        let before = g.snapshot();

        let item = place("candidate", &shape, Point::ZERO);
        if g.try_add(&item) {
            prop_assert!(g.try_remove(&item));
        }
        prop_assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn first_fit_is_deterministic_and_column_major(
        width in 1u16..7,
        height in 1u16..7,
        prefill in prop::collection::vec((shape_strategy(3), 0i32..6, 0i32..6), 0..6),
        shape in solid_shape_strategy(3),
    ) {
        let build = || {
            let mut g = grid(width, height);
            for (i, (shape, x, y)) in prefill.iter().enumerate() {
                let _ = g.try_add_at(&place(&format!("p{i}"), shape, Point::ZERO), Point::new(*x, *y));
            }
            g
        };
        let mut first = build();
        let mut second = build();
        prop_assert_eq!(first.snapshot(), second.snapshot());

        let a = place("a", &shape, Point::ZERO);
        let b = place("b", &shape, Point::ZERO);
        let expected = reference_first_fit(&first, &a);
        prop_assert_eq!(first.first_fit(&a), expected);
        prop_assert_eq!(first.try_add(&a), expected.is_some());
        prop_assert_eq!(second.try_add(&b), expected.is_some());
        if let Some(point) = expected {
            prop_assert_eq!(a.position(), point);
            prop_assert_eq!(b.position(), point);
        }
    }

    #[test]
    fn resize_evicts_everything_outside_with_one_event_each(
        width in 1u16..8,
        height in 1u16..8,
        new_width in 1u16..8,
        new_height in 1u16..8,
        shapes in prop::collection::vec(solid_shape_strategy(3), 0..8),
    ) {
        let mut g = grid(width, height);
        for (i, shape) in shapes.iter().enumerate() {
            let _ = g.try_add(&place(&format!("s{i}"), shape, Point::ZERO));
        }
        let before = g.item_count();

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let _guard = g.subscribe(move |event: &GridEvent| sink.borrow_mut().push(event.kind()));

        let outcome = g.resize(new_width, new_height).expect("resize");
        let bounds = g.bounds();
        for item in g.items() {
            prop_assert!(bounds.contains_rect(&bounding_rect(item.as_ref())));
        }

        let drops = log
            .borrow()
            .iter()
            .filter(|kind| matches!(kind, GridEventKind::ItemDropped | GridEventKind::ItemDropFailed))
            .count();
        prop_assert_eq!(drops, outcome.dropped.len());
        prop_assert_eq!(before - g.item_count(), outcome.evicted());
        prop_assert!(outcome.stranded.is_empty());
        prop_assert_eq!(log.borrow().last().copied(), Some(GridEventKind::Resized));
    }
}
