//! Structured diagnostics emitted with the `tracing` feature.

#![cfg(feature = "tracing")]

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use stowage_grid::{
    DragSlot, DropMode, GridSet, InventoryGrid, InventoryProvider, ItemRef, ListProvider, Point,
    RenderMode, Shape, StowedItem,
};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Default)]
struct Captured {
    messages: Vec<String>,
}

struct MessageCapture {
    state: Arc<Mutex<Captured>>,
}

impl<S> Layer<S> for MessageCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct MessageVisitor {
            message: Option<String>,
        }
        impl tracing::field::Visit for MessageVisitor {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_owned());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_owned());
                }
            }
        }
        let mut visitor = MessageVisitor { message: None };
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.state
                .lock()
                .expect("capture lock")
                .messages
                .push(message);
        }
    }
}

fn capture() -> (Arc<Mutex<Captured>>, tracing::subscriber::DefaultGuard) {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(MessageCapture {
        state: Arc::clone(&state),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();
    (state, guard)
}

fn block(label: &str, width: u16, height: u16) -> ItemRef {
    let shape = Rc::new(Shape::filled(width, height).expect("valid shape"));
    StowedItem::new(label, shape).into_ref()
}

fn seen(state: &Arc<Mutex<Captured>>, name: &str) -> bool {
    state
        .lock()
        .expect("capture lock")
        .messages
        .iter()
        .any(|message| message == name)
}

#[test]
fn grid_mutations_are_traced() {
    let (state, _guard) = capture();
    let mut g = InventoryGrid::new(ListProvider::new(RenderMode::Grid), 3, 3).expect("grid");
    let a = block("a", 1, 1);
    let b = block("b", 1, 1);
    assert!(g.try_add_at(&a, Point::new(2, 2)));
    assert!(g.try_add(&b));
    assert!(g.try_remove(&b));
    g.resize(2, 2).expect("resize");

    for name in ["grid.add", "grid.remove", "grid.drop", "grid.resize", "grid.rebuild"] {
        assert!(seen(&state, name), "missing {name}");
    }
}

#[test]
fn stranded_items_are_warned_about() {
    struct Sticky(ListProvider);
    impl InventoryProvider for Sticky {
        fn render_mode(&self) -> RenderMode {
            RenderMode::Grid
        }
        fn item_count(&self) -> usize {
            self.0.item_count()
        }
        fn is_full(&self) -> bool {
            false
        }
        fn item(&self, index: usize) -> Option<ItemRef> {
            self.0.item(index)
        }
        fn can_add_item(&self, _item: &ItemRef) -> bool {
            true
        }
        fn can_remove_item(&self, _item: &ItemRef) -> bool {
            false
        }
        fn can_drop_item(&self, _item: &ItemRef) -> bool {
            false
        }
        fn add_item(&mut self, item: ItemRef) -> bool {
            self.0.add_item(item)
        }
        fn remove_item(&mut self, _item: &ItemRef) -> bool {
            false
        }
        fn drop_item(&mut self, _item: &ItemRef) -> bool {
            false
        }
    }

    let (state, _guard) = capture();
    let mut g = InventoryGrid::new(Sticky(ListProvider::new(RenderMode::Grid)), 2, 2)
        .expect("grid");
    assert!(g.try_add_at(&block("anchor", 1, 1), Point::new(1, 1)));
    let outcome = g.resize(1, 1).expect("resize");
    assert_eq!(outcome.stranded.len(), 1);
    assert!(seen(&state, "grid.stranded"));
}

#[test]
fn transfer_conclusion_is_traced() {
    let (state, _guard) = capture();
    let mut grids = GridSet::new();
    let bag = grids
        .insert(InventoryGrid::new(ListProvider::new(RenderMode::Grid), 2, 2).expect("grid"))
        .expect("id");
    let gem = block("gem", 1, 1);
    assert!(grids.get_mut(bag).expect("bag").try_add(&gem));

    let mut slot = DragSlot::new();
    slot.begin(&mut grids, bag, Rc::clone(&gem)).expect("begin");
    slot.hover(None).expect("hover");
    assert_eq!(slot.finish(&mut grids, Point::ZERO), Ok(DropMode::Dropped));

    assert!(seen(&state, "transfer.pick_up"));
    assert!(seen(&state, "transfer.conclude"));
}
