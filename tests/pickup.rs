//! End-to-end exercise of the pickup → add → notify → rebuild flow, playing
//! the role of the external event source and rendering collaborator.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use slot_inventory::grid::{Cell, CellGraphic, GridOptions, GridView, IconResolver};
use slot_inventory::inv::{IconRef, Inventory, Slot};

/// A world object that grants an item on contact. On successful add it is
/// consumed (destroyed); on failure it stays in the world.
struct Pickup {
    item: Slot,
}

/// The pickup-collaborator contract: returns whether the pickup was consumed.
fn touch(store: &Rc<RefCell<Inventory>>, pickup: Pickup) -> Result<(), Pickup> {
    match store.borrow_mut().add(pickup.item.clone()) {
        Ok(()) => Ok(()),
        Err(_) => Err(pickup),
    }
}

struct NoAssets;
impl IconResolver for NoAssets {
    type Image = ();
    fn resolve(&self, _reference: &IconRef) -> Option<()> {
        None
    }
}

#[test]
fn pickup_flow_updates_grid() {
    let store = Rc::new(RefCell::new(Inventory::with_capacity(2)));

    let mut options = GridOptions::default();
    options.columns = 2;
    let mut view = GridView::new(NoAssets, options);
    view.bind(Rc::downgrade(&store));

    // Two coins, then a sword; the coins merge into one stack.
    for pickup in [
        Pickup { item: Slot::new("coin", "Coin", 10) },
        Pickup { item: Slot::new("coin", "Coin", 5) },
        Pickup { item: Slot::new("sword", "Sword", 1) },
    ] {
        assert!(touch(&store, pickup).is_ok());
        view.update();
    }

    assert_eq!(
        view.cells(),
        &[
            Cell::Filled {
                graphic: CellGraphic::Name(arcstr::literal!("Coin")),
                count_label: "x15".to_owned(),
            },
            Cell::Filled {
                graphic: CellGraphic::Name(arcstr::literal!("Sword")),
                count_label: "x1".to_owned(),
            },
        ]
    );

    // Inventory is full: the shield pickup stays in the world and the grid
    // does not change.
    let rejected = touch(&store, Pickup { item: Slot::new("shield", "Shield", 1) });
    assert!(rejected.is_err());
    assert!(!view.update());

    // Spending all the coins frees the slot; now the shield fits.
    store.borrow_mut().remove("coin", 15).unwrap();
    assert!(view.update());
    let shield = rejected.unwrap_err();
    assert!(touch(&store, shield).is_ok());
    assert!(view.update());

    assert_eq!(
        view.cells(),
        &[
            Cell::Filled {
                graphic: CellGraphic::Name(arcstr::literal!("Sword")),
                count_label: "x1".to_owned(),
            },
            Cell::Filled {
                graphic: CellGraphic::Name(arcstr::literal!("Shield")),
                count_label: "x1".to_owned(),
            },
        ]
    );
}
