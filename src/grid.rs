//! Deriving a fixed-size grid view from inventory contents.
//!
//! [`GridView`] is the consumer side of the inventory's change-notification
//! protocol: it holds a non-owning handle to an [`Inventory`], listens for
//! changes, and deterministically rebuilds a `capacity`-sized sequence of
//! [`Cell`]s from a snapshot of the slots. It produces cell *data* only;
//! actually drawing the cells belongs to the embedding application.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use arcstr::ArcStr;
use euclid::default::{Point2D, Size2D};

use crate::inv::{IconRef, Inventory, Slot};
use crate::listen::{DirtyFlag, ListenerKey};

/// Position of a cell within the grid, as (column, row), row-major.
pub type CellPosition = Point2D<u32>;

/// Capability to turn an [`IconRef`] into a loaded image.
///
/// Resolution is fallible; a [`GridView`] treats failure as "no icon" and
/// falls back to the slot's display name, never failing the rebuild.
pub trait IconResolver {
    /// The loaded-image type this resolver produces.
    type Image;

    /// Attempt to load the asset named by `reference`.
    fn resolve(&self, reference: &IconRef) -> Option<Self::Image>;
}

/// Layout parameters for a [`GridView`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct GridOptions {
    /// Number of grid columns; clamped to a minimum of 1 at use.
    pub columns: u32,

    /// Pixel size of one cell. Carried for the rendering collaborator's
    /// benefit; has no effect on grid contents or layout indices.
    pub cell_size: Size2D<f32>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: 5,
            cell_size: Size2D::new(72.0, 72.0),
        }
    }
}

/// One cell of the rebuilt grid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cell<I> {
    /// No slot at this index: no graphic, no count label.
    Empty,
    /// A slot's rendering: its graphic and its `"x{quantity}"` count label.
    Filled {
        /// Icon if one resolved, display-name text otherwise.
        graphic: CellGraphic<I>,
        /// Quantity label, always present for a filled cell (including `"x1"`).
        count_label: String,
    },
}

/// The visual content of a filled [`Cell`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CellGraphic<I> {
    /// A successfully resolved icon image.
    Icon(I),
    /// Text fallback: the slot's display name.
    Name(ArcStr),
}

/// A fixed-size grid of [`Cell`]s rebuilt from [`Inventory`] snapshots.
///
/// A `GridView` starts unbound. [`bind`](Self::bind) attaches it to an
/// inventory, subscribes to its change notifications, and rebuilds once
/// immediately; after that, each successful mutation of the inventory marks
/// the view dirty, and the owner's update loop calls
/// [`update`](Self::update) to rebuild. (The rebuild cannot run inside the
/// notification itself, since the inventory is mutably borrowed while
/// notifying; the dirty flag defers it to a safe point.)
///
/// The view holds only a [`Weak`] handle: it never keeps the inventory alive,
/// and if the inventory is dropped, rebuilds become no-ops that leave the
/// last-built cells in place.
pub struct GridView<R: IconResolver> {
    resolver: R,
    options: GridOptions,
    source: Weak<RefCell<Inventory>>,
    listen_key: Option<ListenerKey>,
    dirty: DirtyFlag,
    cells: Vec<Cell<R::Image>>,
}

impl<R: IconResolver> GridView<R> {
    /// Constructs an unbound `GridView` with no cells.
    pub fn new(resolver: R, options: GridOptions) -> Self {
        Self {
            resolver,
            options,
            source: Weak::new(),
            listen_key: None,
            dirty: DirtyFlag::new(false),
            cells: Vec::new(),
        }
    }

    /// Attaches this view to an inventory: subscribes to its change
    /// notifications and rebuilds once from its current state.
    ///
    /// If `store` no longer points to a live inventory, this is a no-op and
    /// the view stays unbound with its grid unrendered.
    pub fn bind(&mut self, store: Weak<RefCell<Inventory>>) {
        let Some(strong) = store.upgrade() else {
            return;
        };
        self.unbind();
        self.dirty = DirtyFlag::new(false);
        self.listen_key = Some(strong.borrow().listen(self.dirty.listener()));
        self.source = store;
        self.rebuild();
    }

    /// Detaches this view from its inventory, if bound and the inventory is
    /// still alive. The last-built cells are kept.
    pub fn unbind(&mut self) {
        if let (Some(key), Some(strong)) = (self.listen_key.take(), self.source.upgrade()) {
            strong.borrow().unlisten(key);
        }
        self.source = Weak::new();
    }

    /// Returns whether this view is bound to a still-living inventory.
    pub fn is_bound(&self) -> bool {
        self.listen_key.is_some() && self.source.strong_count() > 0
    }

    /// Rebuilds the cells if any change notification has arrived since the
    /// last rebuild. Returns whether a rebuild happened.
    ///
    /// Call this from the owner's update loop, after mutations have settled.
    pub fn update(&mut self) -> bool {
        if self.dirty.get_and_clear() {
            self.rebuild();
            true
        } else {
            false
        }
    }

    /// Unconditionally rebuilds the cells from the inventory's current state.
    ///
    /// Produces exactly `capacity` cells (capacity defensively clamped to a
    /// minimum of 1): cell `i` shows slot `i` where one exists and is empty
    /// past the end of the slot list. Rebuilding twice with unchanged
    /// inventory state produces an identical grid.
    ///
    /// If the view is unbound or the inventory has been dropped, this does
    /// nothing.
    pub fn rebuild(&mut self) {
        let Some(store) = self.source.upgrade() else {
            return;
        };
        let store = store.borrow();
        let capacity = store.capacity().max(1);
        let slots = store.slots();
        let cells = (0..capacity)
            .map(|index| match slots.get(index) {
                Some(slot) => Cell::Filled {
                    graphic: self.graphic_for(slot),
                    count_label: format!("x{}", slot.quantity),
                },
                None => Cell::Empty,
            })
            .collect();
        self.cells = cells;
    }

    /// The cells built by the last rebuild, in row-major order.
    /// Empty if nothing has been rendered yet.
    pub fn cells(&self) -> &[Cell<R::Image>] {
        &self.cells
    }

    /// The cell at the given (column, row) position, if within the grid.
    pub fn cell(&self, position: CellPosition) -> Option<&Cell<R::Image>> {
        let columns = self.columns();
        if position.x >= columns {
            return None;
        }
        self.cells.get((position.y * columns + position.x) as usize)
    }

    /// Maps a cell index to its (column, row) position: row-major layout in
    /// [`GridOptions::columns`] columns.
    pub fn position_of(&self, index: usize) -> CellPosition {
        let columns = self.columns();
        let index = index as u32;
        CellPosition::new(index % columns, index / columns)
    }

    /// The effective column count: [`GridOptions::columns`] clamped to ≥ 1.
    pub fn columns(&self) -> u32 {
        self.options.columns.max(1)
    }

    /// The layout options this view was constructed with.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    fn graphic_for(&self, slot: &Slot) -> CellGraphic<R::Image> {
        if let Some(reference) = &slot.icon {
            if let Some(image) = self.resolver.resolve(reference) {
                return CellGraphic::Icon(image);
            }
            // Asset unavailable: degrade to text rather than failing.
        }
        CellGraphic::Name(slot.display_name.clone())
    }
}

impl<R: IconResolver> fmt::Debug for GridView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridView")
            .field("options", &self.options)
            .field("bound", &self.is_bound())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}
