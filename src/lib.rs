//! A lightweight item-container model for interactive applications: a bounded,
//! ordered collection of stackable items ([`inv::Inventory`]), change
//! notifications delivered to registered observers ([`listen`]), and a
//! deterministic fixed-size grid view derived from inventory snapshots
//! ([`grid::GridView`]).
//!
//! ## Data flow
//!
//! Data flows one way: callers mutate an [`inv::Inventory`] through
//! [`add`](inv::Inventory::add), [`remove`](inv::Inventory::remove), or
//! [`clear`](inv::Inventory::clear); every successful mutation synchronously
//! notifies all registered [`listen::Listener`]s; a bound [`grid::GridView`]
//! reacts by rebuilding its cells from a fresh read-only snapshot of the
//! slots. Nothing in the view layer calls back into the mutation API.
//!
//! ## Concurrency
//!
//! This crate is deliberately single-threaded. The intended ownership pattern
//! is an [`Rc`](std::rc::Rc)`<`[`RefCell`](std::cell::RefCell)`<Inventory>>`
//! held by the inventory's owner, with views holding non-owning
//! [`Weak`](std::rc::Weak) handles that are liveness-checked before each use.
//! Callers needing multi-thread access must serialize externally.
//!
//! What is *not* here: persistence, multi-container transfer, item
//! sorting/filtering, and all actual drawing. The grid view produces cell
//! data (icon-or-name plus an `"x{quantity}"` count label); turning cells
//! into pixels is the embedding application's job.

pub mod grid;
pub mod inv;
pub mod listen;
