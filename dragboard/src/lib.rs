//! `DragBoard`: drag-reorder kanban board engine.
//!
//! Columns and tasks live in a local [`board::BoardStore`] that is mutated
//! synchronously by CRUD calls and by the [`drag::DragController`]. Every
//! mutation is mirrored to a remote [`remote::DocumentStore`] by the
//! [`sync::Synchronizer`] without blocking the caller. [`BoardSession`] ties
//! the pieces together.

pub mod board;
pub mod config;
pub mod drag;
pub mod ids;
pub mod remote;
pub mod session;
pub mod sync;

pub use session::BoardSession;
