//! Shared data model and persisted document format for `DragBoard`.

pub mod board;
pub mod codec;
pub mod document;
