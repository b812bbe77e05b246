//! Internal building blocks of the engine, from raw frame to moved surface:
//! `grid` pools a decoded frame down to brightness cells, `decomposer`
//! claims rectangles over the dark ones, and `reconciler` applies the
//! result to the `surface` pool.

pub mod decomposer;
pub mod grid;
pub mod reconciler;
pub mod rect;
pub mod surface;
