//! Grid layout: sheet dimensions and merge resolution for rendering.

mod grid;

pub use grid::{
    clamp_extent, GridLayout, MergeInfo, Placement, MAX_GRID_COLS, MAX_GRID_MERGES,
    MAX_GRID_POSITIONS,
};
