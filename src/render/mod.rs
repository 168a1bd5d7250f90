//! HTML preview rendering.
//!
//! - `html`: the preview fragment (tabs, controls, grid)
//! - `css`: cell style translation and escaping

mod css;
mod html;

pub use css::{cell_css, escape_html, sanitize_css_value};
pub use html::{
    render_grid, render_preview, RenderOptions, DOWNLOADING_LABEL, DOWNLOAD_LABEL, NO_DATA_LABEL,
};
