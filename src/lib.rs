//! Unsupervised color-space segmentation of raster images using k-means clustering.
//!
//! `chromaseg` splits an image into `k` visually homogeneous regions by clustering its pixel
//! colors and repainting every pixel with the color of its cluster's centroid.
//!
//! # Features
//! To reduce dependencies and compile times, `chromaseg` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of every k-means step via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//! - `colorspaces`: allows clustering in the CIELAB or Oklab color spaces via the high-level API.
//!
//! # High-Level API
//! To get started with the high-level API, see [`SegmentPipeline`]:
//! ```no_run
//! # use chromaseg::{SegmentPipeline, ColorSpace};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//!
//! let segmented = SegmentPipeline::try_from(&img)?
//!     .k(5) // number of regions
//!     .max_iterations(100)
//!     .seed(42)
//!     .colorspace(ColorSpace::Oklab)
//!     .segmented_rgbimage_par()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Low-Level API
//! The individual k-means steps (seeding, assignment, update, and the convergence loop)
//! are available in the [`kmeans`] module, and [`render`] maps a finished clustering back
//! to pixel colors.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod error;
mod types;

pub mod kmeans;
pub mod render;

pub use api::*;
pub use error::{Error, Result};
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;
