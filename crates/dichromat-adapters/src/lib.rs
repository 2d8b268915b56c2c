//! Dichromat Adapters - External adapters for dichromat.
//!
//! This crate provides adapters for:
//! - Filesystem catalog source, with load-once sharing
//! - Plate directory output for batch generation
//! - Raster file loading and saving

pub mod fs;

pub use fs::{load_rgb, save_png, FsCatalogSource, FsPlateOutput, SharedCatalog, METADATA_FILE};
