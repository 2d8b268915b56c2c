//! Filesystem adapters for catalogs, generated plates and raster files.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use dichromat_core::encode::encode_png;
use dichromat_core::{Catalog, CatalogEntry, CatalogSource, PlateOutput};
use image::RgbImage;
use tracing::{debug, info, warn};

/// Catalog record file name inside a catalog directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Reads a catalog from a directory (or an explicit metadata file).
#[derive(Debug, Clone)]
pub struct FsCatalogSource {
    metadata_path: PathBuf,
    root: PathBuf,
}

impl FsCatalogSource {
    /// Creates a source for `path`.
    ///
    /// A directory is expected to hold [`METADATA_FILE`] next to the plates;
    /// a file path names the metadata directly and plates are resolved
    /// relative to its parent.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self {
                metadata_path: path.join(METADATA_FILE),
                root: path,
            }
        } else {
            let root = path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            Self {
                metadata_path: path,
                root,
            }
        }
    }

    /// Path of the metadata record.
    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Directory plates are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CatalogSource for FsCatalogSource {
    fn load(&self) -> Result<Catalog> {
        let json = std::fs::read_to_string(&self.metadata_path).with_context(|| {
            format!("Failed to read catalog: {}", self.metadata_path.display())
        })?;
        let catalog = Catalog::from_json(&json).with_context(|| {
            format!("Invalid catalog: {}", self.metadata_path.display())
        })?;
        debug!(
            "Loaded catalog {} with {} images",
            self.metadata_path.display(),
            catalog.images.len()
        );
        Ok(catalog)
    }

    fn read_plate(&self, entry: &CatalogEntry) -> Result<Vec<u8>> {
        let name = Path::new(&entry.filename);
        if name.components().count() != 1 || name.file_name().is_none() {
            bail!("Refusing catalog filename outside the catalog: {}", entry.filename);
        }
        let path = self.root.join(name);
        std::fs::read(&path).with_context(|| format!("Failed to read plate: {}", path.display()))
    }
}

/// Loads a catalog at most once and shares it read-only.
pub struct SharedCatalog<S> {
    source: S,
    catalog: OnceLock<Result<Arc<Catalog>, String>>,
}

impl<S: CatalogSource> SharedCatalog<S> {
    /// Wraps a source; nothing is read until [`Self::get`].
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            catalog: OnceLock::new(),
        }
    }

    /// Returns the catalog, loading it on first use.
    ///
    /// A failed load is cached too; the source is never retried.
    ///
    /// # Errors
    ///
    /// Returns the load error.
    pub fn get(&self) -> Result<Arc<Catalog>> {
        let result = self
            .catalog
            .get_or_init(|| self.source.load().map(Arc::new).map_err(|e| format!("{e:#}")));

        result.clone().map_err(|e| anyhow::anyhow!("{e}"))
    }

    /// The wrapped source.
    pub const fn source(&self) -> &S {
        &self.source
    }
}

/// Writes generated plates and the catalog record into a directory.
#[derive(Debug, Clone)]
pub struct FsPlateOutput {
    dir: PathBuf,
    metadata_path: PathBuf,
}

impl FsPlateOutput {
    /// Creates `dir` if needed; the catalog goes to `dir/metadata.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self {
            metadata_path: dir.join(METADATA_FILE),
            dir,
        })
    }

    /// Writes the catalog to `path` instead.
    #[must_use]
    pub fn with_metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_path = path.into();
        self
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the catalog is written.
    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }
}

impl PlateOutput for FsPlateOutput {
    fn write_plate(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(filename);
        if path.exists() {
            warn!("Overwriting {}", path.display());
        }
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write plate: {}", path.display()))
    }

    fn write_catalog(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.metadata_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = catalog.to_json_pretty()?;
        std::fs::write(&self.metadata_path, json).with_context(|| {
            format!("Failed to write catalog: {}", self.metadata_path.display())
        })?;
        info!("Wrote catalog {}", self.metadata_path.display());
        Ok(())
    }
}

/// Loads any supported raster file as 8-bit RGB.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    Ok(image.to_rgb8())
}

/// Writes an RGB raster as PNG with the engine's fixed encoder settings.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_png(path: &Path, image: &RgbImage) -> Result<()> {
    let bytes = encode_png(image)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
