//! ESRI Shapefile output for a single polygon feature.
//!
//! A feature is written as four sibling files sharing one base name:
//! `.shp` (geometry), `.shx` (index), `.dbf` (attributes) and `.prj` (CRS).

pub mod dbf;
pub mod prj;
pub mod reader;
pub mod shp;

pub use reader::{read_shapefile, ShapefileFeature};

use crate::domain::model::{signed_area, Crs, Footprint, Point, Polygon};
use crate::utils::error::{FootprintError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub const EXTENSIONS: [&str; 4] = ["shp", "shx", "dbf", "prj"];

/// Paths of the four files making up one shapefile.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefilePaths {
    pub shp: PathBuf,
    pub shx: PathBuf,
    pub dbf: PathBuf,
    pub prj: PathBuf,
}

impl ShapefilePaths {
    /// Accepts either `name.shp` or the bare base `name`.
    pub fn from_base(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let base = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("shp") => path.with_extension(""),
            _ => path.to_path_buf(),
        };
        let sibling = |ext: &str| {
            let mut name = base.as_os_str().to_os_string();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        };
        Self {
            shp: sibling("shp"),
            shx: sibling("shx"),
            dbf: sibling("dbf"),
            prj: sibling("prj"),
        }
    }
}

/// Encoded bytes of the four files, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileBundle {
    pub shp: Vec<u8>,
    pub shx: Vec<u8>,
    pub dbf: Vec<u8>,
    pub prj: Vec<u8>,
}

impl ShapefileBundle {
    /// (extension, bytes) pairs in write order.
    pub fn parts(&self) -> [(&'static str, &[u8]); 4] {
        [
            ("shp", self.shp.as_slice()),
            ("shx", self.shx.as_slice()),
            ("dbf", self.dbf.as_slice()),
            ("prj", self.prj.as_slice()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ShapefileWriter {
    crs: Crs,
    date: NaiveDate,
}

impl Default for ShapefileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapefileWriter {
    pub fn new() -> Self {
        Self {
            crs: Crs::Wgs84,
            date: chrono::Local::now().date_naive(),
        }
    }

    /// Fixes the last-update date stamped in the `.dbf` header.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Encodes a closed ring and its `id` attribute.
    ///
    /// The ring must repeat its first vertex and enclose at least three
    /// distinct vertices. It is stored clockwise, the outer-ring orientation
    /// of the format.
    pub fn encode_ring(&self, ring: &[Point], id: i32) -> Result<ShapefileBundle> {
        if ring.len() < 2 || ring.first() != ring.last() {
            return Err(FootprintError::invalid_geometry(
                "the ring must be closed (first vertex repeated at the end)",
            ));
        }
        let polygon = Polygon::from_ring(ring.to_vec())?;

        // 外環以順時針儲存
        let clockwise = if signed_area(polygon.vertices()) > 0.0 {
            polygon.reversed()
        } else {
            polygon
        };
        let closed = clockwise.closed_ring();
        let bbox = clockwise.bounding_box();

        Ok(ShapefileBundle {
            shp: shp::encode_shp(&closed, &bbox)?,
            shx: shp::encode_shx(closed.len(), &bbox)?,
            dbf: dbf::encode_dbf(id, self.date)?,
            prj: prj::wkt(self.crs).as_bytes().to_vec(),
        })
    }

    pub fn encode(&self, polygon: &Polygon, id: i32) -> Result<ShapefileBundle> {
        self.encode_ring(&polygon.closed_ring(), id)
    }

    /// Writes the four files next to `path`. The target directory must exist.
    ///
    /// Files are written one after another; a failure part-way leaves the
    /// earlier files in place.
    pub fn write_ring(&self, ring: &[Point], id: i32, path: impl AsRef<Path>) -> Result<ShapefilePaths> {
        let bundle = self.encode_ring(ring, id)?;
        let paths = ShapefilePaths::from_base(path);

        std::fs::write(&paths.shp, &bundle.shp)?;
        std::fs::write(&paths.shx, &bundle.shx)?;
        std::fs::write(&paths.dbf, &bundle.dbf)?;
        std::fs::write(&paths.prj, &bundle.prj)?;

        tracing::debug!("Shapefile written to {}", paths.shp.display());
        Ok(paths)
    }

    pub fn write(&self, polygon: &Polygon, id: i32, path: impl AsRef<Path>) -> Result<ShapefilePaths> {
        self.write_ring(&polygon.closed_ring(), id, path)
    }
}

/// 以今天日期寫出單一多邊形 shapefile
pub fn write_shapefile(polygon: &Polygon, id: i32, path: impl AsRef<Path>) -> Result<ShapefilePaths> {
    ShapefileWriter::new().write(polygon, id, path)
}

pub fn write_footprint(footprint: &Footprint, path: impl AsRef<Path>) -> Result<ShapefilePaths> {
    ShapefileWriter {
        crs: footprint.crs,
        date: chrono::Local::now().date_naive(),
    }
    .write(&footprint.polygon, footprint.id, path)
}
