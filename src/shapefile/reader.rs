use crate::domain::model::{signed_area, BoundingBox, Crs, Point, Polygon};
use crate::shapefile::shp::{
    polygon_content_bytes, FILE_CODE, HEADER_BYTES, INDEX_RECORD_BYTES, SHAPE_TYPE_POLYGON,
    VERSION,
};
use crate::shapefile::{dbf, prj, ShapefilePaths};
use crate::utils::error::{FootprintError, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Cursor;
use std::path::Path;

/// A feature read back from a four-file shapefile.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileFeature {
    /// Outer ring, counter-clockwise, starting at the stored first vertex.
    pub polygon: Polygon,
    pub id: i32,
    pub crs: Crs,
}

struct Header {
    file_words: i32,
    bbox: BoundingBox,
}

fn read_header(cursor: &mut Cursor<&[u8]>, file: &str) -> Result<Header> {
    let bad = |message: String| FootprintError::format(file, message);

    let code = cursor.read_i32::<BigEndian>()?;
    if code != FILE_CODE {
        return Err(bad(format!("unexpected file code {}", code)));
    }
    for _ in 0..5 {
        cursor.read_i32::<BigEndian>()?;
    }
    let file_words = cursor.read_i32::<BigEndian>()?;
    let version = cursor.read_i32::<LittleEndian>()?;
    if version != VERSION {
        return Err(bad(format!("unexpected version {}", version)));
    }
    let shape_type = cursor.read_i32::<LittleEndian>()?;
    if shape_type != SHAPE_TYPE_POLYGON {
        return Err(bad(format!("shape type {} is not a polygon", shape_type)));
    }
    let bbox = read_bbox(cursor)?;
    cursor.set_position(HEADER_BYTES as u64);

    Ok(Header { file_words, bbox })
}

/// 標頭中的長度以 16 位元字為單位，且來自不可信的檔案
fn words_to_bytes(words: i32, file: &str, what: &str) -> Result<usize> {
    usize::try_from(words)
        .ok()
        .and_then(|w| w.checked_mul(2))
        .ok_or_else(|| FootprintError::format(file, format!("invalid {} {}", what, words)))
}

fn read_bbox(cursor: &mut Cursor<&[u8]>) -> Result<BoundingBox> {
    Ok(BoundingBox {
        min_x: cursor.read_f64::<LittleEndian>()?,
        min_y: cursor.read_f64::<LittleEndian>()?,
        max_x: cursor.read_f64::<LittleEndian>()?,
        max_y: cursor.read_f64::<LittleEndian>()?,
    })
}

/// Reads the single-polygon record of a `.shp` file as a closed ring.
fn decode_shp(data: &[u8]) -> Result<(Vec<Point>, BoundingBox)> {
    let bad = |message: String| FootprintError::format("shp", message);
    let mut cursor = Cursor::new(data);
    let header = read_header(&mut cursor, "shp")?;

    let declared = words_to_bytes(header.file_words, "shp", "file length")?;
    if declared != data.len() {
        return Err(bad(format!(
            "header declares {} bytes, file has {}",
            declared,
            data.len()
        )));
    }

    let record_number = cursor.read_i32::<BigEndian>()?;
    let content_words = cursor.read_i32::<BigEndian>()?;
    if record_number != 1 {
        return Err(bad(format!("first record is numbered {}", record_number)));
    }

    let shape_type = cursor.read_i32::<LittleEndian>()?;
    if shape_type != SHAPE_TYPE_POLYGON {
        return Err(bad(format!("record shape type {} is not a polygon", shape_type)));
    }
    let _record_bbox = read_bbox(&mut cursor)?;
    let num_parts = cursor.read_i32::<LittleEndian>()?;
    let num_points = cursor.read_i32::<LittleEndian>()?;
    if num_parts != 1 {
        return Err(bad(format!("{} parts found, only single-ring polygons are supported", num_parts)));
    }
    if num_points < 4 {
        return Err(bad(format!("ring has only {} points", num_points)));
    }
    let num_points = num_points as usize;
    if words_to_bytes(content_words, "shp", "record length")? != polygon_content_bytes(num_points) {
        return Err(bad("record length does not match its point count".to_string()));
    }
    if cursor.read_i32::<LittleEndian>()? != 0 {
        return Err(bad("first part does not start at point 0".to_string()));
    }

    let mut ring = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        let x = cursor.read_f64::<LittleEndian>()?;
        let y = cursor.read_f64::<LittleEndian>()?;
        ring.push(Point::new(x, y));
    }

    if cursor.position() as usize != data.len() {
        return Err(bad("more than one record found".to_string()));
    }

    Ok((ring, header.bbox))
}

fn check_shx(data: &[u8], num_points: usize) -> Result<()> {
    let bad = |message: String| FootprintError::format("shx", message);
    let mut cursor = Cursor::new(data);
    let header = read_header(&mut cursor, "shx")?;

    if data.len() != HEADER_BYTES + INDEX_RECORD_BYTES
        || words_to_bytes(header.file_words, "shx", "file length")? != data.len()
    {
        return Err(bad(format!("index holds {} bytes, expected one record", data.len())));
    }
    let offset = cursor.read_i32::<BigEndian>()?;
    let length = cursor.read_i32::<BigEndian>()?;
    if words_to_bytes(offset, "shx", "record offset")? != HEADER_BYTES
        || words_to_bytes(length, "shx", "record length")? != polygon_content_bytes(num_points)
    {
        return Err(bad(format!(
            "index entry (offset {}, length {}) does not match the geometry record",
            offset, length
        )));
    }
    Ok(())
}

/// Reads and cross-checks the four files of a single-feature shapefile.
pub fn read_shapefile(path: impl AsRef<Path>) -> Result<ShapefileFeature> {
    let paths = ShapefilePaths::from_base(path);

    let shp_bytes = std::fs::read(&paths.shp)?;
    let (ring, _bbox) = decode_shp(&shp_bytes)?;
    check_shx(&std::fs::read(&paths.shx)?, ring.len())?;

    let table = dbf::decode_dbf(&std::fs::read(&paths.dbf)?)?;
    if table.field_name != dbf::FIELD_NAME {
        return Err(FootprintError::format(
            "dbf",
            format!("expected field '{}', found '{}'", dbf::FIELD_NAME, table.field_name),
        ));
    }
    let id = match table.ids.as_slice() {
        [id] => *id,
        ids => {
            return Err(FootprintError::format(
                "dbf",
                format!("{} records found for 1 geometry", ids.len()),
            ))
        }
    };

    let prj_text = std::fs::read_to_string(&paths.prj)?;
    let crs = prj::parse_wkt(&prj_text)
        .ok_or_else(|| FootprintError::format("prj", "coordinate system is not WGS84 (EPSG:4326)"))?;

    if ring.first() != ring.last() {
        return Err(FootprintError::format("shp", "ring is not closed"));
    }
    let polygon = Polygon::from_ring(ring)?;
    let polygon = if signed_area(polygon.vertices()) < 0.0 {
        polygon.reversed()
    } else {
        polygon
    };

    Ok(ShapefileFeature { polygon, id, crs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapefile::ShapefileWriter;

    #[test]
    fn test_truncated_shp_is_format_error() {
        let polygon =
            Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let bundle = ShapefileWriter::new().encode(&polygon, 1).unwrap();
        let truncated = &bundle.shp[..bundle.shp.len() - 16];
        assert!(matches!(
            decode_shp(truncated),
            Err(FootprintError::FormatError { .. })
        ));
    }

    #[test]
    fn test_negative_header_length_is_format_error() {
        let polygon =
            Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let bundle = ShapefileWriter::new().encode(&polygon, 1).unwrap();

        let mut shp = bundle.shp.clone();
        shp[24..28].copy_from_slice(&(-1i32).to_be_bytes());
        assert!(matches!(
            decode_shp(&shp),
            Err(FootprintError::FormatError { .. })
        ));

        let mut shx = bundle.shx.clone();
        shx[100..104].copy_from_slice(&i32::MIN.to_be_bytes());
        assert!(matches!(
            check_shx(&shx, 5),
            Err(FootprintError::FormatError { .. })
        ));
    }

    #[test]
    fn test_negative_header_length_in_files_is_format_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let polygon =
            Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let paths = ShapefileWriter::new()
            .write(&polygon, 1, temp_dir.path().join("broken.shp"))
            .unwrap();

        let mut shp = std::fs::read(&paths.shp).unwrap();
        shp[24..28].copy_from_slice(&(-1i32).to_be_bytes());
        std::fs::write(&paths.shp, shp).unwrap();

        assert!(matches!(
            read_shapefile(&paths.shp),
            Err(FootprintError::FormatError { .. })
        ));
    }

    #[test]
    fn test_shx_mismatch_is_detected() {
        let polygon =
            Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let bundle = ShapefileWriter::new().encode(&polygon, 1).unwrap();
        assert!(check_shx(&bundle.shx, 5).is_ok());
        assert!(check_shx(&bundle.shx, 6).is_err());
    }
}
