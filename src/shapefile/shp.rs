//! `.shp` and `.shx` encoding for a single polygon record.
//!
//! Layout follows the ESRI Shapefile Technical Description (1998): big-endian
//! file code and lengths, little-endian everything else, lengths counted in
//! 16-bit words.

use crate::domain::model::{BoundingBox, Point};
use crate::utils::error::Result;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

pub const FILE_CODE: i32 = 9994;
pub const VERSION: i32 = 1000;
pub const SHAPE_TYPE_POLYGON: i32 = 5;
pub const HEADER_BYTES: usize = 100;
pub const RECORD_HEADER_BYTES: usize = 8;
pub const INDEX_RECORD_BYTES: usize = 8;

/// Content length in bytes of a single-part polygon record.
pub fn polygon_content_bytes(num_points: usize) -> usize {
    // shape type + box + NumParts + NumPoints + Parts[1] + Points
    4 + 32 + 4 + 4 + 4 + 16 * num_points
}

fn write_header(buf: &mut Vec<u8>, file_bytes: usize, bbox: &BoundingBox) -> Result<()> {
    buf.write_i32::<BigEndian>(FILE_CODE)?;
    for _ in 0..5 {
        buf.write_i32::<BigEndian>(0)?;
    }
    buf.write_i32::<BigEndian>((file_bytes / 2) as i32)?;
    buf.write_i32::<LittleEndian>(VERSION)?;
    buf.write_i32::<LittleEndian>(SHAPE_TYPE_POLYGON)?;
    write_bbox(buf, bbox)?;
    // Zmin, Zmax, Mmin, Mmax
    for _ in 0..4 {
        buf.write_f64::<LittleEndian>(0.0)?;
    }
    Ok(())
}

fn write_bbox(buf: &mut Vec<u8>, bbox: &BoundingBox) -> Result<()> {
    buf.write_f64::<LittleEndian>(bbox.min_x)?;
    buf.write_f64::<LittleEndian>(bbox.min_y)?;
    buf.write_f64::<LittleEndian>(bbox.max_x)?;
    buf.write_f64::<LittleEndian>(bbox.max_y)?;
    Ok(())
}

/// Encodes the main geometry file for one closed, clockwise ring.
pub fn encode_shp(ring: &[Point], bbox: &BoundingBox) -> Result<Vec<u8>> {
    let content = polygon_content_bytes(ring.len());
    let file_bytes = HEADER_BYTES + RECORD_HEADER_BYTES + content;
    let mut buf = Vec::with_capacity(file_bytes);

    write_header(&mut buf, file_bytes, bbox)?;

    // 記錄標頭：編號從 1 開始
    buf.write_i32::<BigEndian>(1)?;
    buf.write_i32::<BigEndian>((content / 2) as i32)?;

    buf.write_i32::<LittleEndian>(SHAPE_TYPE_POLYGON)?;
    write_bbox(&mut buf, bbox)?;
    buf.write_i32::<LittleEndian>(1)?;
    buf.write_i32::<LittleEndian>(ring.len() as i32)?;
    buf.write_i32::<LittleEndian>(0)?;
    for p in ring {
        buf.write_f64::<LittleEndian>(p.x)?;
        buf.write_f64::<LittleEndian>(p.y)?;
    }

    debug_assert_eq!(buf.len(), file_bytes);
    Ok(buf)
}

/// Encodes the index file pointing at the single record of `encode_shp`.
pub fn encode_shx(num_points: usize, bbox: &BoundingBox) -> Result<Vec<u8>> {
    let file_bytes = HEADER_BYTES + INDEX_RECORD_BYTES;
    let mut buf = Vec::with_capacity(file_bytes);

    write_header(&mut buf, file_bytes, bbox)?;
    buf.write_i32::<BigEndian>((HEADER_BYTES / 2) as i32)?;
    buf.write_i32::<BigEndian>((polygon_content_bytes(num_points) / 2) as i32)?;

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_ring() -> (Vec<Point>, BoundingBox) {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        let bbox = BoundingBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
        };
        (ring, bbox)
    }

    #[test]
    fn test_shp_header_and_record_layout() {
        let (ring, bbox) = unit_ring();
        let shp = encode_shp(&ring, &bbox).unwrap();

        // 100 header + 8 record header + 44 + 4 + 5 * 16
        assert_eq!(shp.len(), 236);
        assert_eq!(&shp[0..4], &9994i32.to_be_bytes());
        assert_eq!(&shp[24..28], &118i32.to_be_bytes());
        assert_eq!(&shp[28..32], &1000i32.to_le_bytes());
        assert_eq!(&shp[32..36], &5i32.to_le_bytes());
        assert_eq!(&shp[52..60], &1.0f64.to_le_bytes());
        assert_eq!(&shp[100..104], &1i32.to_be_bytes());
        assert_eq!(&shp[104..108], &64i32.to_be_bytes());
        assert_eq!(&shp[144..148], &1i32.to_le_bytes());
        assert_eq!(&shp[148..152], &5i32.to_le_bytes());
        assert_eq!(&shp[152..156], &0i32.to_le_bytes());
        assert_eq!(&shp[172..180], &0.0f64.to_le_bytes());
        assert_eq!(&shp[180..188], &1.0f64.to_le_bytes());
    }

    #[test]
    fn test_shx_points_at_first_record() {
        let (ring, bbox) = unit_ring();
        let shx = encode_shx(ring.len(), &bbox).unwrap();

        assert_eq!(shx.len(), 108);
        assert_eq!(&shx[24..28], &54i32.to_be_bytes());
        assert_eq!(&shx[32..36], &5i32.to_le_bytes());
        assert_eq!(&shx[100..104], &50i32.to_be_bytes());
        assert_eq!(&shx[104..108], &64i32.to_be_bytes());
    }
}
