//! dBASE III attribute table with a single numeric `id` column.

use crate::utils::error::{FootprintError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{Datelike, NaiveDate};
use std::io::{Cursor, Read};

pub const DBF_VERSION: u8 = 0x03;
pub const FIELD_NAME: &str = "id";
/// 寬度 11 可容納任何 i32 (含負號)
pub const FIELD_WIDTH: u8 = 11;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const RECORD_ACTIVE: u8 = b' ';
const FILE_HEADER_BYTES: u16 = 32;
const FIELD_DESCRIPTOR_BYTES: u16 = 32;

pub fn header_bytes() -> u16 {
    FILE_HEADER_BYTES + FIELD_DESCRIPTOR_BYTES + 1
}

pub fn record_bytes() -> u16 {
    1 + FIELD_WIDTH as u16
}

pub fn encode_dbf(id: i32, date: NaiveDate) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(header_bytes() as usize + record_bytes() as usize + 1);

    buf.write_u8(DBF_VERSION)?;
    buf.write_u8((date.year() - 1900).clamp(0, 255) as u8)?;
    buf.write_u8(date.month() as u8)?;
    buf.write_u8(date.day() as u8)?;
    buf.write_u32::<LittleEndian>(1)?;
    buf.write_u16::<LittleEndian>(header_bytes())?;
    buf.write_u16::<LittleEndian>(record_bytes())?;
    buf.extend_from_slice(&[0u8; 20]);

    // 欄位描述：名稱 11 bytes (以 0 補齊)、型別、保留、寬度、小數位數
    let mut name = [0u8; 11];
    name[..FIELD_NAME.len()].copy_from_slice(FIELD_NAME.as_bytes());
    buf.extend_from_slice(&name);
    buf.write_u8(b'N')?;
    buf.extend_from_slice(&[0u8; 4]);
    buf.write_u8(FIELD_WIDTH)?;
    buf.write_u8(0)?;
    buf.extend_from_slice(&[0u8; 14]);
    buf.write_u8(HEADER_TERMINATOR)?;

    buf.write_u8(RECORD_ACTIVE)?;
    let value = format!("{:>width$}", id, width = FIELD_WIDTH as usize);
    buf.extend_from_slice(value.as_bytes());
    buf.write_u8(END_OF_FILE)?;

    Ok(buf)
}

/// Parsed contents of a single-field table.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfTable {
    pub last_update: Option<NaiveDate>,
    pub field_name: String,
    pub ids: Vec<i32>,
}

pub fn decode_dbf(data: &[u8]) -> Result<DbfTable> {
    let bad = |message: &str| FootprintError::format("dbf", message);
    let mut cursor = Cursor::new(data);

    let version = cursor.read_u8()?;
    if version != DBF_VERSION {
        return Err(bad(&format!("unsupported version byte 0x{:02x}", version)));
    }
    let (yy, mm, dd) = (cursor.read_u8()?, cursor.read_u8()?, cursor.read_u8()?);
    let last_update = NaiveDate::from_ymd_opt(1900 + yy as i32, mm as u32, dd as u32);
    let record_count = cursor.read_u32::<LittleEndian>()? as usize;
    let header_len = cursor.read_u16::<LittleEndian>()? as usize;
    let record_len = cursor.read_u16::<LittleEndian>()? as usize;

    if header_len != header_bytes() as usize || record_len != record_bytes() as usize {
        return Err(bad("table must hold exactly one numeric id field"));
    }

    let table_len = record_count
        .checked_mul(record_len)
        .and_then(|records| records.checked_add(header_len));
    match table_len {
        Some(len) if len <= data.len() => {}
        _ => {
            return Err(bad(&format!(
                "header declares {} records, file holds {} bytes",
                record_count,
                data.len()
            )))
        }
    }

    cursor.set_position(FILE_HEADER_BYTES as u64);
    let mut descriptor = [0u8; 32];
    cursor.read_exact(&mut descriptor)?;
    let name_end = descriptor[..11].iter().position(|b| *b == 0).unwrap_or(11);
    let field_name = String::from_utf8_lossy(&descriptor[..name_end]).to_string();
    if descriptor[11] != b'N' || descriptor[16] != FIELD_WIDTH || descriptor[17] != 0 {
        return Err(bad(&format!("field '{}' is not an integer column", field_name)));
    }
    if cursor.read_u8()? != HEADER_TERMINATOR {
        return Err(bad("missing header terminator"));
    }

    let mut ids = Vec::with_capacity(record_count);
    let mut record = vec![0u8; record_len];
    for _ in 0..record_count {
        cursor.read_exact(&mut record)?;
        if record[0] != RECORD_ACTIVE {
            continue;
        }
        let text = String::from_utf8_lossy(&record[1..]);
        let id = text
            .trim()
            .parse::<i32>()
            .map_err(|e| bad(&format!("invalid id '{}': {}", text.trim(), e)))?;
        ids.push(id);
    }

    Ok(DbfTable {
        last_update,
        field_name,
        ids,
    })
}
