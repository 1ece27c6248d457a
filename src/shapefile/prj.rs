use crate::domain::model::Crs;

/// OGC WKT1 definition of geographic WGS84.
pub const WGS84_WKT: &str = concat!(
    r#"GEOGCS["WGS 84","#,
    r#"DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],"#,
    r#"PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],"#,
    r#"AUTHORITY["EPSG","4326"]]"#
);

pub fn wkt(crs: Crs) -> &'static str {
    match crs {
        Crs::Wgs84 => WGS84_WKT,
    }
}

/// Recognises the CRS described by a `.prj` sidecar.
pub fn parse_wkt(text: &str) -> Option<Crs> {
    let compact: String = text.split_whitespace().collect();
    let is_geographic = compact.starts_with("GEOGCS[");
    let wgs84_authority = compact.ends_with(r#"AUTHORITY["EPSG","4326"]]"#);
    // ESRI 風格的 .prj 沒有 AUTHORITY，只能依 datum 名稱判斷
    let esri_wgs84 = compact.contains(r#"DATUM["D_WGS_1984""#);

    (is_geographic && (wgs84_authority || esri_wgs84)).then_some(Crs::Wgs84)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_wkt_carries_authority_code() {
        let text = wkt(Crs::Wgs84);
        assert!(text.starts_with("GEOGCS[\"WGS 84\""));
        assert!(text.ends_with("AUTHORITY[\"EPSG\",\"4326\"]]"));
        assert!(!text.ends_with('\n'));
        assert_eq!(text.matches('[').count(), text.matches(']').count());
    }

    #[test]
    fn test_parse_wkt() {
        assert_eq!(parse_wkt(WGS84_WKT), Some(Crs::Wgs84));
        let esri = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(parse_wkt(esri), Some(Crs::Wgs84));
        assert_eq!(parse_wkt(r#"PROJCS["ETRS89 / Portugal TM06"]"#), None);
    }
}
