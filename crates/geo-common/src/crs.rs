//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Well-known CRS codes understood by the sampling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    #[default]
    Epsg4326,
    /// Spherical Web Mercator (meters)
    Epsg3857,
    /// ETRS89 Lambert Azimuthal Equal Area, Europe (meters)
    Epsg3035,
}

impl CrsCode {
    /// Resolve a coordinate-system identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:4326" or a bare "4326"
    /// - "CRS:84", "latlon", "wgs84" (geographic lon/lat)
    /// - "EPSG:900913", "webmercator" (alias of EPSG:3857)
    /// - "europe_m", "laea" (alias of EPSG:3035)
    pub fn from_identifier(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "4326" | "CRS:84" | "LATLON" | "WGS84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "3857" | "EPSG:900913" | "WEBMERCATOR" => Ok(CrsCode::Epsg3857),
            "EPSG:3035" | "3035" | "EUROPE_M" | "LAEA" => Ok(CrsCode::Epsg3035),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Resolve a numeric EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        match code {
            4326 => Ok(CrsCode::Epsg4326),
            3857 | 900913 => Ok(CrsCode::Epsg3857),
            3035 => Ok(CrsCode::Epsg3035),
            other => Err(CrsParseError::UnsupportedCrs(format!("EPSG:{}", other))),
        }
    }

    /// The numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Epsg3035 => 3035,
        }
    }

    /// Check if this is a geographic (lon/lat degrees) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(
            CrsCode::from_identifier("EPSG:4326").unwrap(),
            CrsCode::Epsg4326
        );
        assert_eq!(
            CrsCode::from_identifier("epsg:3857").unwrap(),
            CrsCode::Epsg3857
        );
        assert_eq!(CrsCode::from_identifier("latlon").unwrap(), CrsCode::Epsg4326);
        assert_eq!(
            CrsCode::from_identifier(" europe_m ").unwrap(),
            CrsCode::Epsg3035
        );
        assert_eq!("3035".parse::<CrsCode>().unwrap(), CrsCode::Epsg3035);
        assert!(CrsCode::from_identifier("EPSG:99999").is_err());
    }

    #[test]
    fn test_epsg_roundtrip_and_display() {
        for code in [CrsCode::Epsg4326, CrsCode::Epsg3857, CrsCode::Epsg3035] {
            assert_eq!(CrsCode::from_epsg(code.epsg()).unwrap(), code);
            assert_eq!(CrsCode::from_identifier(&code.to_string()).unwrap(), code);
        }
        assert_eq!(CrsCode::from_epsg(900913).unwrap(), CrsCode::Epsg3857);
        assert!(CrsCode::from_epsg(32633).is_err());
    }

    #[test]
    fn test_is_geographic() {
        assert!(CrsCode::Epsg4326.is_geographic());
        assert!(!CrsCode::Epsg3857.is_geographic());
        assert!(!CrsCode::Epsg3035.is_geographic());
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let json = serde_json::to_string(&CrsCode::Epsg3857).unwrap();
        assert_eq!(json, "\"Epsg3857\"");
    }
}
