//! Point input normalization and reprojection into a grid's CRS.

use geo_common::CrsCode;
use projection::CoordinateTransformer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SamplerError};

/// A value that carries point-geometry semantics: coordinates and an
/// optional coordinate-system tag.
pub trait PointGeometry {
    fn x(&self) -> f64;
    fn y(&self) -> f64;

    /// Coordinate system of the point; `None` defers to the caller's default.
    fn crs(&self) -> Option<CrsCode>;
}

/// A point geometry with its own coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<CrsCode>,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64, crs: CrsCode) -> Self {
        Self { x, y, crs: Some(crs) }
    }
}

impl PointGeometry for GeoPoint {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn crs(&self) -> Option<CrsCode> {
        self.crs
    }
}

/// One point as supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointInput {
    /// A bare coordinate pair in the call's default CRS.
    Coordinate { x: f64, y: f64 },
    /// A point geometry, possibly tagged with its own CRS.
    Geometry(GeoPoint),
}

impl From<(f64, f64)> for PointInput {
    fn from((x, y): (f64, f64)) -> Self {
        Self::Coordinate { x, y }
    }
}

impl From<[f64; 2]> for PointInput {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::Coordinate { x, y }
    }
}

impl From<GeoPoint> for PointInput {
    fn from(point: GeoPoint) -> Self {
        Self::Geometry(point)
    }
}

impl PointInput {
    /// Resolve against `default_crs` into a finite, CRS-tagged point.
    pub fn resolve(&self, default_crs: CrsCode) -> Result<Point> {
        let (x, y, crs) = match self {
            Self::Coordinate { x, y } => (*x, *y, default_crs),
            Self::Geometry(g) => (g.x(), g.y(), g.crs().unwrap_or(default_crs)),
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(SamplerError::invalid_point(format!(
                "non-finite coordinate ({}, {})",
                x, y
            )));
        }
        Ok(Point { x, y, crs })
    }

    /// Read one point from JSON.
    ///
    /// Accepts `[x, y]`, `{"x": .., "y": ..}` (optionally with `"crs"`), and
    /// GeoJSON-style `{"type": "Point", "coordinates": [x, y]}` with an
    /// optional `"crs"` given either as a string or as a GeoJSON named CRS.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let (x, y) = coordinate_pair(items)
                    .ok_or_else(|| SamplerError::invalid_point(format!("expected [x, y], got {}", value)))?;
                Ok(Self::Coordinate { x, y })
            }
            Value::Object(map) => {
                let crs = map.get("crs").map(parse_crs).transpose()?;

                if let Some(kind) = map.get("type") {
                    if kind.as_str() != Some("Point") {
                        return Err(SamplerError::invalid_point(format!(
                            "unsupported geometry type {}",
                            kind
                        )));
                    }
                    let (x, y) = map
                        .get("coordinates")
                        .and_then(Value::as_array)
                        .and_then(|c| coordinate_pair(c))
                        .ok_or_else(|| SamplerError::invalid_point("point geometry without [x, y] coordinates"))?;
                    return Ok(Self::Geometry(GeoPoint { x, y, crs }));
                }

                match (map.get("x").and_then(Value::as_f64), map.get("y").and_then(Value::as_f64)) {
                    (Some(x), Some(y)) if crs.is_some() => Ok(Self::Geometry(GeoPoint { x, y, crs })),
                    (Some(x), Some(y)) => Ok(Self::Coordinate { x, y }),
                    _ => Err(SamplerError::invalid_point(format!(
                        "object is neither a point geometry nor an {{x, y}} pair: {}",
                        value
                    ))),
                }
            }
            other => Err(SamplerError::invalid_point(format!(
                "cannot read a point from {}",
                other
            ))),
        }
    }

    /// Read one point or a sequence of points from JSON.
    ///
    /// A two-number array is a single coordinate; any other array is read
    /// element by element.
    pub fn many_from_json(value: &Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) if coordinate_pair(items).is_none() => {
                items.iter().map(Self::from_json).collect()
            }
            single => Ok(vec![Self::from_json(single)?]),
        }
    }
}

fn coordinate_pair(items: &[Value]) -> Option<(f64, f64)> {
    match items {
        [x, y] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

fn parse_crs(value: &Value) -> Result<CrsCode> {
    let name = match value {
        Value::String(s) => s.as_str(),
        Value::Number(n) => {
            let code = n
                .as_u64()
                .and_then(|c| u32::try_from(c).ok())
                .ok_or_else(|| SamplerError::invalid_point(format!("invalid EPSG code {}", n)))?;
            return Ok(CrsCode::from_epsg(code)?);
        }
        Value::Object(map) => map
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| SamplerError::invalid_point("named CRS without properties.name"))?,
        other => {
            return Err(SamplerError::invalid_point(format!(
                "unrecognized crs {}",
                other
            )))
        }
    };
    Ok(CrsCode::from_identifier(name)?)
}

/// A finite coordinate tagged with its coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub crs: CrsCode,
}

/// Turns caller point inputs into points in a grid's coordinate system.
pub struct PointLocator<'a> {
    transformer: &'a dyn CoordinateTransformer,
    default_crs: CrsCode,
}

impl<'a> PointLocator<'a> {
    /// `default_crs` applies to bare coordinates and untagged geometries.
    pub fn new(transformer: &'a dyn CoordinateTransformer, default_crs: CrsCode) -> Self {
        Self {
            transformer,
            default_crs,
        }
    }

    pub fn default_crs(&self) -> CrsCode {
        self.default_crs
    }

    /// Resolve and reproject `inputs` into `target`, preserving order.
    ///
    /// Points are reprojected from their own CRS, one transformer call per
    /// distinct source CRS.
    pub fn locate(&self, inputs: &[PointInput], target: CrsCode) -> Result<Vec<Point>> {
        let mut points = inputs
            .iter()
            .map(|input| input.resolve(self.default_crs))
            .collect::<Result<Vec<_>>>()?;

        let mut pending: Vec<CrsCode> = Vec::new();
        for p in &points {
            if p.crs != target && !pending.contains(&p.crs) {
                pending.push(p.crs);
            }
        }

        for source in pending {
            let (indices, coords): (Vec<usize>, Vec<(f64, f64)>) = points
                .iter()
                .enumerate()
                .filter(|(_, p)| p.crs == source)
                .map(|(i, p)| (i, (p.x, p.y)))
                .unzip();

            debug!(
                from = %source,
                to = %target,
                count = coords.len(),
                "Reprojecting points"
            );

            let projected = self.transformer.reproject(&coords, source, target)?;
            if projected.len() != coords.len() {
                return Err(SamplerError::invalid_point(format!(
                    "transformer returned {} points for {}",
                    projected.len(),
                    coords.len()
                )));
            }

            for (i, (x, y)) in indices.into_iter().zip(projected) {
                points[i] = Point { x, y, crs: target };
            }
        }

        Ok(points)
    }

    /// Resolve and reproject a single input.
    pub fn locate_one(&self, input: &PointInput, target: CrsCode) -> Result<Point> {
        let mut points = self.locate(std::slice::from_ref(input), target)?;
        points
            .pop()
            .ok_or_else(|| SamplerError::invalid_point("no point resolved"))
    }
}
