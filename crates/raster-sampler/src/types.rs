//! Core types for raster sampling.

use std::fmt;
use std::str::FromStr;

use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::SamplerError;

/// A validated cell address: `0 <= col < cols`, `0 <= row < rows`.
///
/// `row` is in the grid's native storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    pub col: usize,
    pub row: usize,
}

impl CellIndex {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Fractional distance of a point from its nearest cell centre, in cell units.
///
/// Both components lie in `[-0.5, 0.5]` for points inside the located cell.
/// `dx > 0` means the point is east of the centre. `dy > 0` means the point
/// is below (south of) the centre in canonical top-first window order,
/// whatever the grid's storage orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubPixelOffset {
    pub dx: f64,
    pub dy: f64,
}

impl SubPixelOffset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Cell data type of a grid, fixed when the grid is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Byte,
    Int16,
    Int32,
    UInt16,
    UInt32,
    Float32,
    Float64,
    Bool,
}

impl FromStr for DataType {
    type Err = SamplerError;

    /// Parse a type name (case-insensitive), e.g. "float32", "uint16", "byte".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "byte" | "uint8" | "int8" | "u8" => Ok(Self::Byte),
            "int16" | "i16" => Ok(Self::Int16),
            "int32" | "int64" | "int" | "i32" => Ok(Self::Int32),
            "uint16" | "u16" => Ok(Self::UInt16),
            "uint32" | "u32" => Ok(Self::UInt32),
            "float32" | "f32" => Ok(Self::Float32),
            "float64" | "float" | "f64" => Ok(Self::Float64),
            "bool" => Ok(Self::Bool),
            other => Err(SamplerError::invalid_grid(format!(
                "unknown data type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Byte => "byte",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// A Rust type that can be stored as grid cells.
pub trait CellType: Copy + Send + Sync {
    const DATA_TYPE: DataType;

    fn to_f64(self) -> f64;
}

macro_rules! numeric_cell_type {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl CellType for $ty {
                const DATA_TYPE: DataType = DataType::$variant;

                #[inline]
                fn to_f64(self) -> f64 {
                    self.as_()
                }
            }
        )+
    };
}

numeric_cell_type! {
    u8 => Byte,
    i16 => Int16,
    i32 => Int32,
    u16 => UInt16,
    u32 => UInt32,
    f32 => Float32,
    f64 => Float64,
}

impl CellType for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

/// Policy used to reduce a sampled window to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    /// Value of the located cell.
    #[default]
    Nearest,
    /// Degree-1 spline through a 5x5 window.
    LinearSpline,
    /// Degree-3 spline through a 9x9 window.
    CubicSpline,
    /// Arithmetic mean of the window.
    Average,
    /// Caller-supplied reducer over the window.
    Custom,
}

impl InterpolationMode {
    /// Window radius required by the spline modes and nearest.
    ///
    /// `None` for average and custom, whose radius is chosen by the caller.
    pub fn required_radius(&self) -> Option<usize> {
        match self {
            Self::Nearest => Some(0),
            Self::LinearSpline => Some(2),
            Self::CubicSpline => Some(4),
            Self::Average | Self::Custom => None,
        }
    }

    /// Whether the sub-pixel offset affects the result.
    pub fn uses_offset(&self) -> bool {
        matches!(self, Self::LinearSpline | Self::CubicSpline)
    }
}

impl FromStr for InterpolationMode {
    type Err = SamplerError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "near" | "nearest" => Ok(Self::Nearest),
            "linear-spline" | "linear" | "bilinear" => Ok(Self::LinearSpline),
            "cubic-spline" | "cubic" | "bicubic" => Ok(Self::CubicSpline),
            "average" | "mean" => Ok(Self::Average),
            "func" | "custom" => Ok(Self::Custom),
            _ => Err(SamplerError::unsupported_mode(s)),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::LinearSpline => write!(f, "linear-spline"),
            Self::CubicSpline => write!(f, "cubic-spline"),
            Self::Average => write!(f, "average"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Which gradient quantity to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientMode {
    /// Magnitude `sqrt(ns² + ew²)`.
    #[default]
    Total,
    /// North-facing component (negative when facing south).
    NorthSouth,
    /// East-facing component (negative when facing west).
    EastWest,
    /// Direction `atan2(ns, ew)` in radians.
    Direction,
}

impl GradientMode {
    pub(crate) fn needs_north_south(&self) -> bool {
        !matches!(self, Self::EastWest)
    }

    pub(crate) fn needs_east_west(&self) -> bool {
        !matches!(self, Self::NorthSouth)
    }
}

impl FromStr for GradientMode {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "total" | "slope" => Ok(Self::Total),
            "north-south" | "ns" => Ok(Self::NorthSouth),
            "east-west" | "ew" => Ok(Self::EastWest),
            "dir" | "direction" => Ok(Self::Direction),
            _ => Err(SamplerError::unsupported_mode(s)),
        }
    }
}

impl fmt::Display for GradientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "total"),
            Self::NorthSouth => write!(f, "north-south"),
            Self::EastWest => write!(f, "east-west"),
            Self::Direction => write!(f, "direction"),
        }
    }
}

/// Scaling applied to cell sizes before differencing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitFactor {
    /// Same factor on both axes.
    Scalar(f64),
    /// Separate factors for the x (east-west) and y (north-south) axes.
    PerAxis { x: f64, y: f64 },
    /// Meters per degree at the grid's latitude midpoint, for grids stored
    /// in geographic degrees.
    DegreesToMeters,
}

impl Default for UnitFactor {
    fn default() -> Self {
        Self::Scalar(1.0)
    }
}

impl FromStr for UnitFactor {
    type Err = SamplerError;

    /// Parse "latlonToM", a single number, or an "x,y" pair.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("latlontom")
            || trimmed.eq_ignore_ascii_case("degrees-to-meters")
        {
            return Ok(Self::DegreesToMeters);
        }

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| SamplerError::unsupported_mode(format!("unit factor '{}'", s)))
        };

        match trimmed.split_once(',') {
            Some((x, y)) => Ok(Self::PerAxis {
                x: parse(x)?,
                y: parse(y)?,
            }),
            None => Ok(Self::Scalar(parse(trimmed)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_mode_from_str() {
        assert_eq!(
            "near".parse::<InterpolationMode>().unwrap(),
            InterpolationMode::Nearest
        );
        assert_eq!(
            "Linear-Spline".parse::<InterpolationMode>().unwrap(),
            InterpolationMode::LinearSpline
        );
        assert_eq!(
            "cubic-spline".parse::<InterpolationMode>().unwrap(),
            InterpolationMode::CubicSpline
        );
        assert_eq!(
            "func".parse::<InterpolationMode>().unwrap(),
            InterpolationMode::Custom
        );
        assert!(matches!(
            "sinc".parse::<InterpolationMode>(),
            Err(SamplerError::UnsupportedMode(_))
        ));
    }

    #[test]
    fn test_required_radius() {
        assert_eq!(InterpolationMode::Nearest.required_radius(), Some(0));
        assert_eq!(InterpolationMode::LinearSpline.required_radius(), Some(2));
        assert_eq!(InterpolationMode::CubicSpline.required_radius(), Some(4));
        assert_eq!(InterpolationMode::Average.required_radius(), None);
        assert_eq!(InterpolationMode::Custom.required_radius(), None);
    }

    #[test]
    fn test_gradient_mode_aliases() {
        assert_eq!("slope".parse::<GradientMode>().unwrap(), GradientMode::Total);
        assert_eq!("ns".parse::<GradientMode>().unwrap(), GradientMode::NorthSouth);
        assert_eq!("ew".parse::<GradientMode>().unwrap(), GradientMode::EastWest);
        assert_eq!("dir".parse::<GradientMode>().unwrap(), GradientMode::Direction);
        assert!("aspect".parse::<GradientMode>().is_err());
    }

    #[test]
    fn test_unit_factor_parse() {
        assert_eq!("2.5".parse::<UnitFactor>().unwrap(), UnitFactor::Scalar(2.5));
        assert_eq!(
            "1, 3".parse::<UnitFactor>().unwrap(),
            UnitFactor::PerAxis { x: 1.0, y: 3.0 }
        );
        assert_eq!(
            "latlonToM".parse::<UnitFactor>().unwrap(),
            UnitFactor::DegreesToMeters
        );
        assert!("meters".parse::<UnitFactor>().is_err());
    }

    #[test]
    fn test_data_type_resolution() {
        assert_eq!(<u8 as CellType>::DATA_TYPE, DataType::Byte);
        assert_eq!(<f32 as CellType>::DATA_TYPE, DataType::Float32);
        assert_eq!(<bool as CellType>::DATA_TYPE, DataType::Bool);
        assert_eq!(true.to_f64(), 1.0);
        assert_eq!(65_535u16.to_f64(), 65_535.0);
        assert_eq!("UInt16".parse::<DataType>().unwrap(), DataType::UInt16);
        assert_eq!("int64".parse::<DataType>().unwrap(), DataType::Int32);
        assert!("complex64".parse::<DataType>().is_err());
    }
}
