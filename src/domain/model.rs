use crate::utils::error::FarmError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 計算面積所需的最少邊界點數
pub const MIN_BOUNDARY_POINTS: usize = 3;

/// 地理座標（十進位度數）。超出經緯度範圍的數值照樣接受。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl FromStr for Coordinate {
    type Err = FarmError;

    /// 解析 `lat,lng` 形式的字串
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| FarmError::validation(format!("expected 'lat,lng', got '{}'", s)))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| FarmError::validation(format!("invalid coordinate '{}': {}", s, e)))
        };

        Ok(Coordinate::new(parse(lat)?, parse(lng)?))
    }
}

/// Ordered boundary points. Order defines the winding; duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryPath(Vec<Coordinate>);

impl BoundaryPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, point: Coordinate) {
        self.0.push(point);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 是否已有足夠的點可計算面積
    pub fn is_closed_area(&self) -> bool {
        self.0.len() >= MIN_BOUNDARY_POINTS
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn points_mut(&mut self) -> &mut Vec<Coordinate> {
        &mut self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.0.iter()
    }

    /// 解析 `lat,lng;lat,lng;...` 形式的點列表
    pub fn parse_points(s: &str) -> Result<Self, FarmError> {
        s.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Coordinate::from_str)
            .collect()
    }
}

impl From<Vec<Coordinate>> for BoundaryPath {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

impl From<Vec<(f64, f64)>> for BoundaryPath {
    fn from(points: Vec<(f64, f64)>) -> Self {
        Self(
            points
                .into_iter()
                .map(|(lat, lng)| Coordinate::new(lat, lng))
                .collect(),
        )
    }
}

impl FromIterator<Coordinate> for BoundaryPath {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BoundaryPath {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AreaUnit {
    #[default]
    #[serde(rename = "acres")]
    Acres,
    #[serde(rename = "hectares")]
    Hectares,
    #[serde(rename = "sqm", alias = "square-meters", alias = "sqmeters")]
    SquareMeters,
}

impl AreaUnit {
    pub const ALL: [AreaUnit; 3] = [AreaUnit::Acres, AreaUnit::Hectares, AreaUnit::SquareMeters];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaUnit::Acres => "acres",
            AreaUnit::Hectares => "hectares",
            AreaUnit::SquareMeters => "sqm",
        }
    }

    /// 每單位所含的平方公尺數
    pub fn square_meters_per_unit(&self) -> f64 {
        match self {
            AreaUnit::Acres => 4047.0,
            AreaUnit::Hectares => 10000.0,
            AreaUnit::SquareMeters => 1.0,
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaUnit {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acres" | "acre" | "ac" => Ok(AreaUnit::Acres),
            "hectares" | "hectare" | "ha" => Ok(AreaUnit::Hectares),
            "sqm" | "square-meters" | "sqmeters" | "m2" => Ok(AreaUnit::SquareMeters),
            other => Err(FarmError::validation(format!(
                "unknown area unit '{}', expected one of: acres, hectares, sqm",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProfileId {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(ProfileId)
            .map_err(|e| FarmError::validation(format!("invalid profile id '{}': {}", s, e)))
    }
}

/// A saved farm. `area` is fixed at save time for `boundary` in `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmProfile {
    pub id: ProfileId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "coordinates")]
    pub boundary: BoundaryPath,
    pub area: f64,
    pub unit: AreaUnit,
    pub created_at: DateTime<Utc>,
}

/// 從已存檔案載入到繪圖工作階段的資料
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProfile {
    pub boundary: BoundaryPath,
    pub unit: AreaUnit,
    pub name: String,
    pub description: Option<String>,
}
