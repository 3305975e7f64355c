use crate::core::area::AreaEngine;
use crate::core::export::{ExportDocument, FarmDataExport};
use crate::core::store::FarmProfileStore;
use crate::domain::model::{AreaUnit, BoundaryPath, Coordinate, FarmProfile, ProfileId};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing,
}

/// 目前的繪圖狀態：邊界、單位與名稱。面積一律由邊界即時計算。
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: DrawingState,
    path: BoundaryPath,
    unit: AreaUnit,
    name: String,
    description: Option<String>,
}

impl DrawingSession {
    pub fn new(unit: AreaUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == DrawingState::Drawing
    }

    pub fn path(&self) -> &BoundaryPath {
        &self.path
    }

    pub fn unit(&self) -> AreaUnit {
        self.unit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Idle → Drawing, starting from an empty path.
    pub fn start(&mut self) {
        self.path.clear();
        self.state = DrawingState::Drawing;
        tracing::debug!("Drawing started");
    }

    /// Appends a point while drawing and returns the live area.
    /// Points arriving while idle are ignored.
    pub fn add_point(&mut self, point: Coordinate) -> Option<f64> {
        if !self.is_drawing() {
            tracing::debug!("Ignoring point ({}, {}) while idle", point.lat, point.lng);
            return None;
        }

        self.path.push(point);
        let area = self.area();
        tracing::debug!(
            "Point {} added, live area {:.2} {}",
            self.path.len(),
            area,
            self.unit
        );
        Some(area)
    }

    /// Drawing → Idle, keeping the path.
    pub fn finish(&mut self) -> f64 {
        self.state = DrawingState::Idle;
        let area = self.area();
        tracing::debug!("Drawing finished with {} points", self.path.len());
        area
    }

    /// 清除邊界並回到 Idle
    pub fn clear(&mut self) {
        self.path.clear();
        self.state = DrawingState::Idle;
        tracing::debug!("Drawing cleared");
    }

    /// Changing the unit recomputes the displayed area from the same boundary.
    pub fn set_unit(&mut self, unit: AreaUnit) -> f64 {
        self.unit = unit;
        self.area()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn area(&self) -> f64 {
        AreaEngine::compute_area(&self.path, self.unit)
    }

    /// 存檔不會清除目前邊界，也不改變繪圖狀態
    pub fn save_to(&self, store: &mut FarmProfileStore) -> Result<FarmProfile> {
        store.save(
            &self.name,
            self.description.as_deref(),
            &self.path,
            self.unit,
        )
    }

    /// Seeds the session from a saved profile. Returns false if `id` is unknown.
    pub fn load_from(&mut self, store: &FarmProfileStore, id: &ProfileId) -> bool {
        match store.load(id) {
            Some(loaded) => {
                self.path = loaded.boundary;
                self.unit = loaded.unit;
                self.name = loaded.name;
                self.description = loaded.description;
                self.state = DrawingState::Idle;
                tracing::debug!("Loaded farm '{}' into drawing session", self.name);
                true
            }
            None => false,
        }
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::from_draft(&self.name, &self.path, self.unit)
    }

    pub fn export_all(&self, store: &FarmProfileStore) -> FarmDataExport {
        FarmDataExport::new(&self.name, &self.path, self.unit, store.list())
    }
}
