use crate::core::area::AreaEngine;
use crate::domain::model::{AreaUnit, BoundaryPath, FarmProfile, LoadedProfile, ProfileId};
use crate::utils::error::Result;
use crate::utils::validation::{validate_boundary_len, validate_farm_name};
use chrono::Utc;

/// In-memory saved farms, enumerated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FarmProfileStore {
    profiles: Vec<FarmProfile>,
}

impl FarmProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 儲存新的農場檔案，面積於此時計算並固定
    pub fn save(
        &mut self,
        name: &str,
        description: Option<&str>,
        boundary: &BoundaryPath,
        unit: AreaUnit,
    ) -> Result<FarmProfile> {
        if let Err(e) = validate_farm_name(name).and_then(|_| validate_boundary_len(boundary.len())) {
            tracing::warn!("Rejected farm save: {}", e);
            return Err(e);
        }

        let profile = FarmProfile {
            id: ProfileId::new(),
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            boundary: boundary.clone(),
            area: AreaEngine::compute_area(boundary, unit),
            unit,
            created_at: Utc::now(),
        };

        tracing::info!(
            "💾 Saved farm '{}' ({:.2} {}, {} points)",
            profile.name,
            profile.area,
            profile.unit,
            profile.boundary.len()
        );

        self.profiles.push(profile.clone());
        Ok(profile)
    }

    /// 刪除指定檔案；找不到時不視為錯誤
    pub fn delete(&mut self, id: &ProfileId) {
        let before = self.profiles.len();
        self.profiles.retain(|p| &p.id != id);

        if self.profiles.len() < before {
            tracing::info!("🗑️ Deleted farm profile {}", id);
        } else {
            tracing::debug!("Delete ignored, no farm profile {}", id);
        }
    }

    /// Snapshot of all profiles in insertion order.
    pub fn list(&self) -> Vec<FarmProfile> {
        self.profiles.clone()
    }

    pub fn get(&self, id: &ProfileId) -> Option<&FarmProfile> {
        self.profiles.iter().find(|p| &p.id == id)
    }

    /// Copies a profile out for a new drawing session.
    pub fn load(&self, id: &ProfileId) -> Option<LoadedProfile> {
        let loaded = self.get(id).map(|p| LoadedProfile {
            boundary: p.boundary.clone(),
            unit: p.unit,
            name: p.name.clone(),
            description: p.description.clone(),
        });

        if loaded.is_none() {
            tracing::debug!("Load ignored, no farm profile {}", id);
        }
        loaded
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
