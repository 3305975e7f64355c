use crate::core::area::AreaEngine;
use crate::domain::model::{AreaUnit, BoundaryPath, FarmProfile};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_JSON_FILENAME: &str = "farm-data.json";
pub const BUNDLE_CSV_FILENAME: &str = "farms.csv";
pub const ARCHIVE_FILENAME: &str = "farm-data.zip";

/// 單一農場的匯出文件（下載用，無版本欄位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub name: String,
    pub area: f64,
    pub unit: AreaUnit,
    pub coordinates: BoundaryPath,
    pub export_date: String,
}

impl ExportDocument {
    pub fn from_profile(profile: &FarmProfile) -> Self {
        Self::build(&profile.name, profile.area, profile.unit, &profile.boundary)
    }

    /// Unsaved drafts are exported with their live area.
    pub fn from_draft(name: &str, boundary: &BoundaryPath, unit: AreaUnit) -> Self {
        let area = AreaEngine::compute_area(boundary, unit);
        Self::build(name, area, unit, boundary)
    }

    fn build(name: &str, area: f64, unit: AreaUnit, boundary: &BoundaryPath) -> Self {
        Self {
            name: name.to_string(),
            area,
            unit,
            coordinates: boundary.clone(),
            export_date: iso_timestamp(Utc::now()),
        }
    }

    /// 下載檔名：`<name>.json`，名稱空白時為 `farm-data.json`
    pub fn filename(&self) -> String {
        let stem = file_stem(&self.name);
        if stem.is_empty() {
            BUNDLE_JSON_FILENAME.to_string()
        } else {
            format!("{}.json", stem)
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentFarm {
    pub name: String,
    pub coordinates: BoundaryPath,
    pub area: f64,
    pub unit: AreaUnit,
}

/// The in-progress draft together with every saved profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmDataExport {
    pub current_farm: CurrentFarm,
    pub saved_farms: Vec<FarmProfile>,
}

impl FarmDataExport {
    pub fn new(
        name: &str,
        boundary: &BoundaryPath,
        unit: AreaUnit,
        saved_farms: Vec<FarmProfile>,
    ) -> Self {
        Self {
            current_farm: CurrentFarm {
                name: name.to_string(),
                coordinates: boundary.clone(),
                area: AreaEngine::compute_area(boundary, unit),
                unit,
            },
            saved_farms,
        }
    }

    /// 已存農場的 CSV 摘要
    pub fn saved_farms_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["id", "name", "area", "unit", "points", "created_at"])?;

        for farm in &self.saved_farms {
            writer.write_record([
                farm.id.to_string(),
                farm.name.clone(),
                format!("{:.2}", farm.area),
                farm.unit.to_string(),
                farm.boundary.len().to_string(),
                iso_timestamp(farm.created_at),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Farm names become a single path component: separators, drive colons and
/// control characters turn into `_`, and leading dots are dropped so `..`
/// cannot climb out of the output directory.
fn file_stem(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    replaced.trim_start_matches('.').trim().to_string()
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Writes export documents and archives through a `Storage` backend.
pub struct FarmExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> FarmExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write_document(&self, document: &ExportDocument) -> Result<String> {
        let filename = document.filename();
        let json = document.to_json_pretty()?;

        tracing::debug!("Writing export document ({} bytes) to {}", json.len(), filename);
        self.storage.write_file(&filename, json.as_bytes()).await?;

        tracing::info!("📁 Exported '{}' to {}", document.name, filename);
        Ok(filename)
    }

    /// 打包 JSON 與 CSV 成單一 ZIP 檔
    pub async fn write_archive(&self, bundle: &FarmDataExport) -> Result<String> {
        tracing::debug!(
            "Creating ZIP archive with {} saved farms",
            bundle.saved_farms.len()
        );

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(BUNDLE_JSON_FILENAME, FileOptions::default())?;
            let json_data = serde_json::to_string_pretty(bundle)?;
            zip.write_all(json_data.as_bytes())?;

            zip.start_file::<_, ()>(BUNDLE_CSV_FILENAME, FileOptions::default())?;
            zip.write_all(bundle.saved_farms_csv()?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP archive ({} bytes) to storage", zip_data.len());
        self.storage.write_file(ARCHIVE_FILENAME, &zip_data).await?;

        tracing::info!("📦 Exported {} saved farms to {}", bundle.saved_farms.len(), ARCHIVE_FILENAME);
        Ok(ARCHIVE_FILENAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::FarmProfileStore;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn square() -> BoundaryPath {
        BoundaryPath::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])
    }

    #[test]
    fn test_document_shape() {
        let doc = ExportDocument::from_draft("River Plot", &square(), AreaUnit::Hectares);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["name"], "River Plot");
        assert_eq!(json["unit"], "hectares");
        assert_eq!(json["coordinates"][1], serde_json::json!({"lat": 0.0, "lng": 1.0}));
        assert_eq!(json["area"].as_f64().unwrap(), doc.area);

        let export_date = json["exportDate"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(export_date).is_ok());
        assert!(export_date.ends_with('Z'));
    }

    #[test]
    fn test_profile_document_uses_stored_area() {
        let mut store = FarmProfileStore::new();
        let mut profile = store.save("Stored", None, &square(), AreaUnit::Acres).unwrap();
        profile.area = 12.0;

        let doc = ExportDocument::from_profile(&profile);
        assert_eq!(doc.area, 12.0);
        assert_eq!(doc.unit, AreaUnit::Acres);
    }

    #[test]
    fn test_document_filename() {
        let named = ExportDocument::from_draft("Hill", &square(), AreaUnit::Acres);
        assert_eq!(named.filename(), "Hill.json");

        let unnamed = ExportDocument::from_draft("  ", &square(), AreaUnit::Acres);
        assert_eq!(unnamed.filename(), "farm-data.json");
    }

    #[test]
    fn test_filename_is_single_path_component() {
        let cases = [
            ("../evil", "_evil.json"),
            ("/etc/passwd", "_etc_passwd.json"),
            ("north/south", "north_south.json"),
            ("..\\win", "_win.json"),
            ("C:\\fields", "C__fields.json"),
            ("..", "farm-data.json"),
            (".hidden", "hidden.json"),
        ];
        for (name, expected) in cases {
            let doc = ExportDocument::from_draft(name, &square(), AreaUnit::Acres);
            assert_eq!(doc.filename(), expected, "name {:?}", name);
        }
    }

    #[tokio::test]
    async fn test_traversal_name_stays_inside_storage_root() {
        use crate::config::cli::LocalStorage;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path().join("out");
        let exporter = FarmExporter::new(LocalStorage::new(root.to_string_lossy().into_owned()));

        for name in ["../evil", "/tmp/absolute-farm", "a/b/c"] {
            let doc = ExportDocument::from_draft(name, &square(), AreaUnit::Acres);
            let filename = exporter.write_document(&doc).await.unwrap();
            assert!(root.join(&filename).is_file(), "{} not in root", filename);
        }

        assert!(!temp_dir.path().join("evil.json").exists());
        let written: Vec<_> = std::fs::read_dir(&root).unwrap().collect();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|e| e.as_ref().unwrap().path().is_file()));
    }

    #[test]
    fn test_bundle_csv_summary() {
        let mut store = FarmProfileStore::new();
        store.save("East", None, &square(), AreaUnit::Hectares).unwrap();
        store.save("West", None, &square(), AreaUnit::SquareMeters).unwrap();

        let bundle = FarmDataExport::new("", &BoundaryPath::new(), AreaUnit::Acres, store.list());
        let csv = bundle.saved_farms_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,name,area,unit,points,created_at");
        assert!(lines[1].contains(",East,1239214.24,hectares,4,"));
        assert!(lines[2].contains(",West,"));
        assert_eq!(bundle.current_farm.area, 0.0);
    }

    #[tokio::test]
    async fn test_write_document_uses_name_as_filename() {
        let storage = MockStorage::new();
        let exporter = FarmExporter::new(storage.clone());
        let doc = ExportDocument::from_draft("Vineyard", &square(), AreaUnit::Acres);

        let filename = exporter.write_document(&doc).await.unwrap();
        assert_eq!(filename, "Vineyard.json");

        let bytes = storage.get_file("Vineyard.json").await.unwrap();
        let parsed: ExportDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, doc);
    }

    #[tokio::test]
    async fn test_write_archive_contents() {
        let storage = MockStorage::new();
        let exporter = FarmExporter::new(storage.clone());

        let mut store = FarmProfileStore::new();
        store.save("Archived", None, &square(), AreaUnit::Acres).unwrap();
        let bundle = FarmDataExport::new("Draft", &square(), AreaUnit::Acres, store.list());

        let output = exporter.write_archive(&bundle).await.unwrap();
        assert_eq!(output, ARCHIVE_FILENAME);

        let zip_bytes = storage.get_file(ARCHIVE_FILENAME).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec!["farm-data.json", "farms.csv"]);

        let json_content = {
            let mut file = archive.by_name(BUNDLE_JSON_FILENAME).unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        let value: serde_json::Value = serde_json::from_str(&json_content).unwrap();
        assert_eq!(value["currentFarm"]["name"], "Draft");
        assert_eq!(value["savedFarms"][0]["name"], "Archived");
        assert_eq!(value["savedFarms"][0]["coordinates"].as_array().unwrap().len(), 4);
    }
}
