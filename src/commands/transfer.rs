use super::TableResponse;
use crate::error::{Result, ResultExt as _, ScourError};
use crate::frame::io::{self, ExportFormat};
use crate::store::DatasetStore;
use std::path::{Path, PathBuf};

/// A file received from the `file` field of an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A serialized dataset ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `POST /upload`: parses the file and makes it the current dataset.
///
/// A copy of the raw upload is kept in `upload_dir`; failing to write it is
/// logged and otherwise ignored.
pub fn upload(
    store: &DatasetStore,
    upload_dir: &Path,
    file: Option<UploadedFile>,
) -> Result<TableResponse> {
    let file = file
        .filter(|f| !f.filename.is_empty())
        .ok_or(ScourError::NoFileUploaded)?;
    io::FileFormat::from_filename(&file.filename)?;

    match save_upload(upload_dir, &file) {
        Ok(path) => tracing::debug!("Saved upload to {}", path.display()),
        Err(e) => tracing::warn!("Could not keep a copy of {}: {e}", file.filename),
    }

    let dataset = io::parse_upload(&file.filename, file.bytes)?;
    tracing::info!(
        "Loaded {} ({} rows, {} columns)",
        file.filename,
        dataset.height(),
        dataset.width()
    );

    store.set(dataset.clone())?;
    TableResponse::from_dataset(&dataset)
}

/// Writes the upload under its base name, creating `upload_dir` if needed.
pub fn save_upload(upload_dir: &Path, file: &UploadedFile) -> Result<PathBuf> {
    let name = Path::new(&file.filename)
        .file_name()
        .ok_or_else(|| ScourError::InvalidPayload(format!("Invalid filename: {}", file.filename)))?;

    std::fs::create_dir_all(upload_dir).with_context(|| {
        format!("Failed to create upload directory {}", upload_dir.display())
    })?;
    let path = upload_dir.join(name);
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// `GET /download?format=csv|xlsx`
pub fn download(store: &DatasetStore, format: Option<&str>) -> Result<Download> {
    let dataset = store.require()?;
    let format = ExportFormat::from_query(format);
    let bytes = match format {
        ExportFormat::Csv => io::to_csv_bytes(&dataset)?,
        ExportFormat::Xlsx => io::to_xlsx_bytes(&dataset)?,
    };

    tracing::info!("Prepared {} ({} bytes)", format.file_name(), bytes.len());
    Ok(Download {
        file_name: format.file_name(),
        content_type: format.content_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn csv_file(name: &str, text: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_owned(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_upload_requires_file() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = DatasetStore::new();

        let err = upload(&store, temp.path(), None).expect_err("no file");
        assert_eq!(err.to_string(), "No file uploaded");

        let err = upload(&store, temp.path(), Some(csv_file("", "a\n1\n"))).expect_err("no name");
        assert!(matches!(err, ScourError::NoFileUploaded));
        Ok(())
    }

    #[test]
    fn test_upload_rejects_unknown_extension() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = DatasetStore::new();
        let err = upload(&store, temp.path(), Some(csv_file("data.json", "{}"))).expect_err("json");
        assert!(matches!(err, ScourError::UnsupportedFormat(_)));
        assert!(store.get()?.is_none());
        Ok(())
    }

    #[test]
    fn test_upload_loads_dataset_and_keeps_copy() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let upload_dir = temp.path().join("uploads");
        let store = DatasetStore::new();

        let response = upload(&store, &upload_dir, Some(csv_file("Sales.CSV", "a,b\n1,\n1,2\n")))?;

        assert_eq!(response.stats.rows, 2);
        assert_eq!(response.stats.cols, 2);
        assert_eq!(response.stats.missing_values, 1);
        assert_eq!(response.stats.duplicates, 0);
        assert!(upload_dir.join("Sales.CSV").exists());
        assert!(store.get()?.is_some());
        Ok(())
    }

    #[test]
    fn test_save_upload_strips_directories() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = save_upload(temp.path(), &csv_file("../../escape.csv", "a\n"))?;
        assert_eq!(path, temp.path().join("escape.csv"));
        Ok(())
    }

    #[test]
    fn test_download_formats() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = DatasetStore::new();
        assert!(matches!(
            download(&store, None),
            Err(ScourError::NoDataLoaded)
        ));

        upload(&store, temp.path(), Some(csv_file("d.csv", "a,b\n1,x\n")))?;

        let csv = download(&store, Some("csv"))?;
        assert_eq!(csv.file_name, "cleaned_data.csv");
        assert_eq!(csv.content_type, "text/csv");
        assert_eq!(String::from_utf8(csv.bytes)?, "a,b\n1,x\n");

        let xlsx = download(&store, Some("xlsx"))?;
        assert_eq!(xlsx.file_name, "cleaned_data.xlsx");
        assert!(xlsx.bytes.starts_with(b"PK"), "xlsx is a zip archive");
        Ok(())
    }
}
