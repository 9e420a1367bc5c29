use crate::domain::ports::{ConfigProvider, SourceFile, TariffSource};
use crate::utils::error::{DutyError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Tariff files living in a single local directory (not recursive).
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    base_path: PathBuf,
    extensions: Vec<String>,
}

impl LocalDirectory {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            extensions: vec!["csv".to_string()],
        }
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.data_dir()).with_extensions(config.extensions())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn delimiter_for(extension: &str) -> u8 {
        if extension == "tsv" {
            b'\t'
        } else {
            b','
        }
    }
}

impl TariffSource for LocalDirectory {
    fn list_sources(&self) -> Result<Vec<SourceFile>> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            DutyError::config(format!(
                "Cannot read tariff directory '{}': {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let extension = Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase());

            match extension {
                Some(ext) if self.extensions.contains(&ext) => sources.push(SourceFile {
                    delimiter: Self::delimiter_for(&ext),
                    name,
                }),
                _ => tracing::debug!("Skipping non-tabular file: {}", name),
            }
        }

        // 目錄列舉順序不固定，依檔名排序
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sources)
    }

    fn read_source(&self, source: &SourceFile) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(&source.name);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    fn describe(&self) -> String {
        self.base_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_only_configured_extensions_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "HTS_Code,Duty\n").unwrap();
        fs::write(dir.path().join("a.CSV"), "HTS_Code,Duty\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(dir.path().join("c.tsv"), "HTS_Code\tDuty\n").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let source = LocalDirectory::new(dir.path());
        let names: Vec<String> = source
            .list_sources()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);

        let source = LocalDirectory::new(dir.path())
            .with_extensions(&["csv".to_string(), "tsv".to_string()]);
        let sources = source.list_sources().unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[2].name, "c.tsv");
        assert_eq!(sources[2].delimiter, b'\t');
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let dir = TempDir::new().unwrap();
        let source = LocalDirectory::new(dir.path().join("does-not-exist"));
        let err = source.list_sources().unwrap_err();
        assert!(matches!(err, DutyError::ConfigError { .. }));
    }

    #[test]
    fn test_read_source() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rates.csv"), "HTS_Code,Duty\n0101,2%\n").unwrap();
        let source = LocalDirectory::new(dir.path());
        let files = source.list_sources().unwrap();
        let data = source.read_source(&files[0]).unwrap();
        assert_eq!(data, b"HTS_Code,Duty\n0101,2%\n");
    }
}
