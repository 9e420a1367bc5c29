use crate::utils::error::Result;

/// Output rendering selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A tabular file discovered by a [`TariffSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub delimiter: u8,
}

/// Where tariff schedules come from. Implementations list files in a stable order.
pub trait TariffSource {
    fn list_sources(&self) -> Result<Vec<SourceFile>>;
    fn read_source(&self, source: &SourceFile) -> Result<Vec<u8>>;
    fn describe(&self) -> String;
}

pub trait ConfigProvider {
    fn data_dir(&self) -> &str;
    fn extensions(&self) -> &[String];
    fn output_format(&self) -> OutputFormat;
}
