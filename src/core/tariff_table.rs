//! Tariff schedule loading and normalization.
//!
//! Every tabular source is read into a [`RawTable`], the tables are concatenated
//! (union of headers in first-appearance order), and the code and duty columns are
//! detected once over the combined header set. The result is an immutable
//! [`TariffTable`] with a first-occurrence index for exact-match lookups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::model::{NamedRate, TariffRecord};
use crate::domain::ports::{SourceFile, TariffSource};
use crate::utils::error::{DutyError, Result};

/// How a column is recognized from its header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStrategy {
    Exact(&'static str),
    Contains(&'static str),
}

impl ColumnStrategy {
    fn matches(&self, column: &str) -> bool {
        match self {
            ColumnStrategy::Exact(name) => column == *name,
            ColumnStrategy::Contains(fragment) => column.contains(fragment),
        }
    }

    /// First column (by column order) this strategy accepts.
    fn find<'a>(&self, columns: &'a [String]) -> Option<&'a String> {
        columns.iter().find(|c| self.matches(c))
    }
}

/// Code column candidates, in priority order.
pub const CODE_COLUMN_STRATEGIES: &[ColumnStrategy] = &[
    ColumnStrategy::Exact("HTS_Code"),
    ColumnStrategy::Exact("HTS Number"),
];

/// Duty column candidates, in priority order.
pub const DUTY_COLUMN_STRATEGIES: &[ColumnStrategy] = &[
    ColumnStrategy::Exact("Duty"),
    ColumnStrategy::Contains("Rate"),
];

const RATE_COLUMN_FRAGMENT: &str = "Rate";

/// Resolved column roles for the combined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub code_column: String,
    pub duty_column: String,
    pub extra_rate_columns: Vec<String>,
}

impl TableSchema {
    /// Probe `columns` with the ordered strategy lists.
    pub fn detect(columns: &[String]) -> Result<Self> {
        let code_column = CODE_COLUMN_STRATEGIES
            .iter()
            .find_map(|s| s.find(columns))
            .cloned()
            .ok_or_else(|| {
                DutyError::config("Tariff data must contain an 'HTS_Code' or 'HTS Number' column.")
            })?;

        let duty_column = DUTY_COLUMN_STRATEGIES
            .iter()
            .find_map(|s| s.find(columns))
            .cloned()
            .ok_or_else(|| DutyError::config("Tariff data must contain a 'Duty' or a 'Rate' column."))?;

        let extra_rate_columns = columns
            .iter()
            .filter(|c| c.contains(RATE_COLUMN_FRAGMENT) && **c != duty_column && **c != code_column)
            .cloned()
            .collect();

        Ok(Self {
            code_column,
            duty_column,
            extra_rate_columns,
        })
    }
}

/// One source file's header and rows, before schema detection.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_reader<R: std::io::Read>(name: impl Into<String>, reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(normalize_header_name)
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }

    pub fn from_source<S: TariffSource>(source: &S, file: &SourceFile) -> Result<Self> {
        let data = source.read_source(file)?;
        Self::from_reader(file.name.clone(), data.as_slice(), file.delimiter)
    }

    fn value<'a>(&'a self, row: &'a [String], column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        row.get(idx).map(String::as_str)
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').to_string()
}

/// Load statistics for the `info` command and logs.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub sources: Vec<String>,
    pub rows: usize,
    pub distinct_codes: usize,
    pub schema: TableSchema,
    pub loaded_at: DateTime<Utc>,
}

/// Immutable, queryable tariff schedule.
#[derive(Debug, Clone)]
pub struct TariffTable {
    schema: TableSchema,
    records: Vec<TariffRecord>,
    index: HashMap<String, usize>,
    sources: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl TariffTable {
    /// Read every tabular file the source lists and merge them.
    pub fn load<S: TariffSource>(source: &S) -> Result<Self> {
        let files = source.list_sources()?;
        if files.is_empty() {
            return Err(DutyError::config(format!(
                "No tabular files found in directory: {}",
                source.describe()
            )));
        }

        let mut tables = Vec::with_capacity(files.len());
        for file in &files {
            let table = RawTable::from_source(source, file)?;
            tracing::debug!("Read {} rows from {}", table.rows.len(), table.name);
            tables.push(table);
        }

        let table = Self::from_raw_tables(tables)?;
        tracing::info!(
            "📂 Loaded {} tariff records from {} file(s) in {} (code column '{}', duty column '{}')",
            table.len(),
            table.sources.len(),
            source.describe(),
            table.schema.code_column,
            table.schema.duty_column
        );
        Ok(table)
    }

    /// Concatenate raw tables and detect the schema over the combined columns.
    pub fn from_raw_tables(tables: Vec<RawTable>) -> Result<Self> {
        if tables.is_empty() {
            return Err(DutyError::config("No tabular sources to load."));
        }

        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for header in &table.headers {
                if !columns.contains(header) {
                    columns.push(header.clone());
                }
            }
        }

        let schema = TableSchema::detect(&columns)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for table in &tables {
            for row in &table.rows {
                let code = match table.value(row, &schema.code_column) {
                    Some(code) if !code.is_empty() => code.to_string(),
                    _ => {
                        skipped += 1;
                        continue;
                    }
                };

                let rate_expression = table
                    .value(row, &schema.duty_column)
                    .unwrap_or_default()
                    .to_string();

                let extra_rates = schema
                    .extra_rate_columns
                    .iter()
                    .filter_map(|column| {
                        table.value(row, column).map(|expression| NamedRate {
                            column: column.clone(),
                            expression: expression.to_string(),
                        })
                    })
                    .collect();

                records.push(TariffRecord {
                    code,
                    rate_expression,
                    extra_rates,
                    source: table.name.clone(),
                });
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} rows without an HTS code", skipped);
        }

        let sources = tables.into_iter().map(|t| t.name).collect();
        Ok(Self::build(schema, records, sources))
    }

    /// Build a table from already-normalized records.
    pub fn from_records(records: Vec<TariffRecord>) -> Self {
        let schema = TableSchema {
            code_column: "HTS_Code".to_string(),
            duty_column: "Duty".to_string(),
            extra_rate_columns: Vec::new(),
        };
        let records = records.into_iter().filter(|r| !r.code.is_empty()).collect();
        Self::build(schema, records, Vec::new())
    }

    fn build(schema: TableSchema, records: Vec<TariffRecord>, sources: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            // 重複代碼保留第一筆
            index.entry(record.code.clone()).or_insert(pos);
        }

        Self {
            schema,
            records,
            index,
            sources,
            loaded_at: Utc::now(),
        }
    }

    /// Exact-match lookup; the first loaded record wins for duplicate codes.
    pub fn lookup(&self, code: &str) -> Result<&TariffRecord> {
        self.index
            .get(code)
            .map(|&pos| &self.records[pos])
            .ok_or_else(|| DutyError::not_found(code))
    }

    /// Every record carrying `code`, in load order.
    pub fn lookup_all<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a TariffRecord> + 'a {
        self.records.iter().filter(move |r| r.code == code)
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn records(&self) -> &[TariffRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            sources: self.sources.clone(),
            rows: self.records.len(),
            distinct_codes: self.index.len(),
            schema: self.schema.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, content: &str) -> RawTable {
        RawTable::from_reader(name, content.as_bytes(), b',').unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_prefers_hts_code_over_hts_number() {
        let schema = TableSchema::detect(&columns(&["HTS Number", "HTS_Code", "Duty"])).unwrap();
        assert_eq!(schema.code_column, "HTS_Code");
        assert_eq!(schema.duty_column, "Duty");
    }

    #[test]
    fn test_detect_falls_back_to_first_rate_column() {
        let schema = TableSchema::detect(&columns(&[
            "HTS Number",
            "Description",
            "General Rate of Duty",
            "Special Rate of Duty",
            "Column 2 Rate of Duty",
        ]))
        .unwrap();
        assert_eq!(schema.code_column, "HTS Number");
        assert_eq!(schema.duty_column, "General Rate of Duty");
        assert_eq!(
            schema.extra_rate_columns,
            columns(&["Special Rate of Duty", "Column 2 Rate of Duty"])
        );
    }

    #[test]
    fn test_detect_rate_match_is_case_sensitive() {
        let err = TableSchema::detect(&columns(&["HTS_Code", "rate", "duty"])).unwrap_err();
        assert!(matches!(err, DutyError::ConfigError { .. }));
    }

    #[test]
    fn test_detect_missing_code_column() {
        let err = TableSchema::detect(&columns(&["hts_code", "Duty"])).unwrap_err();
        assert!(err.to_string().contains("HTS_Code"));
    }

    #[test]
    fn test_duty_column_beats_rate_columns() {
        let schema = TableSchema::detect(&columns(&["HTS_Code", "General Rate", "Duty"])).unwrap();
        assert_eq!(schema.duty_column, "Duty");
        assert_eq!(schema.extra_rate_columns, columns(&["General Rate"]));
    }

    #[test]
    fn test_detection_runs_over_combined_columns() {
        // Neither file alone has both columns.
        let a = raw("a.csv", "HTS_Code,Description\n0101,Horses\n");
        let b = raw("b.csv", "HTS_Code,Duty\n0102,5%\n");
        let table = TariffTable::from_raw_tables(vec![a, b]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("0101").unwrap().rate_expression, "");
        assert_eq!(table.lookup("0102").unwrap().rate_expression, "5%");
    }

    #[test]
    fn test_duplicates_preserved_first_wins() {
        let a = raw("a.csv", "HTS_Code,Duty\n0101.30.00.00,2%\n");
        let b = raw("b.csv", "HTS_Code,Duty\n0101.30.00.00,9%\n");
        let table = TariffTable::from_raw_tables(vec![a, b]).unwrap();

        assert_eq!(table.len(), 2);
        let record = table.lookup("0101.30.00.00").unwrap();
        assert_eq!(record.rate_expression, "2%");
        assert_eq!(record.source, "a.csv");
        assert_eq!(table.lookup_all("0101.30.00.00").count(), 2);
        assert_eq!(table.summary().distinct_codes, 1);
    }

    #[test]
    fn test_rows_without_code_are_skipped() {
        let a = raw("a.csv", "HTS_Code,Duty\n,5%\n0101,free\n0102\n");
        let table = TariffTable::from_raw_tables(vec![a]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("0102").unwrap().rate_expression, "");
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let table = TariffTable::from_records(vec![TariffRecord::new("0101.30.00.00", "2%")]);
        assert!(table.lookup("0101.30.00.00").is_ok());
        assert!(matches!(
            table.lookup("0101.30.00.000"),
            Err(DutyError::NotFoundError { .. })
        ));
        assert!(table.lookup("0101.30.00.00 ").is_err());
    }

    #[test]
    fn test_bom_is_stripped_from_headers() {
        let a = raw("bom.csv", "\u{feff}HTS_Code,Duty\n0101,2%\n");
        let table = TariffTable::from_raw_tables(vec![a]).unwrap();
        assert_eq!(table.schema().code_column, "HTS_Code");
    }

    #[test]
    fn test_extra_rates_are_attached() {
        let a = raw(
            "hts.csv",
            "HTS Number,General Rate of Duty,Special Rate of Duty\n0101.30.00.00,2%,free\n",
        );
        let table = TariffTable::from_raw_tables(vec![a]).unwrap();
        let record = table.lookup("0101.30.00.00").unwrap();
        assert_eq!(record.rate_expression, "2%");
        assert_eq!(record.extra_rates.len(), 1);
        assert_eq!(record.extra_rates[0].column, "Special Rate of Duty");
        assert_eq!(record.extra_rates[0].expression, "free");
    }

    #[test]
    fn test_empty_source_list_is_config_error() {
        let err = TariffTable::from_raw_tables(Vec::new()).unwrap_err();
        assert!(matches!(err, DutyError::ConfigError { .. }));
    }
}
