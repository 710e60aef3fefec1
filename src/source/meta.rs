//! Column-oriented per-paper metadata and its CSV rendering.

use std::path::Path;

use crate::error::SourceError;

/// Default file name for the metadata side channel.
pub const META_INFO_FILE: &str = "meta_info.csv";

/// Metadata keyed by column, one value per fetched paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaInfo {
    columns: Vec<(String, Vec<String>)>,
}

impl MetaInfo {
    /// Create with the given column keys, in output order.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: keys.into_iter().map(|k| (k.into(), Vec::new())).collect(),
        }
    }

    /// Append one paper's values. Missing keys get an empty cell.
    pub fn push_row(&mut self, values: &[(&str, &str)]) {
        for (key, column) in &mut self.columns {
            let value = values
                .iter()
                .find(|(k, _)| *k == key.as_str())
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            column.push(value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn column(&self, key: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Number of papers recorded.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write as CSV: an index column with an empty header, then one column
    /// per key.
    pub fn write_csv(&self, path: &Path) -> Result<(), SourceError> {
        let writer = csv::Writer::from_path(path)?;
        self.write_to(writer)?;
        tracing::info!(path = %path.display(), rows = self.len(), "Wrote metadata CSV");
        Ok(())
    }

    /// Render the CSV into a string.
    pub fn to_csv_string(&self) -> Result<String, SourceError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_rows(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| SourceError::Metadata(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| SourceError::Metadata(e.to_string()))
    }

    fn write_to<W: std::io::Write>(&self, mut writer: csv::Writer<W>) -> Result<(), SourceError> {
        self.write_rows(&mut writer)?;
        writer
            .flush()
            .map_err(|e| SourceError::Metadata(e.to_string()))
    }

    fn write_rows<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<(), SourceError> {
        let mut header = vec![String::new()];
        header.extend(self.keys().map(str::to_string));
        writer.write_record(&header)?;

        for i in 0..self.len() {
            let mut row = vec![i.to_string()];
            row.extend(self.columns.iter().map(|(_, v)| v[i].clone()));
            writer.write_record(&row)?;
        }
        Ok(())
    }
}
