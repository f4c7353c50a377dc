use crate::Matrix;
use crate::error::DataError;
use std::collections::{HashMap, HashSet};

/// Row-oriented table of raw cells with named columns.
///
/// Cells keep their original text so that output reproduces the input
/// verbatim; numeric interpretation happens per column on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DataError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DataError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// Parses CSV content with a mandatory header row.
    ///
    /// Repeated header names are renamed `name.1`, `name.2`, ... in order of
    /// appearance so every column stays addressable. Cell values are trimmed;
    /// header names are kept as written.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(DataError::MissingHeader);
        }
        let columns = dedupe_headers(&headers);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(columns, rows)
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, DataError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|e| DataError::Output(e.to_string()))
    }

    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// True when every cell of the column holds a finite number.
    /// A column of an empty dataset is vacuously numeric.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        index < self.columns.len()
            && self.rows.iter().all(|row| parse_numeric(&row[index]).is_some())
    }

    /// Extracts the named columns, in the given order, as a dense matrix.
    pub fn numeric_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<Matrix, DataError> {
        let indices = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column_index(name)
                    .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut matrix = Matrix::zeros((self.n_samples(), indices.len()));
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &col) in indices.iter().enumerate() {
                let cell = &row[col];
                matrix[[i, j]] = parse_numeric(cell).ok_or_else(|| DataError::NonNumeric {
                    column: self.columns[col].clone(),
                    row: i,
                    value: cell.clone(),
                })?;
            }
        }

        Ok(matrix)
    }

    /// Sets `name` to `values`, replacing an existing column in place or
    /// appending a new last column.
    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Result<Self, DataError> {
        if values.len() != self.n_samples() {
            return Err(DataError::RaggedRow {
                row: values.len().min(self.n_samples()),
                expected: self.n_samples(),
                actual: values.len(),
            });
        }

        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }

        Ok(self)
    }
}

fn parse_numeric(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn dedupe_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(headers.len());

    for name in headers.iter() {
        let mut candidate = name.to_string();
        while used.contains(&candidate) {
            let count = counts.entry(name).or_insert(0);
            *count += 1;
            candidate = format!("{}.{}", name, count);
        }
        used.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}
