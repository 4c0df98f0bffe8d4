//! Rectangular element tables.
//!
//! An [`ElementTable`] is a set of named, typed columns sharing one row index.
//! Rows are keyed by [`RowKey`]: a plain element id, or a parent id plus a
//! sequence number for categories such as tap changer steps.
//!
//! Missing double values are represented as `NaN`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{GridError, GridResult};
use crate::series::SeriesType;

/// Row identifier of an element table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
}

impl RowKey {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            num: None,
        }
    }

    pub fn composite(id: impl Into<String>, num: i64) -> Self {
        Self {
            id: id.into(),
            num: Some(num),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.num {
            Some(num) => write!(f, "{}[{}]", self.id, num),
            None => f.write_str(&self.id),
        }
    }
}

impl From<&str> for RowKey {
    fn from(id: &str) -> Self {
        RowKey::id(id)
    }
}

impl From<(&str, i64)> for RowKey {
    fn from((id, num): (&str, i64)) -> Self {
        RowKey::composite(id, num)
    }
}

/// Serde helpers keeping `NaN` cells through JSON, which has no NaN literal.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) }),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

/// Values of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum SeriesData {
    String(Vec<String>),
    Int(Vec<i64>),
    Boolean(Vec<bool>),
    Double(#[serde(with = "nan_as_null")] Vec<f64>),
}

impl SeriesData {
    /// An empty column of the given type.
    pub fn empty(series_type: SeriesType) -> Self {
        match series_type {
            SeriesType::String => SeriesData::String(Vec::new()),
            SeriesType::Int => SeriesData::Int(Vec::new()),
            SeriesType::Boolean => SeriesData::Boolean(Vec::new()),
            SeriesType::Double => SeriesData::Double(Vec::new()),
        }
    }

    /// A column of `len` missing values (empty string, 0, false, NaN).
    pub fn missing(series_type: SeriesType, len: usize) -> Self {
        match series_type {
            SeriesType::String => SeriesData::String(vec![String::new(); len]),
            SeriesType::Int => SeriesData::Int(vec![0; len]),
            SeriesType::Boolean => SeriesData::Boolean(vec![false; len]),
            SeriesType::Double => SeriesData::Double(vec![f64::NAN; len]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesData::String(v) => v.len(),
            SeriesData::Int(v) => v.len(),
            SeriesData::Boolean(v) => v.len(),
            SeriesData::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn series_type(&self) -> SeriesType {
        match self {
            SeriesData::String(_) => SeriesType::String,
            SeriesData::Int(_) => SeriesType::Int,
            SeriesData::Boolean(_) => SeriesType::Boolean,
            SeriesData::Double(_) => SeriesType::Double,
        }
    }

    pub fn get(&self, position: usize) -> Option<CellValue> {
        match self {
            SeriesData::String(v) => v.get(position).cloned().map(CellValue::String),
            SeriesData::Int(v) => v.get(position).copied().map(CellValue::Int),
            SeriesData::Boolean(v) => v.get(position).copied().map(CellValue::Boolean),
            SeriesData::Double(v) => v.get(position).copied().map(CellValue::Double),
        }
    }

    /// Overwrite one cell. The cell type must match the column type.
    pub fn set(&mut self, position: usize, value: CellValue) -> GridResult<()> {
        let len = self.len();
        if position >= len {
            return Err(GridError::Table(format!(
                "row position {} out of bounds for column of length {}",
                position, len
            )));
        }
        match (self, value) {
            (SeriesData::String(v), CellValue::String(x)) => v[position] = x,
            (SeriesData::Int(v), CellValue::Int(x)) => v[position] = x,
            (SeriesData::Boolean(v), CellValue::Boolean(x)) => v[position] = x,
            (SeriesData::Double(v), CellValue::Double(x)) => v[position] = x,
            (data, value) => {
                return Err(GridError::Table(format!(
                    "cannot store a {} value in a {} column",
                    value.series_type().as_str(),
                    data.series_type().as_str()
                )))
            }
        }
        Ok(())
    }

    fn push(&mut self, value: CellValue) -> GridResult<()> {
        match (self, value) {
            (SeriesData::String(v), CellValue::String(x)) => v.push(x),
            (SeriesData::Int(v), CellValue::Int(x)) => v.push(x),
            (SeriesData::Boolean(v), CellValue::Boolean(x)) => v.push(x),
            (SeriesData::Double(v), CellValue::Double(x)) => v.push(x),
            (data, value) => {
                return Err(GridError::Table(format!(
                    "cannot append a {} value to a {} column",
                    value.series_type().as_str(),
                    data.series_type().as_str()
                )))
            }
        }
        Ok(())
    }

    /// New column made of the cells at `positions`; `None` yields a missing value.
    fn gather(&self, positions: &[Option<usize>]) -> SeriesData {
        match self {
            SeriesData::String(v) => SeriesData::String(
                positions
                    .iter()
                    .map(|p| p.map(|i| v[i].clone()).unwrap_or_default())
                    .collect(),
            ),
            SeriesData::Int(v) => {
                SeriesData::Int(positions.iter().map(|p| p.map_or(0, |i| v[i])).collect())
            }
            SeriesData::Boolean(v) => SeriesData::Boolean(
                positions.iter().map(|p| p.map_or(false, |i| v[i])).collect(),
            ),
            SeriesData::Double(v) => SeriesData::Double(
                positions
                    .iter()
                    .map(|p| p.map_or(f64::NAN, |i| v[i]))
                    .collect(),
            ),
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Boolean(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl CellValue {
    pub fn series_type(&self) -> SeriesType {
        match self {
            CellValue::String(_) => SeriesType::String,
            CellValue::Int(_) => SeriesType::Int,
            CellValue::Boolean(_) => SeriesType::Boolean,
            CellValue::Double(_) => SeriesType::Double,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Parse `raw` as a value of the given column type.
    pub fn parse(series_type: SeriesType, raw: &str) -> GridResult<Self> {
        let raw = raw.trim();
        let invalid = || GridError::Table(format!("'{}' is not a valid {} value", raw, series_type.as_str()));
        match series_type {
            SeriesType::String => Ok(CellValue::String(raw.to_string())),
            SeriesType::Int => raw.parse().map(CellValue::Int).map_err(|_| invalid()),
            SeriesType::Double => {
                if raw.eq_ignore_ascii_case("nan") {
                    return Ok(CellValue::Double(f64::NAN));
                }
                raw.parse().map(CellValue::Double).map_err(|_| invalid())
            }
            SeriesType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(CellValue::Boolean(true)),
                "false" | "0" | "no" => Ok(CellValue::Boolean(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(v) => f.write_str(v),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Boolean(v) => write!(f, "{}", v),
            CellValue::Double(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: SeriesData,
}

/// Rows keyed by element id, columns named and typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementTable {
    index: Vec<RowKey>,
    columns: Vec<Series>,
}

impl ElementTable {
    pub fn new(index: Vec<RowKey>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Table indexed by plain element ids.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ids.into_iter().map(RowKey::id).collect())
    }

    /// Builder-style [`insert_column`](Self::insert_column).
    pub fn with_column(mut self, name: &str, data: SeriesData) -> GridResult<Self> {
        self.insert_column(name, data)?;
        Ok(self)
    }

    /// Append a column. Fails on a duplicate name or a length different from the index.
    pub fn insert_column(&mut self, name: &str, data: SeriesData) -> GridResult<()> {
        if self.has_column(name) {
            return Err(GridError::Table(format!("duplicate column '{}'", name)));
        }
        if data.len() != self.index.len() {
            return Err(GridError::Table(format!(
                "column '{}' has {} values but the table has {} rows",
                name,
                data.len(),
                self.index.len()
            )));
        }
        self.columns.push(Series {
            name: name.to_string(),
            data,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[RowKey] {
        &self.index
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|s| s.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|s| s.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Series> {
        self.columns.iter_mut().find(|s| s.name == name)
    }

    pub fn doubles(&self, name: &str) -> Option<&[f64]> {
        match self.column(name).map(|s| &s.data) {
            Some(SeriesData::Double(v)) => Some(v),
            _ => None,
        }
    }

    pub fn doubles_mut(&mut self, name: &str) -> Option<&mut [f64]> {
        match self.column_mut(name).map(|s| &mut s.data) {
            Some(SeriesData::Double(v)) => Some(v),
            _ => None,
        }
    }

    pub fn strings(&self, name: &str) -> Option<&[String]> {
        match self.column(name).map(|s| &s.data) {
            Some(SeriesData::String(v)) => Some(v),
            _ => None,
        }
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Series> {
        let position = self.columns.iter().position(|s| s.name == name)?;
        Some(self.columns.remove(position))
    }

    /// Position of a row in the index.
    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.index.iter().position(|k| k == key)
    }

    pub fn cell(&self, key: &RowKey, column: &str) -> Option<CellValue> {
        let position = self.position(key)?;
        self.column(column)?.data.get(position)
    }

    /// Shortcut for a double cell of a row with a plain id.
    pub fn double(&self, id: &str, column: &str) -> Option<f64> {
        self.cell(&RowKey::id(id), column).and_then(|v| v.as_f64())
    }

    /// Overwrite one cell.
    pub fn set_cell(&mut self, key: &RowKey, column: &str, value: CellValue) -> GridResult<()> {
        let position = self
            .position(key)
            .ok_or_else(|| GridError::Table(format!("row '{}' not found", key)))?;
        let series = self
            .column_mut(column)
            .ok_or_else(|| GridError::Table(format!("column '{}' not found", column)))?;
        series.data.set(position, value)
    }

    /// Append a row; `cells` must hold one value per column, in column order.
    pub fn push_row(&mut self, key: RowKey, cells: Vec<CellValue>) -> GridResult<()> {
        if self.position(&key).is_some() {
            return Err(GridError::Table(format!("duplicate row '{}'", key)));
        }
        if cells.len() != self.columns.len() {
            return Err(GridError::Table(format!(
                "row '{}' has {} cells but the table has {} columns",
                key,
                cells.len(),
                self.columns.len()
            )));
        }
        let mismatch = self
            .columns
            .iter()
            .zip(cells.iter())
            .find(|(series, cell)| series.data.series_type() != cell.series_type());
        if let Some((series, cell)) = mismatch {
            return Err(GridError::Table(format!(
                "row '{}': column '{}' expects {} but got {}",
                key,
                series.name,
                series.data.series_type().as_str(),
                cell.series_type().as_str()
            )));
        }
        for (series, cell) in self.columns.iter_mut().zip(cells) {
            series.data.push(cell)?;
        }
        self.index.push(key);
        Ok(())
    }

    /// New table with the same index restricted to `names`, in that order.
    pub fn select(&self, names: &[&str]) -> GridResult<ElementTable> {
        let mut selected = ElementTable::new(self.index.clone());
        for name in names {
            let series = self
                .column(name)
                .ok_or_else(|| GridError::Table(format!("column '{}' not found", name)))?;
            selected.insert_column(name, series.data.clone())?;
        }
        Ok(selected)
    }

    /// New table holding only the rows whose key satisfies `keep`.
    pub fn filter_rows<F>(&self, mut keep: F) -> ElementTable
    where
        F: FnMut(&RowKey) -> bool,
    {
        let positions: Vec<Option<usize>> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, key)| keep(key))
            .map(|(i, _)| Some(i))
            .collect();
        ElementTable {
            index: positions
                .iter()
                .flatten()
                .map(|&i| self.index[i].clone())
                .collect(),
            columns: self
                .columns
                .iter()
                .map(|s| Series {
                    name: s.name.clone(),
                    data: s.data.gather(&positions),
                })
                .collect(),
        }
    }

    /// Left join of `columns` from `other`, matched on row key.
    ///
    /// Columns already present in `self` are left alone. Rows of `self` absent
    /// from `other` receive missing values. Returns the names actually added.
    pub fn join_columns(&mut self, other: &ElementTable, columns: &[&str]) -> GridResult<Vec<String>> {
        let lookup: HashMap<&RowKey, usize> =
            other.index.iter().enumerate().map(|(i, k)| (k, i)).collect();
        let positions: Vec<Option<usize>> =
            self.index.iter().map(|k| lookup.get(k).copied()).collect();

        let mut added = Vec::new();
        for name in columns {
            if self.has_column(name) {
                continue;
            }
            let series = other.column(name).ok_or_else(|| {
                GridError::Table(format!("join source has no column '{}'", name))
            })?;
            self.columns.push(Series {
                name: name.to_string(),
                data: series.data.gather(&positions),
            });
            added.push(name.to_string());
        }
        Ok(added)
    }
}
