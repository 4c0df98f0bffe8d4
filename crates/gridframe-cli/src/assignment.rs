//! `--set ID.COLUMN=VALUE` parsing.
//!
//! Assignments are grouped per column so that each column becomes one
//! update table holding only the rows that set it.

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use gridframe::{CellValue, ColumnSpec, ElementCategory, ElementTable, RowKey, SeriesData};

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub key: RowKey,
    pub column: String,
    pub raw: String,
}

impl FromStr for Assignment {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        let malformed = || anyhow!("expected ID.COLUMN=VALUE, got '{}'", input);
        let (target, raw) = input.split_once('=').ok_or_else(malformed)?;
        let (key, column) = target.trim().rsplit_once('.').ok_or_else(malformed)?;
        if key.is_empty() || column.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            key: parse_key(key)?,
            column: column.to_string(),
            raw: raw.to_string(),
        })
    }
}

/// `ID` or `ID[NUM]`
fn parse_key(key: &str) -> Result<RowKey> {
    match key.strip_suffix(']').and_then(|k| k.rsplit_once('[')) {
        Some((id, num)) => {
            let num = num
                .parse::<i64>()
                .map_err(|_| anyhow!("'{}' is not a valid sequence number in '{}'", num, key))?;
            Ok(RowKey::composite(id, num))
        }
        None => Ok(RowKey::id(key)),
    }
}

/// Build one typed update table per assigned column, in order of first use.
pub fn update_tables(
    category: ElementCategory,
    schema: &[ColumnSpec],
    assignments: &[Assignment],
) -> Result<Vec<ElementTable>> {
    let mut columns: Vec<&str> = Vec::new();
    for assignment in assignments {
        if !columns.contains(&assignment.column.as_str()) {
            columns.push(&assignment.column);
        }
    }

    let mut tables = Vec::with_capacity(columns.len());
    for column in columns {
        let spec = schema
            .iter()
            .find(|spec| spec.name == column)
            .ok_or_else(|| anyhow!("{} has no column '{}'", category, column))?;

        let mut cells: Vec<(&RowKey, CellValue)> = Vec::new();
        for assignment in assignments.iter().filter(|a| a.column == column) {
            if cells.iter().any(|(key, _)| *key == &assignment.key) {
                bail!("{}.{} is assigned more than once", assignment.key, column);
            }
            cells.push((&assignment.key, CellValue::parse(spec.series_type, &assignment.raw)?));
        }

        let keys: Vec<RowKey> = cells.iter().map(|(key, _)| (*key).clone()).collect();
        let mut table = ElementTable::new(keys);
        table.insert_column(column, SeriesData::missing(spec.series_type, cells.len()))?;
        for (key, value) in cells {
            table.set_cell(key, column, value)?;
        }
        tables.push(table);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridframe::SeriesType;

    fn schema() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec {
                name: "p0".into(),
                series_type: SeriesType::Double,
                writable: true,
            },
            ColumnSpec {
                name: "connected".into(),
                series_type: SeriesType::Boolean,
                writable: true,
            },
        ]
    }

    #[test]
    fn parses_plain_and_composite_keys() {
        let a: Assignment = "LOAD.p0=12.5".parse().unwrap();
        assert_eq!(a.key, RowKey::id("LOAD"));
        assert_eq!(a.column, "p0");
        assert_eq!(a.raw, "12.5");

        let b: Assignment = "NHV2_NLOAD[2].rho=1.2".parse().unwrap();
        assert_eq!(b.key, RowKey::composite("NHV2_NLOAD", 2));

        // the last dot separates the column
        let c: Assignment = "A.B.p0=1".parse().unwrap();
        assert_eq!(c.key, RowKey::id("A.B"));
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!("LOAD=1".parse::<Assignment>().is_err());
        assert!("LOAD.p0".parse::<Assignment>().is_err());
        assert!(".p0=1".parse::<Assignment>().is_err());
        assert!("X[a].rho=1".parse::<Assignment>().is_err());
    }

    #[test]
    fn groups_assignments_by_column() {
        let assignments: Vec<Assignment> = ["L1.p0=1", "L1.connected=false", "L2.p0=2"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let tables = update_tables(ElementCategory::Load, &schema(), &assignments).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(tables[0].double("L2", "p0"), Some(2.0));
        assert_eq!(
            tables[1].cell(&RowKey::id("L1"), "connected"),
            Some(CellValue::Boolean(false))
        );
    }

    #[test]
    fn values_follow_the_declared_type() {
        let bad: Vec<Assignment> = vec!["L1.p0=high".parse().unwrap()];
        assert!(update_tables(ElementCategory::Load, &schema(), &bad).is_err());

        let unknown: Vec<Assignment> = vec!["L1.colour=red".parse().unwrap()];
        let err = update_tables(ElementCategory::Load, &schema(), &unknown).unwrap_err();
        assert!(err.to_string().contains("colour"));

        let twice: Vec<Assignment> = vec!["L1.p0=1".parse().unwrap(), "L1.p0=2".parse().unwrap()];
        assert!(update_tables(ElementCategory::Load, &schema(), &twice).is_err());
    }
}
