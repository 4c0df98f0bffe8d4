//! Element table accessor and typed attribute dispatcher.
//!
//! Reads hand back the engine's table for the working variant. Writes send
//! each column of the caller's table to the engine primitive matching the
//! column's declared type:
//!
//! | code | declared | primitive                |
//! |------|----------|--------------------------|
//! | 0    | string   | `write_string_series`    |
//! | 1    | double   | `write_double_series`    |
//! | 2    | integer  | `write_int_series`       |
//! | 3    | boolean  | `write_int_series` (0/1) |
//!
//! Columns are dispatched in table order with no staging: when a column fails,
//! the columns before it stay applied.

use gridframe_core::{
    ElementCategory, ElementTable, GridError, GridResult, NetworkEngine, NetworkHandle, Series,
    SeriesData, SeriesType,
};
use tracing::debug;

pub fn read_table<E>(
    engine: &E,
    handle: &NetworkHandle,
    category: ElementCategory,
) -> GridResult<ElementTable>
where
    E: NetworkEngine + ?Sized,
{
    Ok(engine.element_table(handle, category)?)
}

/// Dispatch every column of `table`, in order.
pub fn write_table<E>(
    engine: &E,
    handle: &NetworkHandle,
    category: ElementCategory,
    table: &ElementTable,
) -> GridResult<()>
where
    E: NetworkEngine + ?Sized,
{
    for series in table.columns() {
        dispatch_column(engine, handle, category, table, series)?;
    }
    Ok(())
}

fn dispatch_column<E>(
    engine: &E,
    handle: &NetworkHandle,
    category: ElementCategory,
    table: &ElementTable,
    series: &Series,
) -> GridResult<()>
where
    E: NetworkEngine + ?Sized,
{
    let column = series.name.as_str();
    let code = engine.series_type(category, column)?;
    let declared = SeriesType::from_code(code).ok_or_else(|| GridError::UnsupportedSeriesType {
        category,
        column: column.to_string(),
        code,
    })?;

    debug!(%category, column, declared = declared.as_str(), rows = table.len(), "dispatching column");

    let ids = table.index();
    match (declared, &series.data) {
        (SeriesType::String, SeriesData::String(values)) => {
            engine.write_string_series(handle, category, column, ids, values)?
        }
        (SeriesType::Double, SeriesData::Double(values)) => {
            engine.write_double_series(handle, category, column, ids, values)?
        }
        (SeriesType::Int, SeriesData::Int(values)) => {
            engine.write_int_series(handle, category, column, ids, values)?
        }
        (SeriesType::Boolean, SeriesData::Boolean(values)) => {
            let as_ints: Vec<i64> = values.iter().map(|&b| i64::from(b)).collect();
            engine.write_int_series(handle, category, column, ids, &as_ints)?
        }
        (declared, data) => {
            return Err(GridError::SeriesTypeMismatch {
                category,
                column: column.to_string(),
                declared: declared.as_str(),
                actual: data.series_type().as_str(),
            })
        }
    }
    Ok(())
}
