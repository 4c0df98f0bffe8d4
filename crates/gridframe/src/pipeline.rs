//! Per-unit transform pipeline.
//!
//! One generic function interprets the [`rules`](crate::rules) of a category
//! in either direction: SI to per-unit on read, per-unit to SI on write.
//! Conversion is lenient: a row whose voltage level cannot be resolved gets
//! `NaN` in the affected cell, and the miss is reported in [`Diagnostics`] and
//! through `tracing`. The row keys are listed in the report so the write path
//! can leave those rows out instead of storing `NaN`.

use std::collections::HashMap;

use gridframe_core::{DiagnosticIssue, Diagnostics, ElementCategory, ElementTable, RowKey, Severity};
use tracing::warn;

use crate::per_unit::PerUnitContext;
use crate::rules::{rules_for, BaseSource};

/// Diagnostics category used for unresolved voltage bases.
pub const PER_UNIT_DIAGNOSTIC: &str = "per-unit";

/// Direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Divide SI values by their base (read path)
    ToPerUnit,
    /// Multiply per-unit values by their base (write path)
    FromPerUnit,
}

/// Nominal voltage of every voltage level, by id.
#[derive(Debug, Clone, Default)]
pub struct VoltageLevelBases {
    nominal_v: HashMap<String, f64>,
}

impl VoltageLevelBases {
    /// Read bases off a raw (SI) voltage-level table.
    pub fn from_table(voltage_levels: &ElementTable) -> Self {
        let nominal_v = match voltage_levels.doubles("nominal_v") {
            Some(values) => voltage_levels
                .index()
                .iter()
                .zip(values)
                .map(|(key, v)| (key.id.clone(), *v))
                .collect(),
            None => HashMap::new(),
        };
        Self { nominal_v }
    }

    pub fn get(&self, voltage_level_id: &str) -> Option<f64> {
        self.nominal_v.get(voltage_level_id).copied()
    }

    pub fn len(&self) -> usize {
        self.nominal_v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominal_v.is_empty()
    }
}

/// Outcome of converting one table.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Cells set to NaN because no voltage base was found
    pub missing_bases: usize,
    /// Rows with at least one such cell, in table order
    pub unresolved: Vec<RowKey>,
    pub diagnostics: Diagnostics,
}

/// Convert every ruled column present in `table`, in place.
///
/// Auxiliary columns are never added: base-source columns must already be in
/// the table, otherwise the affected cells become `NaN`.
pub fn convert(
    ctx: &PerUnitContext,
    category: ElementCategory,
    table: &mut ElementTable,
    voltage_levels: &VoltageLevelBases,
    direction: Direction,
) -> ConversionReport {
    let mut report = ConversionReport::default();

    for rule in rules_for(category) {
        if table.doubles(rule.column).is_none() {
            continue;
        }

        let bases: Vec<Option<f64>> = match rule.base {
            BaseSource::None => vec![Some(f64::NAN); table.len()],
            BaseSource::VoltageLevel(id_column) => match table.strings(id_column) {
                Some(ids) => ids.iter().map(|id| voltage_levels.get(id)).collect(),
                None => vec![None; table.len()],
            },
            BaseSource::RowColumn(voltage_column) => match table.doubles(voltage_column) {
                Some(values) => values.iter().map(|v| Some(*v)).collect(),
                None => vec![None; table.len()],
            },
        };

        for (position, base) in bases.iter().enumerate() {
            if base.is_none() {
                let key = &table.index()[position];
                let source = rule.base.column().unwrap_or_default();
                warn!(
                    %category,
                    element = %key,
                    column = rule.column,
                    source,
                    "no nominal voltage found; value set to NaN"
                );
                report.missing_bases += 1;
                if !report.unresolved.contains(key) {
                    report.unresolved.push(key.clone());
                }
                report.diagnostics.add(
                    DiagnosticIssue::new(
                        Severity::Warning,
                        PER_UNIT_DIAGNOSTIC,
                        format!("no nominal voltage found through '{}'", source),
                    )
                    .with_entity(format!("{}/{}", category, key))
                    .with_column(rule.column),
                );
            }
        }

        if let Some(values) = table.doubles_mut(rule.column) {
            for (value, base) in values.iter_mut().zip(bases) {
                *value = match base {
                    None => f64::NAN,
                    Some(nominal_v) => {
                        let divisor = rule.dimension.divisor(ctx, nominal_v);
                        match direction {
                            Direction::ToPerUnit => *value / divisor,
                            Direction::FromPerUnit => *value * divisor,
                        }
                    }
                };
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridframe_core::SeriesData;

    fn ctx() -> PerUnitContext {
        PerUnitContext::new(100.0).unwrap()
    }

    fn bases() -> VoltageLevelBases {
        let vls = ElementTable::from_ids(["VL1", "VL2"])
            .with_column("nominal_v", SeriesData::Double(vec![400.0, 225.0]))
            .unwrap();
        VoltageLevelBases::from_table(&vls)
    }

    #[test]
    fn power_columns_scale_by_power_base() {
        let mut loads = ElementTable::from_ids(["LOAD"])
            .with_column("p0", SeriesData::Double(vec![6.0]))
            .unwrap();
        let report = convert(
            &ctx(),
            ElementCategory::Load,
            &mut loads,
            &VoltageLevelBases::default(),
            Direction::ToPerUnit,
        );
        assert!((loads.double("LOAD", "p0").unwrap() - 0.06).abs() < 1e-12);
        assert_eq!(report.missing_bases, 0);
    }

    #[test]
    fn sides_use_their_own_voltage_level() {
        let mut lines = ElementTable::from_ids(["L"])
            .with_column("i1", SeriesData::Double(vec![144.3376]))
            .unwrap()
            .with_column("i2", SeriesData::Double(vec![144.3376]))
            .unwrap()
            .with_column("voltage_level1_id", SeriesData::String(vec!["VL1".into()]))
            .unwrap()
            .with_column("voltage_level2_id", SeriesData::String(vec!["VL2".into()]))
            .unwrap();
        convert(&ctx(), ElementCategory::Line, &mut lines, &bases(), Direction::ToPerUnit);

        let i1 = lines.double("L", "i1").unwrap();
        let i2 = lines.double("L", "i2").unwrap();
        assert!((i1 - 1.0).abs() < 1e-6);
        assert!((i2 - 144.3376 / (100_000.0 / (3f64.sqrt() * 225.0))).abs() < 1e-9);
    }

    #[test]
    fn unresolved_voltage_level_yields_nan_and_a_warning() {
        let mut gens = ElementTable::from_ids(["G1", "G2"])
            .with_column("target_v", SeriesData::Double(vec![420.0, 420.0]))
            .unwrap()
            .with_column(
                "voltage_level_id",
                SeriesData::String(vec!["VL1".into(), "NOWHERE".into()]),
            )
            .unwrap();
        let report = convert(
            &ctx(),
            ElementCategory::Generator,
            &mut gens,
            &bases(),
            Direction::ToPerUnit,
        );

        assert!((gens.double("G1", "target_v").unwrap() - 1.05).abs() < 1e-12);
        assert!(gens.double("G2", "target_v").unwrap().is_nan());
        assert_eq!(report.missing_bases, 1);
        let issue = &report.diagnostics.issues[0];
        assert_eq!(issue.entity.as_deref(), Some("generator/G2"));
        assert_eq!(issue.column.as_deref(), Some("target_v"));
        assert_eq!(report.unresolved, vec![RowKey::id("G2")]);
    }

    #[test]
    fn row_is_listed_once_however_many_columns_miss() {
        let mut gens = ElementTable::from_ids(["G"])
            .with_column("target_v", SeriesData::Double(vec![420.0]))
            .unwrap()
            .with_column("i", SeriesData::Double(vec![144.3376]))
            .unwrap()
            .with_column("voltage_level_id", SeriesData::String(vec!["NOWHERE".into()]))
            .unwrap();
        let report = convert(
            &ctx(),
            ElementCategory::Generator,
            &mut gens,
            &bases(),
            Direction::FromPerUnit,
        );
        assert_eq!(report.missing_bases, 2);
        assert_eq!(report.unresolved.len(), 1);
    }

    #[test]
    fn row_column_base_for_voltage_limits() {
        let mut vls = ElementTable::from_ids(["VL1"])
            .with_column("nominal_v", SeriesData::Double(vec![400.0]))
            .unwrap()
            .with_column("high_voltage_limit", SeriesData::Double(vec![440.0]))
            .unwrap();
        convert(
            &ctx(),
            ElementCategory::VoltageLevel,
            &mut vls,
            &VoltageLevelBases::default(),
            Direction::ToPerUnit,
        );
        assert!((vls.double("VL1", "high_voltage_limit").unwrap() - 1.1).abs() < 1e-12);
        assert_eq!(vls.double("VL1", "nominal_v"), Some(400.0));
    }

    #[test]
    fn directions_are_inverse() {
        let original = ElementTable::from_ids(["DL"])
            .with_column("r", SeriesData::Double(vec![10.0]))
            .unwrap()
            .with_column("b", SeriesData::Double(vec![1e-5]))
            .unwrap()
            .with_column("voltage_level_id", SeriesData::String(vec!["VL2".into()]))
            .unwrap();
        let mut table = original.clone();
        convert(&ctx(), ElementCategory::DanglingLine, &mut table, &bases(), Direction::ToPerUnit);
        convert(&ctx(), ElementCategory::DanglingLine, &mut table, &bases(), Direction::FromPerUnit);
        for column in ["r", "b"] {
            let before = original.double("DL", column).unwrap();
            let after = table.double("DL", column).unwrap();
            assert!((before - after).abs() <= 1e-12 * before.abs());
        }
    }
}
