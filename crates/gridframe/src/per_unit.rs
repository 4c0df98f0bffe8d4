//! Per-network per-unit settings.

use gridframe_core::units::{Kilovolts, MegavoltAmperes, PerUnitBases};
use gridframe_core::{GridError, GridResult};

/// Power base used when none is configured, in MVA.
pub const DEFAULT_POWER_BASE: f64 = 1.0;

/// Whether tables are expressed in per-unit, and against which power base.
///
/// The power base is strictly positive at all times: [`set_power_base`]
/// rejects zero, negative and non-finite values before touching the context.
///
/// [`set_power_base`]: PerUnitContext::set_power_base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerUnitContext {
    power_base: f64,
    enabled: bool,
}

impl Default for PerUnitContext {
    fn default() -> Self {
        Self {
            power_base: DEFAULT_POWER_BASE,
            enabled: false,
        }
    }
}

impl PerUnitContext {
    /// Disabled context with the given power base.
    pub fn new(power_base: f64) -> GridResult<Self> {
        let mut ctx = Self::default();
        ctx.set_power_base(power_base)?;
        Ok(ctx)
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn power_base(&self) -> f64 {
        self.power_base
    }

    pub fn set_power_base(&mut self, value: f64) -> GridResult<()> {
        // `!(value > 0.0)` also catches NaN
        if !(value > 0.0) || !value.is_finite() {
            return Err(GridError::InvalidBase { value });
        }
        self.power_base = value;
        Ok(())
    }

    /// Bases at a given nominal voltage (kV).
    pub fn bases(&self, nominal_v: f64) -> PerUnitBases {
        PerUnitBases::new(MegavoltAmperes(self.power_base), Kilovolts(nominal_v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_disabled_unit_base() {
        let ctx = PerUnitContext::default();
        assert!(!ctx.is_enabled());
        assert_eq!(ctx.power_base(), 1.0);
    }

    #[test]
    fn rejects_non_positive_bases() {
        let mut ctx = PerUnitContext::new(100.0).unwrap();
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ctx.set_power_base(bad),
                Err(GridError::InvalidBase { .. })
            ));
        }
        assert_eq!(ctx.power_base(), 100.0);
    }

    #[test]
    fn toggling_keeps_base() {
        let mut ctx = PerUnitContext::new(100.0).unwrap();
        ctx.enable();
        assert!(ctx.is_enabled());
        ctx.disable();
        assert!(!ctx.is_enabled());
        assert_eq!(ctx.power_base(), 100.0);
    }
}
