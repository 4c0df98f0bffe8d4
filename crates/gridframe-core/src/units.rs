//! Unit newtypes and per-unit base formulas.
//!
//! Element tables carry raw `f64` columns, but the bases those columns are
//! divided by on read (and multiplied by on write) are computed here with
//! typed quantities, so a kilovolt can never be passed where a megavolt-ampere
//! is expected.
//!
//! # Usage
//!
//! ```
//! use gridframe_core::units::{Kilovolts, MegavoltAmperes, PerUnitBases};
//!
//! let bases = PerUnitBases::new(MegavoltAmperes(100.0), Kilovolts(400.0));
//! let i_pu = 144.3376 / bases.current().value();
//! assert!((i_pu - 1.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Div, Mul};

/// Scaling and display for a unit type
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        /// Ratio of two quantities of the same unit
        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }
    };
}

/// Apparent power in megavolt-amperes (MVA)
///
/// The power base of a per-unit system is expressed in this unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegavoltAmperes(pub f64);

impl_unit_ops!(MegavoltAmperes, "MVA");

/// Voltage in kilovolts (kV)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Current in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

/// Resistance or reactance in ohms (Ω)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ohms(pub f64);

impl_unit_ops!(Ohms, "Ω");

/// Conductance or susceptance in siemens (S)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Siemens(pub f64);

impl_unit_ops!(Siemens, "S");

/// √3, used by the three-phase base current.
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Bases of the per-unit system at one nominal voltage.
///
/// | quantity        | base                     |
/// |-----------------|--------------------------|
/// | power           | `s`                      |
/// | voltage         | `v`                      |
/// | current         | `s * 1000 / (√3 * v)`    |
/// | impedance       | `v² / (s * 1000)`        |
/// | admittance      | `(s * 1000) / v²`        |
/// | DC resistance   | `v² / s`                 |
///
/// A zero or NaN nominal voltage yields non-finite bases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerUnitBases {
    pub power: MegavoltAmperes,
    pub voltage: Kilovolts,
}

impl PerUnitBases {
    pub fn new(power: MegavoltAmperes, voltage: Kilovolts) -> Self {
        Self { power, voltage }
    }

    #[inline]
    pub fn current(&self) -> Amperes {
        Amperes(self.power.0 * 1000.0 / (SQRT_3 * self.voltage.0))
    }

    #[inline]
    pub fn impedance(&self) -> Ohms {
        Ohms(self.voltage.0.powi(2) / (self.power.0 * 1000.0))
    }

    #[inline]
    pub fn admittance(&self) -> Siemens {
        Siemens(self.power.0 * 1000.0 / self.voltage.0.powi(2))
    }

    /// Base of the DC resistance of an HVDC line.
    #[inline]
    pub fn dc_resistance(&self) -> Ohms {
        Ohms(self.voltage.0.powi(2) / self.power.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        let v = Kilovolts(400.0);
        assert_eq!((v * 1.05).value(), 420.0);
        assert_eq!((v / 2.0).value(), 200.0);
        assert_eq!(Kilovolts(420.0) / v, 1.05);
    }

    #[test]
    fn test_base_current() {
        let bases = PerUnitBases::new(MegavoltAmperes(100.0), Kilovolts(400.0));
        assert!((bases.current().value() - 144.337_567_297_406_4).abs() < 1e-9);
    }

    #[test]
    fn test_impedance_and_admittance_bases_are_reciprocal() {
        let bases = PerUnitBases::new(MegavoltAmperes(100.0), Kilovolts(380.0));
        let product = bases.impedance().value() * bases.admittance().value();
        assert!((product - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dc_resistance_base() {
        let bases = PerUnitBases::new(MegavoltAmperes(100.0), Kilovolts(400.0));
        assert!((bases.dc_resistance().value() - 1600.0).abs() < 1e-10);
        assert!((1.0 / bases.dc_resistance().value() - 0.000625).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", MegavoltAmperes(100.0)), "100.0000 MVA");
        assert_eq!(format!("{}", Kilovolts(400.0)), "400.0000 kV");
    }
}
