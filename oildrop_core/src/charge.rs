//! Droplet charge from terminal velocities (Stokes drag with slip correction).
//!
//! The model is closed form:
//! - air viscosity at the ambient temperature, linear around 21 °C
//! - uncorrected radius from the fall velocity (Stokes)
//! - Cunningham correction of the viscosity for that radius and pressure
//! - corrected radius, mass, and the force balance in the rise phase
//!
//! `q = (m g + 6 π η r v_rise) / E`, with `E = V / d`.

use std::f64::consts::PI;

use crate::error::AnalysisError;

/// Elementary charge in coulombs.
pub const ELEMENTARY_CHARGE_C: f64 = 1.602176634e-19;

/// Air viscosity at the reference temperature (Pa·s).
const AIR_VISCOSITY_REF_PA_S: f64 = 1.8228e-5;
/// Viscosity change per °C away from the reference.
const AIR_VISCOSITY_PER_C: f64 = 4.790e-8;
const AIR_VISCOSITY_REF_TEMP_C: f64 = 21.0;
/// Slip-correction constant b in `1 + b / (r p)`, with r in m and p in torr.
const CUNNINGHAM_B_M_TORR: f64 = 5.908e-5;

/// Apparatus and environment for one experiment run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub voltage_v: f64,
    pub plate_separation_m: f64,
    pub oil_density_kg_m3: f64,
    pub gravity_m_s2: f64,
    pub temperature_c: f64,
    pub pressure_torr: f64,
    pub calibration_px_per_mm: f64,
    pub fps: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            voltage_v: 500.0,
            plate_separation_m: 4.902e-3,
            oil_density_kg_m3: 861.0,
            gravity_m_s2: 9.81,
            temperature_c: 20.0,
            pressure_torr: 760.0,
            calibration_px_per_mm: 414.20,
            fps: 30.0,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<(), AnalysisError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidConstants(format!(
            "{name} must be finite and > 0, got {v}"
        )))
    }
}

impl PhysicalConstants {
    /// Check the preconditions of the charge model.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        positive("plate_separation_m", self.plate_separation_m)?;
        positive("pressure_torr", self.pressure_torr)?;
        positive("oil_density_kg_m3", self.oil_density_kg_m3)?;
        positive("gravity_m_s2", self.gravity_m_s2)?;
        if !self.voltage_v.is_finite() || self.voltage_v == 0.0 {
            return Err(AnalysisError::InvalidConstants(format!(
                "voltage_v must be finite and non-zero, got {}",
                self.voltage_v
            )));
        }
        if !self.temperature_c.is_finite() {
            return Err(AnalysisError::InvalidConstants(
                "temperature_c must be finite".to_string(),
            ));
        }
        let eta0 = base_viscosity(self.temperature_c);
        if eta0 <= 0.0 {
            return Err(AnalysisError::InvalidConstants(format!(
                "temperature_c {} gives non-positive air viscosity",
                self.temperature_c
            )));
        }
        Ok(())
    }

    /// Electric field between the plates (V/m).
    pub fn field_v_m(&self) -> f64 {
        self.voltage_v / self.plate_separation_m
    }
}

/// Air viscosity before slip correction (Pa·s).
#[inline]
pub fn base_viscosity(temperature_c: f64) -> f64 {
    AIR_VISCOSITY_REF_PA_S + AIR_VISCOSITY_PER_C * (temperature_c - AIR_VISCOSITY_REF_TEMP_C)
}

/// Stokes radius for a droplet falling at `v_fall_m_s` through air of `viscosity`.
#[inline]
fn stokes_radius(viscosity: f64, v_fall_m_s: f64, density: f64, g: f64) -> f64 {
    ((9.0 * viscosity * v_fall_m_s) / (2.0 * density * g)).sqrt()
}

/// Computed charge and the droplet properties it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeEstimate {
    pub charge_coulombs: f64,
    /// Charge as a multiple of the elementary charge (not rounded).
    pub interval: f64,
    pub radius_m: f64,
    pub mass_kg: f64,
    /// Slip-corrected air viscosity (Pa·s).
    pub viscosity_pa_s: f64,
}

/// Charge model bound to one validated set of constants.
#[derive(Debug, Clone, Copy)]
pub struct ChargeEstimator {
    constants: PhysicalConstants,
}

impl ChargeEstimator {
    pub fn new(constants: PhysicalConstants) -> Result<Self, AnalysisError> {
        constants.validate()?;
        Ok(Self { constants })
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Both velocities are magnitudes in m/s and must be strictly positive.
    pub fn estimate(&self, v_rise_m_s: f64, v_fall_m_s: f64) -> Result<ChargeEstimate, AnalysisError> {
        if !(v_rise_m_s.is_finite() && v_rise_m_s > 0.0) {
            return Err(AnalysisError::InvalidVelocity {
                name: "v_rise_m_s",
                value: v_rise_m_s,
            });
        }
        if !(v_fall_m_s.is_finite() && v_fall_m_s > 0.0) {
            return Err(AnalysisError::InvalidVelocity {
                name: "v_fall_m_s",
                value: v_fall_m_s,
            });
        }

        let c = &self.constants;
        let rho = c.oil_density_kg_m3;
        let g = c.gravity_m_s2;
        let field = c.field_v_m();

        let eta0 = base_viscosity(c.temperature_c);
        let r_uncorrected = stokes_radius(eta0, v_fall_m_s, rho, g);
        let viscosity = eta0 / (1.0 + CUNNINGHAM_B_M_TORR / (r_uncorrected * c.pressure_torr));
        let radius = stokes_radius(viscosity, v_fall_m_s, rho, g);
        let mass = rho * 4.0 / 3.0 * PI * radius.powi(3);
        let charge = (mass * g + 6.0 * PI * viscosity * radius * v_rise_m_s) / field;
        let interval = charge / ELEMENTARY_CHARGE_C;

        tracing::debug!(
            field,
            eta0,
            viscosity,
            radius,
            mass,
            charge,
            interval,
            "charge estimate"
        );

        Ok(ChargeEstimate {
            charge_coulombs: charge,
            interval,
            radius_m: radius,
            mass_kg: mass,
            viscosity_pa_s: viscosity,
        })
    }
}

/// One-shot form of [`ChargeEstimator::estimate`].
pub fn estimate_charge(
    v_rise_m_s: f64,
    v_fall_m_s: f64,
    constants: &PhysicalConstants,
) -> Result<ChargeEstimate, AnalysisError> {
    ChargeEstimator::new(*constants)?.estimate(v_rise_m_s, v_fall_m_s)
}
