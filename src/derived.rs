//! Physics-derived quantities
//!
//! Every function states its units. Scalar functions take aggregates (a mean,
//! a single row); `orbital_velocities` is the only elementwise function and
//! pairs its two slices position by position.

use crate::error::{InferenceError, Result};
use std::f64::consts::PI;

/// Gravitational constant (m³ kg⁻¹ s⁻²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67384e-11;
/// Astronomical unit (m)
pub const AU_M: f64 = 1.496e11;
/// Astronomical unit (km)
pub const AU_KM: f64 = 1.496e8;
/// Solar mass (kg)
pub const SOLAR_MASS_KG: f64 = 1.989e30;
/// Jupiter mass (kg)
pub const JUPITER_MASS_KG: f64 = 1.898e27;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Jupiter radius (AU)
pub const JUPITER_RADIUS_AU: f64 = 69_911.0 / AU_KM;
/// Solar radius (AU)
pub const SOLAR_RADIUS_AU: f64 = 696_340.0 / AU_KM;
/// Earth's Hill radius (AU), approximate
pub const EARTH_HILL_RADIUS_AU: f64 = 0.01;

/// Semimajor axis from Kepler's third law, `a = cbrt(G·M·P² / 4π²)`
///
/// * `total_mass_kg` - primary plus secondary mass (kg)
/// * `period_s` - orbital period (s)
///
/// Returns metres; divide by [`AU_M`] for astronomical units.
pub fn semimajor_axis(total_mass_kg: f64, period_s: f64) -> Result<f64> {
    if !total_mass_kg.is_finite() || total_mass_kg <= 0.0 {
        return Err(InferenceError::NumericDomain(format!(
            "total mass must be positive, got {total_mass_kg} kg"
        )));
    }
    if !period_s.is_finite() || period_s <= 0.0 {
        return Err(InferenceError::NumericDomain(format!(
            "orbital period must be positive, got {period_s} s"
        )));
    }
    let cubed = GRAVITATIONAL_CONSTANT * total_mass_kg * period_s.powi(2) / (4.0 * PI * PI);
    Ok(cubed.cbrt())
}

/// Mean orbital speed `2π·a / P` for one orbit
///
/// `semimajor_axis` and `period` may use any units; the result is in
/// `semimajor_axis` units per `period` unit (m and s give m/s). NaN in
/// either input gives NaN; a zero period is a domain error.
pub fn orbital_velocity(semimajor_axis: f64, period: f64) -> Result<f64> {
    if semimajor_axis.is_nan() || period.is_nan() {
        return Ok(f64::NAN);
    }
    if period == 0.0 {
        return Err(InferenceError::NumericDomain("orbital period is zero".to_string()));
    }
    Ok(2.0 * PI * semimajor_axis / period)
}

/// Elementwise [`orbital_velocity`] over paired columns
///
/// Both slices are elementwise and must have equal length. NaN positions
/// stay NaN, never zero.
pub fn orbital_velocities(semimajor_axes: &[f64], periods: &[f64]) -> Result<Vec<f64>> {
    if semimajor_axes.len() != periods.len() {
        return Err(InferenceError::InvalidParameter(format!(
            "semimajor axis column has {} values but period column has {}",
            semimajor_axes.len(),
            periods.len()
        )));
    }
    semimajor_axes
        .iter()
        .zip(periods)
        .map(|(&a, &p)| orbital_velocity(a, p))
        .collect()
}

/// Hill radius `a · cbrt(m_secondary / (3·m_primary))`
///
/// All scalars. Masses share one unit; the result is in the unit of
/// `semimajor_axis`.
pub fn hill_radius(semimajor_axis: f64, m_secondary: f64, m_primary: f64) -> Result<f64> {
    if m_primary.is_nan() || m_primary <= 0.0 {
        return Err(InferenceError::NumericDomain(format!(
            "primary mass must be positive, got {m_primary}"
        )));
    }
    if m_secondary.is_nan() || m_secondary < 0.0 {
        return Err(InferenceError::NumericDomain(format!(
            "secondary mass must be non-negative, got {m_secondary}"
        )));
    }
    Ok(semimajor_axis * (m_secondary / (3.0 * m_primary)).cbrt())
}

/// Geometric transit probability `(R_primary + R_secondary) / a`
///
/// All scalars in one length unit, typically AU.
pub fn transit_probability(r_primary: f64, r_secondary: f64, semimajor_axis: f64) -> Result<f64> {
    if semimajor_axis.is_nan() || semimajor_axis <= 0.0 {
        return Err(InferenceError::NumericDomain(format!(
            "semimajor axis must be positive, got {semimajor_axis}"
        )));
    }
    Ok((r_primary + r_secondary) / semimajor_axis)
}
