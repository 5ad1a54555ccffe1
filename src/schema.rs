//! Expected columns of the exoplanet archive export
//!
//! The loader uses these declared types instead of inferring them, and the
//! filter expression parser expands the column classes below. A missing
//! expected column is not a load error: it only fails when referenced.

use crate::table::ColumnType;

pub const HOST_NAME: &str = "pl_hostname";
pub const PLANET_COUNT: &str = "pl_pnum";
pub const ORBITAL_PERIOD: &str = "pl_orbper";
pub const SEMIMAJOR_AXIS: &str = "pl_orbsmax";
pub const ECCENTRICITY: &str = "pl_orbeccen";
pub const INCLINATION: &str = "pl_orbincl";
pub const PLANET_MASS: &str = "pl_bmassj";
pub const PLANET_RADIUS: &str = "pl_radj";
pub const PLANET_DENSITY: &str = "pl_dens";
pub const STAR_DISTANCE: &str = "st_dist";
pub const STAR_TEMPERATURE: &str = "st_teff";
pub const STAR_MASS: &str = "st_mass";
pub const STAR_RADIUS: &str = "st_rad";

/// Declared columns and their logical types
///
/// Units: period in days, semimajor axis in AU, planet mass and radius in
/// Jupiter units, density in g/cm³, distance in parsecs, temperature in K,
/// stellar mass and radius in solar units.
pub const EXPECTED_COLUMNS: &[(&str, ColumnType)] = &[
    (HOST_NAME, ColumnType::Text),
    (PLANET_COUNT, ColumnType::Numeric),
    (ORBITAL_PERIOD, ColumnType::Numeric),
    (SEMIMAJOR_AXIS, ColumnType::Numeric),
    (ECCENTRICITY, ColumnType::Numeric),
    (INCLINATION, ColumnType::Numeric),
    (PLANET_MASS, ColumnType::Numeric),
    (PLANET_RADIUS, ColumnType::Numeric),
    (PLANET_DENSITY, ColumnType::Numeric),
    (STAR_DISTANCE, ColumnType::Numeric),
    (STAR_TEMPERATURE, ColumnType::Numeric),
    (STAR_MASS, ColumnType::Numeric),
    (STAR_RADIUS, ColumnType::Numeric),
];

/// Declared logical type of a column, if it is part of the expected schema
pub fn declared_type(name: &str) -> Option<ColumnType> {
    EXPECTED_COLUMNS
        .iter()
        .find(|(column, _)| *column == name)
        .map(|&(_, column_type)| column_type)
}

const ORBIT_CLASS: &[&str] = &[ORBITAL_PERIOD, SEMIMAJOR_AXIS, ECCENTRICITY, INCLINATION];
const PLANET_CLASS: &[&str] = &[PLANET_MASS, PLANET_RADIUS, PLANET_DENSITY];
const STAR_CLASS: &[&str] = &[STAR_DISTANCE, STAR_TEMPERATURE, STAR_MASS, STAR_RADIUS];

/// Columns named by a class keyword in filter expressions
pub fn column_class(class: &str) -> Option<&'static [&'static str]> {
    match class {
        "orbit" => Some(ORBIT_CLASS),
        "planet" => Some(PLANET_CLASS),
        "star" => Some(STAR_CLASS),
        _ => None,
    }
}
