//! Geographic position with a human-readable place name.
//!
//! # Invariants
//! - `-90 <= latitude <= 90` and `-180 <= longitude <= 180`.
//! - Coordinates are finite.

use crate::behavior::{read_float, read_text, Behavior, BehaviorSpec, BehaviorView, Validator};
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const PLACE_NAME: &str = "place_name";

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

pub struct Locatable;

impl Behavior for Locatable {
    const NAME: &'static str = "locatable";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::float(LATITUDE))
            .field(FieldSpec::float(LONGITUDE))
            .field(FieldSpec::text(PLACE_NAME).default_value(""))
            .validator(Validator::new("latitude_range", &[LATITUDE], |values| {
                check_range(values, LATITUDE, MAX_LATITUDE)
            }))
            .validator(Validator::new("longitude_range", &[LONGITUDE], |values| {
                check_range(values, LONGITUDE, MAX_LONGITUDE)
            }))
            .derived("coordinates", |values, _| {
                FieldValue::Text(coordinates_text(values))
            })
    }
}

fn check_range(values: &FieldValues, field: &str, limit: f64) -> Result<(), String> {
    match read_float(values, field) {
        Some(value) if value.is_finite() && (-limit..=limit).contains(&value) => Ok(()),
        Some(value) => Err(format!("{field} {value} outside [-{limit}, {limit}]")),
        None => Err(format!("{field} is not set")),
    }
}

/// Generic `coordinates` value: `"{latitude},{longitude}"` in plain `f64`
/// formatting, e.g. `"52.5,-13.25"`. Typed callers should use
/// `LocatableView::coordinates` or the `latitude`/`longitude` fields.
fn coordinates_text(values: &FieldValues) -> String {
    format!("{},{}", latitude(values), longitude(values))
}

fn latitude(values: &FieldValues) -> f64 {
    read_float(values, LATITUDE).unwrap_or_default()
}

fn longitude(values: &FieldValues) -> f64 {
    read_float(values, LONGITUDE).unwrap_or_default()
}

/// Typed view over location fields.
#[derive(Debug, Clone, Copy)]
pub struct LocatableView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for LocatableView<'a> {
    type Behavior = Locatable;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl<'a> LocatableView<'a> {
    pub fn latitude(&self) -> f64 {
        latitude(self.values)
    }

    pub fn longitude(&self) -> f64 {
        longitude(self.values)
    }

    pub fn place_name(&self) -> &'a str {
        read_text(self.values, PLACE_NAME)
    }

    /// `(latitude, longitude)` pair.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude(), self.longitude())
    }
}

#[cfg(test)]
mod tests {
    use super::{check_range, coordinates_text, LATITUDE, LONGITUDE, MAX_LATITUDE};
    use crate::model::value::{FieldValue, FieldValues};

    fn latitude(value: f64) -> FieldValues {
        FieldValues::from([(LATITUDE.to_string(), FieldValue::Float(value))])
    }

    #[test]
    fn accepts_boundaries_and_rejects_outside() {
        assert!(check_range(&latitude(90.0), LATITUDE, MAX_LATITUDE).is_ok());
        assert!(check_range(&latitude(-90.0), LATITUDE, MAX_LATITUDE).is_ok());
        assert!(check_range(&latitude(91.0), LATITUDE, MAX_LATITUDE).is_err());
        assert!(check_range(&latitude(-90.5), LATITUDE, MAX_LATITUDE).is_err());
    }

    #[test]
    fn coordinates_text_is_comma_separated_pair() {
        let values = FieldValues::from([
            (LATITUDE.to_string(), FieldValue::Float(52.5)),
            (LONGITUDE.to_string(), FieldValue::Float(-13.25)),
        ]);
        assert_eq!(coordinates_text(&values), "52.5,-13.25");
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!(check_range(&latitude(f64::NAN), LATITUDE, MAX_LATITUDE).is_err());
        assert!(check_range(&latitude(f64::INFINITY), LATITUDE, MAX_LATITUDE).is_err());
    }
}
