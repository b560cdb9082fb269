//! Request validation.
//!
//! # Responsibilities
//! - Enforce value ranges serde cannot express (non-negative values, counts)
//! - Check airport code lengths
//! - Report every violation at once
//!
//! Shape errors (missing fields, unknown units, wrong types) are rejected
//! earlier by deserialization.

use std::fmt;

use crate::estimation::types::{ElectricityInput, FlightInput, VehicleInput};

/// A single rule violation on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All violations found in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Semantic validation for request DTOs.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn airport_code_ok(code: &str) -> bool {
    (3..=4).contains(&code.chars().count())
}

impl Validate for ElectricityInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.country.is_empty() {
            errors.push(FieldError::new("country", "Country is required"));
        }
        if !non_negative(self.electricity_value) {
            errors.push(FieldError::new(
                "electricity_value",
                "Value must be greater than or equal to 0",
            ));
        }
        finish(errors)
    }
}

impl Validate for VehicleInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if !non_negative(self.distance_value) {
            errors.push(FieldError::new(
                "distance_value",
                "Distance must be greater than or equal to 0",
            ));
        }
        finish(errors)
    }
}

impl Validate for FlightInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.passengers < 1 {
            errors.push(FieldError::new("passengers", "At least one passenger is required"));
        }
        if self.legs.is_empty() {
            errors.push(FieldError::new("legs", "At least one leg is required"));
        }
        for (i, leg) in self.legs.iter().enumerate() {
            if !airport_code_ok(&leg.departure_airport) {
                errors.push(FieldError::new(
                    format!("legs[{}].departure_airport", i),
                    "Airport code must be 3 or 4 characters",
                ));
            }
            if !airport_code_ok(&leg.destination_airport) {
                errors.push(FieldError::new(
                    format!("legs[{}].destination_airport", i),
                    "Airport code must be 3 or 4 characters",
                ));
            }
        }
        finish(errors)
    }
}
