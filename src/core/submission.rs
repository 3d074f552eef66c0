use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::error::SubmissionError;
use crate::core::form::FormState;
use crate::core::types::{DecayFunction, Side, TravelMode};

/// The confirmed configuration handed to the analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmission {
    pub access_measures: bool,
    pub coverage_measures: bool,
    pub travel_mode: TravelMode,
    pub maximum_travel_time: f64,
    pub origin_file: PathBuf,
    pub origin_field_mapping: BTreeMap<String, String>,
    pub destination_file: PathBuf,
    pub destination_field_mapping: BTreeMap<String, String>,
    pub destination_categories: Option<Vec<String>>,
    pub decay_function: DecayFunction,
    pub epsilon: f64,
    pub walk_speed: f64,
    pub custom_weight_dict: Option<String>,
}

impl FormSubmission {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl FormState {
    /// Mapping of engine keys to chosen columns. Sentinel and hidden slots are left out.
    pub fn field_mapping(&self, side: Side) -> BTreeMap<String, String> {
        self.visible_slots(side)
            .filter_map(|slot| {
                slot.dropdown
                    .selected_value()
                    .map(|value| (slot.role.mapping_key().to_string(), value.to_string()))
            })
            .collect()
    }

    /// Every problem preventing submission, in form order
    pub fn validate(&self) -> Vec<SubmissionError> {
        let mut errors = Vec::new();
        if !self.access && !self.coverage {
            errors.push(SubmissionError::NoMeasureSelected);
        }
        for side in [Side::Origin, Side::Destination] {
            if !self.group(side).is_loaded() {
                errors.push(SubmissionError::missing_file(side));
            }
        }
        errors
    }

    pub fn submission(&self) -> Result<FormSubmission, Vec<SubmissionError>> {
        let errors = self.validate();
        let (Some(origin), Some(destination)) = (
            self.group(Side::Origin).file(),
            self.group(Side::Destination).file(),
        ) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let chosen = self.categories().chosen_values();
        let weights = self.weights.trim();
        Ok(FormSubmission {
            access_measures: self.access,
            coverage_measures: self.coverage,
            travel_mode: self.travel_mode,
            maximum_travel_time: self.max_travel_time.value(),
            origin_file: origin.path.clone(),
            origin_field_mapping: self.field_mapping(Side::Origin),
            destination_file: destination.path.clone(),
            destination_field_mapping: self.field_mapping(Side::Destination),
            destination_categories: if chosen.is_empty() { None } else { Some(chosen) },
            decay_function: self.decay_function,
            epsilon: self.epsilon.value(),
            walk_speed: self.walk_speed.value(),
            custom_weight_dict: if weights.is_empty() {
                None
            } else {
                Some(self.weights.clone())
            },
        })
    }
}
