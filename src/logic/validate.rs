use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::{
    PointOfInterestForUpdate, PatchPath, DESCRIPTION_MAX_LENGTH, NAME_MAX_LENGTH,
};

/// Field-level validation failures, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

pub struct FieldValidator;

impl FieldValidator {
    /// Read the updatable fields from a request body. Type mismatches are
    /// reported per field together with the usual name and description rules.
    pub fn parse_point_of_interest(body: &Value) -> Result<PointOfInterestForUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(object) = body.as_object() else {
            errors.add("body", "A JSON object is required.");
            return Err(errors);
        };

        let mut text = |field: PatchPath| match object.get(field.as_str()) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                errors.add(field.as_str(), format!("The {} field must be a string.", field.as_str()));
                None
            }
        };
        let name = text(PatchPath::Name);
        let description = text(PatchPath::Description);

        let fields = PointOfInterestForUpdate {
            name: name.unwrap_or_default(),
            description,
        };
        if errors.field(PatchPath::Name.as_str()).is_none() {
            Self::check_name(&fields.name, &mut errors);
        }
        if errors.field(PatchPath::Description.as_str()).is_none() {
            Self::check_description(fields.description.as_deref(), &mut errors);
        }
        errors.into_result(fields)
    }

    /// Validate the updatable fields of a point of interest
    pub fn validate_point_of_interest(
        fields: &PointOfInterestForUpdate,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        Self::check_name(&fields.name, &mut errors);
        Self::check_description(fields.description.as_deref(), &mut errors);
        errors.into_result(())
    }

    pub fn validate_city(name: &str, description: Option<&str>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        Self::check_name(name, &mut errors);
        Self::check_description(description, &mut errors);
        errors.into_result(())
    }

    fn check_name(name: &str, errors: &mut ValidationErrors) {
        let field = PatchPath::Name.as_str();
        if name.trim().is_empty() {
            errors.add(field, "The name field is required.");
        } else if name.chars().count() > NAME_MAX_LENGTH {
            errors.add(
                field,
                format!("The name field must be at most {} characters.", NAME_MAX_LENGTH),
            );
        }
    }

    fn check_description(description: Option<&str>, errors: &mut ValidationErrors) {
        if let Some(description) = description {
            if description.chars().count() > DESCRIPTION_MAX_LENGTH {
                errors.add(
                    PatchPath::Description.as_str(),
                    format!(
                        "The description field must be at most {} characters.",
                        DESCRIPTION_MAX_LENGTH
                    ),
                );
            }
        }
    }
}
