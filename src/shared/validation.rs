use validator::{Validate, ValidationError, ValidationErrors};

use crate::core::error::AppError;

/// Reject values that trim down to nothing, so a name of spaces cannot slip
/// past a plain length check.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Flatten validator errors into "field: message" strings for the response body.
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid value for {}", field));
            out.push(format!("{}: {}", field, message));
        }
    }
    out.sort();
    out
}

/// Validate a request DTO, mapping failures to a 400 with field-level detail.
pub fn validate_dto<T: Validate>(dto: &T) -> Result<(), AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(flatten_errors(&e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(email(message = "invalid email"))]
        email: String,
    }

    #[test]
    fn collects_field_level_messages() {
        let sample = Sample {
            name: "".to_string(),
            email: "not-an-email".to_string(),
        };
        let err = validate_dto(&sample).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| e.contains("name is required")));
                assert!(errors.iter().any(|e| e.contains("invalid email")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blank_detection_trims_first() {
        assert!(not_blank("").is_err());
        assert!(not_blank("  \t\n").is_err());
        assert!(not_blank(" Budi ").is_ok());
    }

    #[test]
    fn valid_dto_passes() {
        let sample = Sample {
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
        };
        assert!(validate_dto(&sample).is_ok());
    }
}
