//! Sanity rules applied before a fallback extraction is trusted.

use crate::smart::extract::ExtractionResult;

/// A field value that failed its rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("price must be a positive number, got {0}")]
    Price(f64),

    #[error("title must be longer than 5 characters, got {0:?}")]
    Title(String),

    #[error("model must contain only letters, digits and hyphens, got {0:?}")]
    Model(String),

    #[error("brand must be longer than 1 character, got {0:?}")]
    Brand(String),
}

/// Returns every rule the present fields break. Absent fields pass.
pub fn check(result: &ExtractionResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(price) = result.price {
        if !(price.is_finite() && price > 0.0) {
            errors.push(ValidationError::Price(price));
        }
    }

    if let Some(title) = &result.title {
        if title.chars().count() <= 5 {
            errors.push(ValidationError::Title(title.clone()));
        }
    }

    if let Some(model) = &result.model {
        if !is_model_code(model) {
            errors.push(ValidationError::Model(model.clone()));
        }
    }

    if let Some(brand) = &result.brand {
        if brand.chars().count() <= 1 {
            errors.push(ValidationError::Brand(brand.clone()));
        }
    }

    // availability is a bool by construction

    errors
}

/// Returns true if every present field passes its rule.
pub fn validate(result: &ExtractionResult) -> bool {
    check(result).is_empty()
}

fn is_model_code(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
