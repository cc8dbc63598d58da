use uuid::Uuid;

use crate::errors::{AppError, FieldError};

/// Parses a project identifier taken from a request path.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| {
        AppError::ValidationError(vec![FieldError {
            field: "id".to_string(),
            message: "Invalid UUID format".to_string(),
        }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_surrounding_whitespace() {
        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&format!(" {id} ")).unwrap(), id);
    }

    #[test]
    fn rejects_garbage_with_a_field_error() {
        match valid_uuid("nonexistent-id") {
            Err(AppError::ValidationError(errors)) => assert_eq!(errors[0].field, "id"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
