//! Utilidades de validación
//!
//! Validadores custom usados por los DTOs de la API.

use validator::ValidationError;

/// El texto de búsqueda no puede traer caracteres de control
pub fn validate_search_text(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        let mut error = ValidationError::new("search_text");
        error.add_param("value".into(), &value.escape_debug().to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_search_text() {
        assert!(validate_search_text("ABC-123").is_ok());
        assert!(validate_search_text("  3569 ").is_ok());
        assert!(validate_search_text("abc\u{0007}").is_err());
        assert!(validate_search_text("a\nb").is_err());
    }
}
