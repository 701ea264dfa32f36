use validator::Validate;

use crate::entities::AppUser;
use crate::result::FieldError;

/// Run whole-entity validation and flatten the outcome into per-field
/// errors. An empty vector means the entity passed.
pub fn validate_user(user: &AppUser) -> Vec<FieldError> {
    match user.validate() {
        Ok(()) => vec![],
        Err(errors) => errors
            .field_errors()
            .iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |v| FieldError {
                    field: field.to_string(),
                    message: v
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn valid_user() -> AppUser {
        AppUser {
            id: Uuid::new_v4(),
            username: "jane@example.com".to_string(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            image_id: None,
            security_stamp: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn valid_user_has_no_errors() {
        assert!(validate_user(&valid_user()).is_empty());
    }

    #[test]
    fn malformed_email_is_reported_on_the_email_field() {
        let mut user = valid_user();
        user.email = "not-an-address".to_string();
        let errors = validate_user(&user);
        assert!(errors.iter().any(|e| e.field == "email"));
    }

    #[test]
    fn empty_names_are_reported_per_field() {
        let mut user = valid_user();
        user.first_name.clear();
        user.last_name.clear();
        let errors = validate_user(&user);
        assert!(errors.iter().any(|e| e.field == "first_name"));
        assert!(errors.iter().any(|e| e.field == "last_name"));
    }

    #[test]
    fn merged_entity_is_judged_as_a_whole() {
        // A partial update that only changed the email still fails if the
        // untouched name fields were already bad.
        let mut user = valid_user();
        user.first_name.clear();
        user.email = "changed@example.com".to_string();
        assert!(!validate_user(&user).is_empty());
    }
}
