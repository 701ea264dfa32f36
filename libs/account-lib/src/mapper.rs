//! Field-by-field transforms between transfer shapes and `AppUser`.
//!
//! Updates overwrite fields on the loaded entity rather than patching by
//! diff, so whole-entity validation always sees the merged state.

use uuid::Uuid;

use crate::dto::{UserAddDto, UserProfileDto, UserUpdateDto};
use crate::entities::AppUser;

pub fn from_add_dto(dto: &UserAddDto) -> AppUser {
    AppUser {
        id: Uuid::new_v4(),
        username: dto.email.clone(),
        email: dto.email.clone(),
        first_name: dto.first_name.clone(),
        last_name: dto.last_name.clone(),
        image_id: None,
        security_stamp: Uuid::new_v4().to_string(),
    }
}

pub fn apply_update(user: &mut AppUser, dto: &UserUpdateDto) {
    user.email = dto.email.clone();
    user.first_name = dto.first_name.clone();
    user.last_name = dto.last_name.clone();
}

pub fn apply_profile(user: &mut AppUser, dto: &UserProfileDto) {
    user.email = dto.email.clone();
    user.first_name = dto.first_name.clone();
    user.last_name = dto.last_name.clone();
    user.image_id = dto.image_id;
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn existing_user() -> AppUser {
        AppUser {
            id: Uuid::new_v4(),
            username: "old@example.com".to_string(),
            email: "old@example.com".to_string(),
            first_name: "Old".to_string(),
            last_name: "Name".to_string(),
            image_id: Some(Uuid::new_v4()),
            security_stamp: "stamp-1".to_string(),
        }
    }

    #[test]
    fn add_dto_seeds_username_from_email() {
        let dto = UserAddDto {
            email: "new@example.com".to_string(),
            password: Secret::new("hunter2hunter2".to_string()),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
            role_ids: vec![],
        };
        let user = from_add_dto(&dto);
        assert_eq!(user.username, "new@example.com");
        assert_eq!(user.email, "new@example.com");
        assert!(!user.security_stamp.is_empty());
    }

    #[test]
    fn update_overwrites_fields_but_not_stamp_or_username() {
        let mut user = existing_user();
        let dto = UserUpdateDto {
            id: user.id,
            email: "new@example.com".to_string(),
            first_name: "New".to_string(),
            last_name: "Person".to_string(),
            role_ids: vec![],
        };
        apply_update(&mut user, &dto);
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.first_name, "New");
        // Username sync and stamp rotation are service sequencing, not mapping.
        assert_eq!(user.username, "old@example.com");
        assert_eq!(user.security_stamp, "stamp-1");
    }

    #[test]
    fn profile_overwrites_image_reference() {
        let mut user = existing_user();
        let dto = UserProfileDto {
            email: "old@example.com".to_string(),
            first_name: "Old".to_string(),
            last_name: "Name".to_string(),
            image_id: None,
        };
        apply_profile(&mut user, &dto);
        assert_eq!(user.image_id, None);
    }
}
