use secrecy::Secret;

const IDENTITY_URL: &str = "IDENTITY_URL";
const IDENTITY_REALM: &str = "IDENTITY_REALM";
const IDENTITY_CLIENT_ID: &str = "IDENTITY_CLIENT_ID";
const IDENTITY_CLIENT_SECRET: &str = "IDENTITY_CLIENT_SECRET";

const DEFAULT_IDENTITY_URL: &str = "http://localhost:18080";
const DEFAULT_IDENTITY_REALM: &str = "article";
const DEFAULT_IDENTITY_CLIENT_ID: &str = "admin-api-service";

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(IDENTITY_URL).unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string());
        let realm =
            std::env::var(IDENTITY_REALM).unwrap_or_else(|_| DEFAULT_IDENTITY_REALM.to_string());
        let client_id = std::env::var(IDENTITY_CLIENT_ID)
            .unwrap_or_else(|_| DEFAULT_IDENTITY_CLIENT_ID.to_string());
        let client_secret = Secret::new(std::env::var(IDENTITY_CLIENT_SECRET).unwrap_or_default());

        Self {
            base_url,
            realm,
            client_id,
            client_secret,
        }
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url, self.realm
        )
    }

    pub fn admin_users_url(&self) -> String {
        format!("{}/admin/realms/{}/users", self.base_url, self.realm)
    }

    pub fn admin_user_url(&self, user_id: &str) -> String {
        format!(
            "{}/admin/realms/{}/users/{}",
            self.base_url, self.realm, user_id
        )
    }

    pub fn admin_user_roles_url(&self, user_id: &str) -> String {
        format!(
            "{}/admin/realms/{}/users/{}/roles",
            self.base_url, self.realm, user_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IdentityConfig {
        IdentityConfig {
            base_url: "http://idp:8080".to_string(),
            realm: "article".to_string(),
            client_id: "admin-api-service".to_string(),
            client_secret: Secret::new("s3cret".to_string()),
        }
    }

    #[test]
    fn urls_are_realm_scoped() {
        let cfg = config();
        assert_eq!(
            cfg.token_url(),
            "http://idp:8080/realms/article/protocol/openid-connect/token"
        );
        assert_eq!(
            cfg.admin_user_url("abc"),
            "http://idp:8080/admin/realms/article/users/abc"
        );
        assert_eq!(
            cfg.admin_user_roles_url("abc"),
            "http://idp:8080/admin/realms/article/users/abc/roles"
        );
    }
}
