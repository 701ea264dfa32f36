use serde::{Deserialize, Serialize};

/// Subject representation from the identity admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUserRep {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

/// Request body for creating a subject. The id is chosen by the service so
/// the store and the provider agree on it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentityUserRequest {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub security_stamp: String,
    pub enabled: bool,
    pub credentials: Vec<IdentityCredential>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCredential {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: String,
    pub temporary: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdentityUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub security_stamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}

/// Replace-set role assignment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolesRequest {
    pub role_ids: Vec<String>,
}

/// Token response from the provider's OIDC endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Structured rejection body: `{ "errors": [{ "code", "description" }] }`.
#[derive(Debug, Deserialize)]
pub struct RejectionBody {
    #[serde(default)]
    pub errors: Vec<RemoteError>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteError {
    pub code: String,
    pub description: String,
}
