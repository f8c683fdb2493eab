use crate::entities::{Tier, profile_entity, user_entity};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "leo10")]
    pub username: String,
    #[schema(example = "leo@example.com")]
    pub email: String,
    #[schema(example = "goat-2022")]
    pub password: String,
    #[schema(example = "goat-2022")]
    pub re_password: String,
    #[schema(example = "+9779812345678")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "leo10")]
    pub username: String,
    #[schema(example = "goat-2022")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<MeResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub points: i64,
    pub tier: Tier,
    pub shipping_address: String,
    pub city: String,
    pub zip_code: String,
}

impl From<profile_entity::Model> for ProfileResponse {
    fn from(p: profile_entity::Model) -> Self {
        Self {
            points: p.points,
            tier: p.tier,
            shipping_address: p.shipping_address,
            city: p.city,
            zip_code: p.zip_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub profile: Option<ProfileResponse>,
}

impl MeResponse {
    pub fn new(user: user_entity::Model, profile: Option<profile_entity::Model>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            profile: profile.map(ProfileResponse::from),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    pub phone_number: Option<String>,
    pub shipping_address: Option<String>,
    pub city: Option<String>,
    #[schema(example = "44600")]
    pub zip_code: Option<String>,
}
