use crate::entities::newsletter_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsletterRequest {
    #[schema(example = "fan@example.com")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsletterResponse {
    pub id: i32,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl From<newsletter_entity::Model> for NewsletterResponse {
    fn from(n: newsletter_entity::Model) -> Self {
        Self {
            id: n.id,
            email: n.email,
            subscribed_at: n.subscribed_at,
        }
    }
}
