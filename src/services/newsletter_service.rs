use crate::entities::newsletter_entity as newsletters;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::normalize_email;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct NewsletterService {
    pool: DatabaseConnection,
}

const ALREADY_SUBSCRIBED: &str = "This email is already subscribed";

impl NewsletterService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn subscribe(&self, request: NewsletterRequest) -> AppResult<NewsletterResponse> {
        let email = normalize_email(&request.email)?;

        let existing = newsletters::Entity::find()
            .filter(newsletters::Column::Email.eq(&email))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(ALREADY_SUBSCRIBED.to_string()));
        }

        let subscription = newsletters::ActiveModel {
            email: Set(email),
            subscribed_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.is_unique_violation() => {
                AppError::ValidationError(ALREADY_SUBSCRIBED.to_string())
            }
            err => err,
        })?;

        Ok(NewsletterResponse::from(subscription))
    }
}
