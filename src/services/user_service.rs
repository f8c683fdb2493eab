use crate::entities::{Tier, profile_entity as profiles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_phone;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

/// Fetches the user's profile, creating an empty one for accounts that predate profiles.
pub(crate) async fn get_or_create_profile<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<profiles::Model> {
    if let Some(profile) = profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(profile);
    }

    Ok(profiles::ActiveModel {
        user_id: Set(user_id),
        points: Set(0),
        tier: Set(Tier::Bronze),
        shipping_address: Set(String::new()),
        city: Set(String::new()),
        zip_code: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_me(&self, user_id: i32) -> AppResult<MeResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let profile = get_or_create_profile(&self.pool, user_id).await?;

        Ok(MeResponse::new(user, Some(profile)))
    }

    pub async fn update_me(&self, user_id: i32, request: UpdateMeRequest) -> AppResult<MeResponse> {
        let phone_number = request.phone_number.map(|p| p.trim().to_string());
        if let Some(phone) = &phone_number {
            validate_phone(phone)?;
        }

        let txn = self.pool.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let user = match phone_number {
            Some(phone) => {
                let mut active = user.into_active_model();
                active.phone_number = Set(phone);
                active.updated_at = Set(Utc::now());
                active.update(&txn).await?
            }
            None => user,
        };

        let profile = get_or_create_profile(&txn, user_id).await?;
        let profile = if request.shipping_address.is_some()
            || request.city.is_some()
            || request.zip_code.is_some()
        {
            let mut active = profile.into_active_model();
            if let Some(v) = request.shipping_address {
                active.shipping_address = Set(v.trim().to_string());
            }
            if let Some(v) = request.city {
                active.city = Set(v.trim().to_string());
            }
            if let Some(v) = request.zip_code {
                active.zip_code = Set(v.trim().to_string());
            }
            active.update(&txn).await?
        } else {
            profile
        };

        txn.commit().await?;
        Ok(MeResponse::new(user, Some(profile)))
    }
}
