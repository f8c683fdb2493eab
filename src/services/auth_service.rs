use crate::entities::{Tier, profile_entity as profiles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_string();
        validate_username(&username)?;
        let email = normalize_email(&request.email)?;
        let phone_number = request.phone_number.unwrap_or_default().trim().to_string();
        validate_phone(&phone_number)?;

        if request.password != request.re_password {
            return Err(AppError::ValidationError(
                "The two password fields didn't match".to_string(),
            ));
        }
        validate_password(&request.password)?;

        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(&username))
            .one(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::ValidationError(
                "A user with that username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        // user and profile are created together or not at all
        let txn = self.pool.begin().await?;
        let user = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            phone_number: Set(phone_number),
            password_hash: Set(password_hash),
            is_customer: Set(true),
            is_staff: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.is_unique_violation() => AppError::ValidationError(
                "A user with that username already exists".to_string(),
            ),
            err => err,
        })?;

        let profile = profiles::ActiveModel {
            user_id: Set(user.id),
            points: Set(0),
            tier: Set(Tier::Bronze),
            shipping_address: Set(String::new()),
            city: Set(String::new()),
            zip_code: Set(String::new()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Registered user {} ({})", user.id, user.username);
        self.issue_tokens(user, Some(profile))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let profile = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user.id))
            .one(&self.pool)
            .await?;

        self.issue_tokens(user, profile)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;

        Ok(AuthResponse {
            access_token,
            refresh_token: None,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: None,
        })
    }

    fn issue_tokens(
        &self,
        user: users::Model,
        profile: Option<profiles::Model>,
    ) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.username)?;

        Ok(AuthResponse {
            access_token,
            refresh_token: Some(refresh_token),
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: Some(MeResponse::new(user, profile)),
        })
    }
}
