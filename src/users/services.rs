use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::Sessions, signature::verify_wallet_signature},
    error::{AppError, FieldErrors},
    state::AppState,
    users::{
        dto::{CreateProfileRequest, UpdateProfileRequest},
        repo::UserRepo,
        repo_types::User,
        validation::{check_required, check_wallet, validate_new_profile, validate_profile_changes},
    },
};

/// Result of a login attempt that did not fail outright.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated { token: String, user: User },
    /// The wallet is not registered yet; the client should create a profile.
    NeedsProfile,
}

/// Owns user records keyed by wallet address and the tokens issued for them.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepo>,
    sessions: Sessions,
}

impl FromRef<AppState> for IdentityService {
    fn from_ref(state: &AppState) -> Self {
        IdentityService::new(state.users.clone(), Sessions::from_ref(state))
    }
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepo>, sessions: Sessions) -> Self {
        Self { users, sessions }
    }

    /// Wallet address alone is the credential here; no proof of possession.
    pub async fn login_by_wallet(&self, wallet_address: Option<&str>) -> Result<LoginOutcome, AppError> {
        let mut errors = FieldErrors::new();
        let Some(wallet) = check_wallet(&mut errors, wallet_address) else {
            return Err(AppError::Validation(errors));
        };

        self.authenticate(&wallet).await
    }

    pub async fn login_by_signature(
        &self,
        wallet_address: Option<&str>,
        signature: Option<&str>,
        message: Option<&str>,
    ) -> Result<LoginOutcome, AppError> {
        let mut errors = FieldErrors::new();
        let wallet = check_wallet(&mut errors, wallet_address);
        check_required(&mut errors, "signature", signature);
        check_required(&mut errors, "message", message);
        let (Some(wallet), Some(signature), Some(message)) = (wallet, signature, message) else {
            return Err(AppError::Validation(errors));
        };
        errors.into_result()?;

        if let Err(e) = verify_wallet_signature(&wallet, message, signature) {
            warn!(wallet = %wallet, error = %e, "signature rejected");
            return Err(AppError::Unauthorized("Invalid signature".into()));
        }

        self.authenticate(&wallet).await
    }

    async fn authenticate(&self, wallet: &str) -> Result<LoginOutcome, AppError> {
        let Some(user) = self.users.find_by_wallet(wallet).await? else {
            info!(wallet = %wallet, "login for unregistered wallet");
            return Ok(LoginOutcome::NeedsProfile);
        };
        let token = self.sessions.issue(user.id).await?;
        info!(user_id = %user.id, "wallet login");
        Ok(LoginOutcome::Authenticated { token, user })
    }

    /// The only path that brings a user into existence.
    pub async fn create_profile(&self, req: &CreateProfileRequest) -> Result<(String, User), AppError> {
        let new = validate_new_profile(req)?;

        let Some(user) = self.users.insert(&new).await? else {
            warn!(wallet = %new.wallet_address, "wallet already registered");
            return Err(AppError::Conflict(
                "A profile already exists for this wallet address".into(),
            ));
        };

        let token = self.sessions.issue(user.id).await?;
        info!(user_id = %user.id, wallet = %user.wallet_address, "user registered");
        Ok((token, user))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let changes = validate_profile_changes(req)?;
        if changes.is_empty() {
            return self.get_profile(user_id).await;
        }

        let user = self
            .users
            .update(user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    /// Wallet addresses never change once set; re-binding the same one is a no-op.
    pub async fn bind_wallet(
        &self,
        caller: Uuid,
        user_id: Uuid,
        wallet_address: Option<&str>,
    ) -> Result<User, AppError> {
        if caller != user_id {
            return Err(AppError::Unauthorized(
                "Token does not belong to this user".into(),
            ));
        }
        let mut errors = FieldErrors::new();
        let wallet = check_wallet(&mut errors, wallet_address);
        errors.into_result()?;

        let user = self.get_profile(user_id).await?;
        match wallet {
            Some(w) if w == user.wallet_address => Ok(user),
            _ => {
                warn!(user_id = %user.id, "attempt to change wallet address");
                Err(AppError::Conflict(
                    "Wallet address is already set and cannot be changed".into(),
                ))
            }
        }
    }
}
