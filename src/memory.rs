//! In-process stores used by the test suite in place of Postgres.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo::TokenStore,
    users::{
        repo::UserRepo,
        repo_types::{NewUser, ProfileChanges, User},
    },
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    tokens: Mutex<HashMap<Uuid, Uuid>>,
}

impl MemoryStore {
    pub fn token_count(&self, user_id: Uuid) -> usize {
        self.tokens
            .lock()
            .unwrap()
            .values()
            .filter(|owner| **owner == user_id)
            .count()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_wallet(&self, wallet_address: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.wallet_address == wallet_address)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new: &NewUser) -> anyhow::Result<Option<User>> {
        // Check and insert under one lock, like the unique index does.
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.wallet_address == new.wallet_address) {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            wallet_address: new.wallet_address.clone(),
            name: new.name.clone(),
            blood_type: new.blood_type,
            age: new.age,
            location: new.location.clone(),
            emergency_contact: new.emergency_contact.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn update(&self, id: Uuid, changes: &ProfileChanges) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        apply_changes(user, changes);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, token_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        self.tokens.lock().unwrap().insert(token_id, user_id);
        Ok(())
    }

    async fn owner_of(&self, token_id: Uuid) -> anyhow::Result<Option<Uuid>> {
        Ok(self.tokens.lock().unwrap().get(&token_id).copied())
    }
}

fn apply_changes(user: &mut User, changes: &ProfileChanges) {
    if let Some(name) = &changes.name {
        user.name = name.clone();
    }
    if let Some(blood_type) = changes.blood_type {
        user.blood_type = blood_type;
    }
    if let Some(age) = changes.age {
        user.age = age;
    }
    if let Some(location) = &changes.location {
        user.location = Some(location.clone());
    }
    if let Some(contact) = &changes.emergency_contact {
        user.emergency_contact = Some(contact.clone());
    }
}
