// src/db/users.rs

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{DateTime as BsonDateTime, Document, doc, oid::ObjectId},
};

use super::{USERS, bounded};
use crate::{
    error::AppError,
    models::user::{Role, Status, User},
};

/// Lookup criteria. Unset fields do not constrain the query.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
    pub status: Option<Status>,
}

impl UserFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, user: &User) -> bool {
        self.email.as_deref().is_none_or(|email| user.email == email)
            && self.status.is_none_or(|status| user.status == status)
    }

    fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(email) = &self.email {
            filter.insert("email", email.as_str());
        }
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        filter
    }
}

/// Resolved field changes. The password is already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub terms_and_conditions: Option<bool>,
}

impl UserChanges {
    /// Applies the changes to an in-memory record and bumps `updated_at`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password = hash.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(terms) = self.terms_and_conditions {
            user.terms_and_conditions = terms;
        }
        user.updated_at = Utc::now();
    }

    fn to_update(&self) -> Document {
        let mut set = doc! { "updated_at": BsonDateTime::from_chrono(Utc::now()) };
        if let Some(full_name) = &self.full_name {
            set.insert("full_name", full_name.as_str());
        }
        if let Some(email) = &self.email {
            set.insert("email", email.as_str());
        }
        if let Some(hash) = &self.password_hash {
            set.insert("password", hash.as_str());
        }
        if let Some(role) = self.role {
            set.insert("role", role.as_str());
        }
        if let Some(status) = self.status {
            set.insert("status", status.as_str());
        }
        if let Some(terms) = self.terms_and_conditions {
            set.insert("terms_and_conditions", terms);
        }
        doc! { "$set": set }
    }
}

/// Persistence of user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError>;

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;

    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// Returns false when no user has this id.
    async fn update(&self, id: ObjectId, changes: UserChanges) -> Result<bool, AppError>;

    /// Returns false when no user has this id.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        bounded(self.users.find_one(doc! { "_id": id })).await
    }

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, AppError> {
        bounded(self.users.find_one(filter.to_document())).await
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        bounded(async {
            let cursor = self.users.find(doc! {}).await?;
            let users: Vec<User> = cursor.try_collect().await?;
            Ok::<_, mongodb::error::Error>(users)
        })
        .await
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        bounded(self.users.insert_one(user)).await?;
        Ok(())
    }

    async fn update(&self, id: ObjectId, changes: UserChanges) -> Result<bool, AppError> {
        let result = bounded(self.users.update_one(doc! { "_id": id }, changes.to_update())).await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = bounded(self.users.delete_one(doc! { "_id": id })).await?;
        Ok(result.deleted_count > 0)
    }
}
