use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::search::{self, UserSearch};

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_USER: &str = "User";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_block: bool,
    pub is_deleted: bool,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub project_assign: Option<i32>,
    pub created_at: OffsetDateTime,
}

/// Fields supplied when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Listing row: same record, selected without the password column.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub is_block: bool,
    pub is_deleted: bool,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub project_assign: Option<i32>,
    pub created_at: OffsetDateTime,
}

/// Minimal projection for pickers and avatars.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserCard {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, is_block, is_deleted,
                   name, address, phone, image, project_assign, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. Block/delete flags always start false regardless of
    /// what the caller sent.
    pub async fn create(db: &PgPool, new: &NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role, is_block, is_deleted, name, address, phone, image)
            VALUES ($1, $2, $3, FALSE, FALSE, $4, $5, $6, $7)
            RETURNING id, email, password_hash, role, is_block, is_deleted,
                      name, address, phone, image, project_assign, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.role)
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.phone)
        .bind(&new.image)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

/// List users matching the search filters, password excluded by projection.
pub async fn list(db: &PgPool, params: &UserSearch) -> anyhow::Result<Vec<UserListing>> {
    let mut qb = QueryBuilder::new(
        "SELECT id, email, role, is_block, is_deleted, name, address, phone, image, project_assign, created_at \
         FROM users WHERE TRUE",
    );
    search::apply_user_filters(&mut qb, params);
    let rows = qb.build_query_as::<UserListing>().fetch_all(db).await?;
    Ok(rows)
}

pub async fn list_cards(db: &PgPool) -> anyhow::Result<Vec<UserCard>> {
    let rows = sqlx::query_as::<_, UserCard>("SELECT id, name, image FROM users")
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Bump the assignment counter. Atomic, so concurrent assignments never lose
/// an increment.
pub async fn increment_assign(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE users SET project_assign = COALESCE(project_assign, 0) + 1 WHERE id = $1",
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: ROLE_USER.into(),
            is_block: false,
            is_deleted: false,
            name: Some("Ann".into()),
            address: None,
            phone: None,
            image: None,
            project_assign: Some(2),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["isBlock"], false);
        assert_eq!(json["projectAssign"], 2);
    }
}
