use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    #[default]
    Patient,
    Doctor,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    #[serde(skip)]
    #[ts(skip)]
    pub salt: String,
    pub role: UserRole,
    pub doctor_id: Option<Uuid>,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: UserRole,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, salt, role, doctor_id, avatar_path, created_at, updated_at";

impl User {
    pub async fn create(pool: &SqlitePool, data: &CreateUser) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO users (id, username, email, password_hash, salt, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.salt)
        .bind(&data.role)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_email(
        pool: &SqlitePool,
        id: Uuid,
        email: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE users SET email = $2, updated_at = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(email)
        .fetch_one(pool)
        .await
    }

    pub async fn set_avatar_path(
        pool: &SqlitePool,
        id: Uuid,
        avatar_path: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET avatar_path = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(avatar_path)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Link a patient to a doctor. Only touches rows that are still unassigned.
    pub async fn assign_doctor(
        pool: &SqlitePool,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET doctor_id = $2, updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND role = 'patient' AND doctor_id IS NULL",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_patients_of(
        pool: &SqlitePool,
        doctor_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE doctor_id = $1
             ORDER BY username ASC"
        ))
        .bind(doctor_id)
        .fetch_all(pool)
        .await
    }
}
