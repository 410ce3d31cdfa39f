use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, is_admin
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, is_admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find-or-create for a login, promoting allow-listed admins.
    ///
    /// Runs as one transaction so create-then-promote is atomic; the unique
    /// index on `email` keeps repeated logins from creating a second row.
    pub async fn find_or_create_for_login(
        db: &PgPool,
        email: &str,
        grant_admin: bool,
    ) -> anyhow::Result<User> {
        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, is_admin
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;

        let user = match existing {
            Some(user) if grant_admin && !user.is_admin => {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET is_admin = TRUE
                    WHERE id = $1
                    RETURNING id, email, is_admin
                    "#,
                )
                .bind(user.id)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(user) => user,
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (email, is_admin)
                    VALUES ($1, $2)
                    RETURNING id, email, is_admin
                    "#,
                )
                .bind(email)
                .bind(grant_admin)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(user)
    }
}
