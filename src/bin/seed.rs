//! Wipes and reseeds the users/posts tables with sample data for local
//! development. Destructive; never point it at anything you care about.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const USERS: &[&str] = &["alice@example.com", "bob@example.com"];

const POSTS: &[(&str, &str)] = &[
    ("Hello world!", "alice@example.com"),
    ("Axum + sqlx is awesome!", "alice@example.com"),
    ("Bob's first post", "bob@example.com"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "seed=info".to_string()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    seed(&db).await?;
    tracing::info!("database seeded");
    Ok(())
}

async fn seed(db: &PgPool) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;

    // posts first, FK order
    sqlx::query("DELETE FROM posts").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;

    for email in USERS {
        sqlx::query("INSERT INTO users (email) VALUES ($1)")
            .bind(email)
            .execute(&mut *tx)
            .await?;
    }

    for (content, email) in POSTS {
        sqlx::query(
            r#"
            INSERT INTO posts (content, user_id)
            SELECT $1, id FROM users WHERE email = $2
            "#,
        )
        .bind(content)
        .bind(email)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
