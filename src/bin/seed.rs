use std::str::FromStr;

use canteen_api::{
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = create_pool(&database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let user_id = ensure_user(&pool, "student@example.com", "student123").await?;
    seed_menu(&pool).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = [
        ("Masala Dosa", "Crisp dosa with spiced potato filling", "50.00", "veg"),
        ("Idli Vada", "Two idlis and a medu vada with chutney", "40.00", "veg"),
        ("Veg Meals", "Rice, sambar, rasam, poriyal and curd", "80.00", "veg"),
        ("Filter Coffee", "South Indian filter coffee", "20.00", "veg"),
        ("Chicken Biryani", "Dum biryani with raita", "120.00", "non-veg"),
        ("Egg Fried Rice", "Wok-tossed rice with scrambled egg", "70.00", "non-veg"),
        ("Chicken 65", "Spicy deep-fried chicken", "90.00", "non-veg"),
    ];

    for (name, desc, price, category) in items {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, description, price, category)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(Decimal::from_str(price)?)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}
