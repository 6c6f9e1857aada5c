//! Demo catalog seeding.
//!
//! Inserts a small set of categories and products for local development.
//! Re-running is safe: categories upsert by name and products are skipped
//! when their category already has rows.

use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::CategoryId;

use super::CommandError;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    stock: i32,
    featured: bool,
}

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    products: &'static [SeedProduct],
}

const CATALOG: &[SeedCategory] = &[
    SeedCategory {
        name: "Furniture",
        description: "Desks, chairs, and shelving",
        products: &[
            SeedProduct {
                name: "Walnut Desk",
                description: "Solid walnut desk with cable tray",
                price: "449.00",
                stock: 12,
                featured: true,
            },
            SeedProduct {
                name: "Oak Bookshelf",
                description: "Five-shelf oak bookcase",
                price: "189.00",
                stock: 20,
                featured: false,
            },
        ],
    },
    SeedCategory {
        name: "Kitchen",
        description: "Cookware and tableware",
        products: &[
            SeedProduct {
                name: "Stoneware Mug",
                description: "12 oz stoneware mug, dishwasher safe",
                price: "14.50",
                stock: 80,
                featured: true,
            },
            SeedProduct {
                name: "Serving Tray",
                description: "Bamboo serving tray with handles",
                price: "24.50",
                stock: 35,
                featured: false,
            },
        ],
    },
];

/// Seed the catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    for category in CATALOG {
        let category_id = upsert_category(&pool, category).await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&pool)
                .await?;
        if existing > 0 {
            tracing::info!("Category {} already has products, skipping", category.name);
            continue;
        }

        for product in category.products {
            let price: Decimal = product
                .price
                .parse()
                .map_err(|_| CommandError::Invalid(format!("bad seed price {}", product.price)))?;

            sqlx::query(
                "INSERT INTO shop.products
                     (name, description, price, category_id, stock, is_featured)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(product.name)
            .bind(product.description)
            .bind(price)
            .bind(category_id)
            .bind(product.stock)
            .bind(product.featured)
            .execute(&pool)
            .await?;
        }

        tracing::info!(
            "Seeded {} products into {}",
            category.products.len(),
            category.name
        );
    }

    Ok(())
}

async fn upsert_category(
    pool: &PgPool,
    category: &SeedCategory,
) -> Result<CategoryId, CommandError> {
    let id = sqlx::query_scalar::<_, CategoryId>(
        "INSERT INTO shop.categories (name, description)
         VALUES ($1, $2)
         ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
         RETURNING id",
    )
    .bind(category.name)
    .bind(category.description)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
