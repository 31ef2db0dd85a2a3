//! Seed sample data for local development.
//!
//! Inserts a couple of farms with products and media. Safe to re-run:
//! rows are keyed by name and upserted.

use rust_decimal::Decimal;

use super::{CommandError, connect};

struct SeedProduct {
    name: &'static str,
    unit_price: Decimal,
    discount_price: Option<Decimal>,
    unit: &'static str,
    stock: i32,
    minimum_order: Option<i32>,
    image_url: &'static str,
}

struct SeedFarm {
    name: &'static str,
    products: Vec<SeedProduct>,
}

fn sample_farms() -> Vec<SeedFarm> {
    vec![
        SeedFarm {
            name: "Hilltop Farm",
            products: vec![
                SeedProduct {
                    name: "Heirloom Tomatoes",
                    unit_price: Decimal::new(450, 2),
                    discount_price: Some(Decimal::new(375, 2)),
                    unit: "kg",
                    stock: 40,
                    minimum_order: None,
                    image_url: "https://media.farmgate.market/hilltop/tomatoes.jpg",
                },
                SeedProduct {
                    name: "Rainbow Chard",
                    unit_price: Decimal::new(250, 2),
                    discount_price: None,
                    unit: "bunch",
                    stock: 25,
                    minimum_order: None,
                    image_url: "https://media.farmgate.market/hilltop/chard.jpg",
                },
            ],
        },
        SeedFarm {
            name: "Two Rivers Orchard",
            products: vec![
                SeedProduct {
                    name: "Cider Apples",
                    unit_price: Decimal::new(180, 2),
                    discount_price: None,
                    unit: "kg",
                    stock: 120,
                    minimum_order: Some(5),
                    image_url: "https://media.farmgate.market/two-rivers/apples.jpg",
                },
                SeedProduct {
                    name: "Wildflower Honey",
                    unit_price: Decimal::new(900, 2),
                    discount_price: None,
                    unit: "jar",
                    stock: 18,
                    minimum_order: None,
                    image_url: "https://media.farmgate.market/two-rivers/honey.jpg",
                },
            ],
        },
    ]
}

/// Insert the sample data.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    for farm in sample_farms() {
        let (farm_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO farms (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(farm.name)
        .fetch_one(&pool)
        .await?;

        for product in farm.products {
            let (product_id,): (i32,) = sqlx::query_as(
                r"
                INSERT INTO products
                    (farm_id, name, unit_price, discount_price, unit, stock, minimum_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (farm_id, name) DO UPDATE SET
                    unit_price = EXCLUDED.unit_price,
                    discount_price = EXCLUDED.discount_price,
                    unit = EXCLUDED.unit,
                    stock = EXCLUDED.stock,
                    minimum_order = EXCLUDED.minimum_order,
                    updated_at = NOW()
                RETURNING id
                ",
            )
            .bind(farm_id)
            .bind(product.name)
            .bind(product.unit_price)
            .bind(product.discount_price)
            .bind(product.unit)
            .bind(product.stock)
            .bind(product.minimum_order)
            .fetch_one(&pool)
            .await?;

            sqlx::query(
                r"
                INSERT INTO product_media (product_id, url, position)
                VALUES ($1, $2, 0)
                ON CONFLICT (product_id, position) DO UPDATE SET url = EXCLUDED.url
                ",
            )
            .bind(product_id)
            .bind(product.image_url)
            .execute(&pool)
            .await?;
        }

        tracing::info!(farm = farm.name, "seeded farm");
    }

    tracing::info!("Seed data complete");
    Ok(())
}
