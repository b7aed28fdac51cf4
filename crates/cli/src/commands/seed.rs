//! Seed the product catalog with sample beers.
//!
//! Intended for local development and demos. The command is a no-op when
//! the catalog already has products, so it is safe to run repeatedly.

use sqlx::PgPool;
use thiserror::Error;

use cerveceria_core::{BeerStyle, Pesos};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error(transparent)]
    MissingEnvVar(#[from] super::MissingEnvVar),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Pesos,
    stock: i32,
    style: BeerStyle,
    abv: f64,
    ibu: i32,
    format: &'static str,
}

const CATALOG: [SeedProduct; 6] = [
    SeedProduct {
        name: "Valdivia Hop Storm IPA",
        description: "IPA de lúpulos Cascade y Mosaic, con notas cítricas y resinosas.",
        price: Pesos::new(3_990),
        stock: 120,
        style: BeerStyle::Ipa,
        abv: 6.5,
        ibu: 62,
        format: "Botella 330ml",
    },
    SeedProduct {
        name: "Chiloé Stout Austral",
        description: "Stout seca de maltas tostadas, café y chocolate amargo.",
        price: Pesos::new(4_290),
        stock: 80,
        style: BeerStyle::Stout,
        abv: 5.8,
        ibu: 35,
        format: "Botella 330ml",
    },
    SeedProduct {
        name: "Atacama Lager Dorada",
        description: "Lager limpia y refrescante, fermentada en frío.",
        price: Pesos::new(2_890),
        stock: 200,
        style: BeerStyle::Lager,
        abv: 4.7,
        ibu: 18,
        format: "Lata 473ml",
    },
    SeedProduct {
        name: "Porter del Maule",
        description: "Porter inglesa con caramelo, regaliz y final seco.",
        price: Pesos::new(3_790),
        stock: 60,
        style: BeerStyle::Porter,
        abv: 5.4,
        ibu: 28,
        format: "Botella 330ml",
    },
    SeedProduct {
        name: "Pale Ale Cordillera",
        description: "Pale ale equilibrada, maltas caramelo y lúpulo nacional.",
        price: Pesos::new(3_290),
        stock: 150,
        style: BeerStyle::Ale,
        abv: 5.2,
        ibu: 30,
        format: "Lata 473ml",
    },
    SeedProduct {
        name: "IPA Doble Patagonia",
        description: "Double IPA intensa, cuerpo medio y amargor persistente.",
        price: Pesos::new(5_490),
        stock: 40,
        style: BeerStyle::Ipa,
        abv: 8.2,
        ibu: 85,
        format: "Botella 500ml",
    },
];

/// Insert the sample catalog if the products table is empty.
pub async fn products() -> Result<(), SeedError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        tracing::info!(
            products = existing,
            "Catalog already has products, skipping seed"
        );
        return Ok(());
    }

    for beer in &CATALOG {
        sqlx::query(
            r"
            INSERT INTO products (name, description, price, stock, style, abv, ibu, format)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(beer.name)
        .bind(beer.description)
        .bind(beer.price.amount())
        .bind(beer.stock)
        .bind(beer.style.as_str())
        .bind(beer.abv)
        .bind(beer.ibu)
        .bind(beer.format)
        .execute(&pool)
        .await?;

        tracing::info!(name = beer.name, "Seeded product");
    }

    tracing::info!(count = CATALOG.len(), "Catalog seeded!");
    Ok(())
}
