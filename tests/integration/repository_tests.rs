use super::*;
use chrono::NaiveDate;
use pcpart_tracker::models::{PartCategory, PartListing, Price, SearchScope};

fn listing(category: PartCategory, name: &str, brand: &str, price: Price) -> PartListing {
    PartListing {
        category,
        brand: brand.to_string(),
        name: name.to_string(),
        website: "newegg".to_string(),
        link: "https://shop.test/p/1".to_string(),
        price,
        observed_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    }
}

#[tokio::test]
async fn test_connect_creates_missing_directories() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("nested/data/parts.db").display()),
        max_connections: 1,
    };

    let repository = PartRepository::connect(&config).await?;
    repository.ensure_schema().await?;

    assert!(dir.path().join("nested/data/parts.db").exists());
    Ok(())
}

#[tokio::test]
async fn test_reads_require_update_first() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let repository = create_test_repository(&get_test_config(&dir)).await?;

    let err = repository
        .search(PartCategory::Gpu, Some("rtx"), SearchScope::LatestOnly)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SchemaNotInitialized { .. }));
    assert!(err.to_string().contains("Run `update` first"));

    assert!(repository.price_history(PartCategory::Cpu, 1).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_names_stay_unique_across_many_ingestions() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let repository = create_test_repository(&get_test_config(&dir)).await?;
    repository.ensure_schema().await?;

    let names = ["AMD Ryzen 5 5500", "AMD Ryzen 7 7800X3D", "AMD Ryzen 5 5500"];
    for round in 0..3 {
        for name in names {
            let price = if round == 1 {
                Price::Unavailable
            } else {
                Price::Listed("199.99".to_string())
            };
            repository.ingest(&listing(PartCategory::Cpu, name, "AMD", price)).await?;
        }
    }
    repository
        .ingest(&listing(PartCategory::Gpu, "AMD Ryzen 5 5500", "AMD", Price::Unavailable))
        .await?;

    let summary = repository.summary().await?;
    assert_eq!((summary[0].parts, summary[0].observations), (2, 9));
    assert_eq!((summary[1].parts, summary[1].observations), (1, 1));

    let latest = repository
        .search(PartCategory::Cpu, Some("5500"), SearchScope::LatestOnly)
        .await?;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].price, Price::Listed("199.99".to_string()));
    Ok(())
}
