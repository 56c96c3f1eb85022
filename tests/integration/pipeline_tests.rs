use super::*;
use chrono::NaiveDate;
use pcpart_tracker::models::{PartCategory, Price, SearchScope};
use std::future;

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 17).unwrap()
}

#[tokio::test]
async fn test_update_stores_classified_listings() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let fetcher = Arc::new(stocked_fetcher());
    let (updater, repository) = create_test_updater(&config, fetcher.clone()).await?;

    let report = updater.run_on(run_date()).await?;

    let cpu = report.category(PartCategory::Cpu).unwrap();
    assert_eq!((cpu.found, cpu.stored, cpu.skipped, cpu.failed), (5, 4, 1, 0));
    let gpu = report.category(PartCategory::Gpu).unwrap();
    assert_eq!((gpu.found, gpu.stored), (2, 2));
    let boards = report.category(PartCategory::Motherboard).unwrap();
    assert_eq!((boards.found, boards.stored), (2, 2));
    assert_eq!(report.failed_categories().count(), 0);

    let cpus = repository
        .search(PartCategory::Cpu, None, SearchScope::AllObservations)
        .await?;
    let names: Vec<&str> = cpus.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "AMD Ryzen 9 9950X",
            "AMD Ryzen Threadripper PRO 7965WX",
            "Intel Core Ultra 9 285K",
            "Intel Core i5-13400F",
        ]
    );
    assert!(cpus.iter().all(|r| r.website == "newegg" && r.observed_on == run_date()));

    let ultra = &cpus[2];
    assert_eq!(ultra.brand, "Intel");
    assert_eq!(ultra.price, Price::Unavailable);
    assert_eq!(cpus[1].price, Price::Listed("3,299.00".to_string()));

    let gpus = repository
        .search(PartCategory::Gpu, Some("rtx 3060"), SearchScope::AllObservations)
        .await?;
    assert_eq!(gpus.len(), 1);
    assert_eq!(gpus[0].brand, "MSI");
    assert_eq!(gpus[0].name, "Refurbished MSI Gaming GeForce RTX 3060 12GB");

    Ok(())
}

#[tokio::test]
async fn test_first_page_is_fetched_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let fetcher = Arc::new(stocked_fetcher());
    let (updater, _repository) = create_test_updater(&config, fetcher.clone()).await?;

    updater.run_on(run_date()).await?;

    assert_eq!(
        fetcher.requests(),
        vec![
            CPU_CATALOG.to_string(),
            "https://shop.test/cpus?page=2".to_string(),
            GPU_CATALOG.to_string(),
            AMD_BOARD_CATALOG.to_string(),
            INTEL_BOARD_CATALOG.to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_repeated_update_appends_observations_only() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let (updater, repository) = create_test_updater(&config, Arc::new(stocked_fetcher())).await?;

    updater.run_on(run_date()).await?;
    updater.run_on(run_date().succ_opt().unwrap()).await?;

    let summary = repository.summary().await?;
    let counts: Vec<(i64, i64)> = summary.iter().map(|s| (s.parts, s.observations)).collect();
    assert_eq!(counts, vec![(4, 8), (2, 4), (2, 4)]);

    let latest = repository
        .search(PartCategory::Motherboard, Some("aorus"), SearchScope::LatestOnly)
        .await?;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].observed_on, run_date().succ_opt().unwrap());

    let history = repository.price_history(PartCategory::Motherboard, latest[0].part_id).await?;
    assert_eq!(history.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_is_isolated_to_its_category() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let fetcher = Arc::new(stocked_fetcher().failing("/gpus"));
    let (updater, repository) = create_test_updater(&config, fetcher).await?;

    let report = updater.run_on(run_date()).await?;

    let gpu = report.category(PartCategory::Gpu).unwrap();
    assert!(!gpu.success());
    assert_eq!(gpu.stored, 0);
    assert!(gpu.error.as_deref().unwrap().contains("503"));

    let summary = repository.summary().await?;
    assert_eq!(summary[0].parts, 4);
    assert_eq!(summary[1].parts, 0);
    assert_eq!(summary[2].parts, 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_pagination_fails_only_that_category() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let fetcher = Arc::new(stocked_fetcher().page(
        INTEL_BOARD_CATALOG,
        "<html><body><div class=\"item-cells-wrap\"></div></body></html>".to_string(),
    ));
    let (updater, repository) = create_test_updater(&config, fetcher).await?;

    let report = updater.run_on(run_date()).await?;

    let boards = report.category(PartCategory::Motherboard).unwrap();
    assert!(boards.error.as_deref().unwrap().contains("Pagination error"));
    assert_eq!(boards.stored, 0);

    // The AMD query walked fine, but a failed walk stores nothing for the category
    let summary = repository.summary().await?;
    assert_eq!(summary[2].observations, 0);
    assert_eq!(summary[0].parts, 4);
    Ok(())
}

#[tokio::test]
async fn test_every_category_failing_still_reports() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let (updater, repository) = create_test_updater(&config, Arc::new(StubFetcher::new())).await?;

    let report = updater.run_on(run_date()).await?;

    assert_eq!(report.failed_categories().count(), 3);
    assert_eq!(report.total_stored(), 0);
    assert!(repository.schema_ready().await?);
    Ok(())
}

#[tokio::test]
async fn test_unexpected_error_aborts_the_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let fetcher = Arc::new(stocked_fetcher().malformed("/gpus"));
    let (updater, repository) = create_test_updater(&config, fetcher.clone()).await?;

    let err = updater.run_on(run_date()).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    // CPUs ran before the failure and stay stored; motherboards were never walked
    let summary = repository.summary().await?;
    assert_eq!(summary[0].parts, 4);
    assert_eq!(summary[2].parts, 0);
    assert!(!fetcher.requests().iter().any(|url| url.contains("boards")));
    Ok(())
}

#[tokio::test]
async fn test_shutdown_interrupts_the_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let fetcher = Arc::new(stocked_fetcher());
    let (updater, _repository) = create_test_updater(&config, fetcher.clone()).await?;

    let err = updater.run_until(future::ready(())).await.unwrap_err();

    assert!(matches!(err, AppError::Interrupted));
    assert!(fetcher.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_completes_when_shutdown_never_fires() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = get_test_config(&dir);
    let (updater, _repository) = create_test_updater(&config, Arc::new(stocked_fetcher())).await?;

    let report = updater.run_until(future::pending()).await?;

    assert_eq!(report.total_stored(), 8);
    Ok(())
}
