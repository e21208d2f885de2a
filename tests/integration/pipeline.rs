use crate::common::{
    detail_page, http_factory, listing_page, mount_page, review_page, test_config, DetailFixture,
    ReviewFixture,
};
use anime_harvest::discovery::{load_url_list, DETAIL_SCRAPER, REVIEW_SCRAPER, SNAPSHOT_FILE};
use anime_harvest::pipeline::{
    scrape_details, scrape_reviews, DetailRequest, DetailSource, ReviewRequest, ReviewSource,
};
use anime_harvest::{ConfigError, DetailRecord, HarvestError, ReviewRecord};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::MockServer;

fn review(user: &str) -> ReviewFixture<'_> {
    ReviewFixture {
        user,
        date: "Jan 5, 2020",
        verdict: "Recommended",
        body: "A classic.",
    }
}

/// Finds the single snapshot written under `<state_dir>/<scraper>`
fn snapshot(state_dir: &Path, scraper: &str) -> PathBuf {
    let folders: Vec<PathBuf> = std::fs::read_dir(state_dir.join(scraper))
        .expect("Snapshot folder missing")
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(folders.len(), 1);
    folders[0].join(SNAPSHOT_FILE)
}

#[tokio::test]
async fn test_reviews_from_target_snapshot() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/anime/1/Cowboy_Bebop/reviews",
        review_page("Cowboy Bebop", &[review("faye"), review("jet")], None),
    )
    .await;
    mount_page(
        &server,
        "/anime/5/Trigun/reviews",
        review_page("Trigun", &[review("vash")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let targets = dir.path().join("targets.json");
    std::fs::write(
        &targets,
        serde_json::to_string(&[
            format!("{}/anime/1/Cowboy_Bebop", base),
            format!("{}/anime/5/Trigun/", base),
        ])
        .unwrap(),
    )
    .unwrap();
    let output = dir.path().join("reviews.json");

    let request = ReviewRequest {
        source: ReviewSource::Targets(targets),
        output: output.clone(),
    };
    let config = test_config();
    let summary = scrape_reviews(http_factory(&config), &config, &request)
        .await
        .unwrap();

    assert_eq!(summary.targets, 2);
    assert_eq!(summary.records, 3);

    let json = std::fs::read_to_string(&output).unwrap();
    assert_eq!(summary.bytes, json.len() as u64);
    assert!(json.starts_with("[\n  {"));

    let records: Vec<ReviewRecord> = serde_json::from_str(&json).unwrap();
    let users: Vec<&str> = records.iter().map(|r| r.username.as_str()).collect();
    assert_eq!(users, vec!["faye", "jet", "vash"]);
    assert_eq!(records[2].page_url, format!("{}/anime/5/Trigun/", base));
}

#[tokio::test]
async fn test_reviews_from_listing_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/topanime.php", listing_page(&[1, 2], false)).await;
    mount_page(
        &server,
        "/anime/1/Title_1/reviews",
        review_page("Title 1", &[review("a")], None),
    )
    .await;
    mount_page(
        &server,
        "/anime/2/Title_2/reviews",
        review_page("Title 2", &[review("b")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let seeds = dir.path().join("sources.json");
    std::fs::write(&seeds, format!(r#"["{}/topanime.php"]"#, base)).unwrap();
    let output = dir.path().join("reviews.json");

    let mut config = test_config();
    config.discovery.listing_pages = 1;
    config.output.state_dir = dir.path().join("state");

    let request = ReviewRequest {
        source: ReviewSource::Listing { seeds: Some(seeds) },
        output: output.clone(),
    };
    let summary = scrape_reviews(http_factory(&config), &config, &request)
        .await
        .unwrap();

    assert_eq!(summary.records, 2);

    // Discovered anime pages are kept for a later --target-urls run
    let saved = load_url_list(&snapshot(&config.output.state_dir, REVIEW_SCRAPER)).unwrap();
    assert_eq!(
        saved,
        vec![
            format!("{}/anime/1/Title_1", base),
            format!("{}/anime/2/Title_2", base)
        ]
    );
}

#[tokio::test]
async fn test_details_from_review_export() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/anime/1/Cowboy_Bebop/",
        detail_page(&DetailFixture::default()),
    )
    .await;
    mount_page(
        &server,
        "/anime/5/Trigun/",
        detail_page(&DetailFixture {
            title: "Trigun",
            ..Default::default()
        }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    std::fs::write(
        &input,
        serde_json::json!([
            {"page_url": format!("{}/anime/5/Trigun/", base), "username": "vash"},
            {"page_url": format!("{}/anime/1/Cowboy_Bebop/", base), "username": "faye"},
            {"page_url": format!("{}/anime/5/Trigun/", base), "username": "wolfwood"}
        ])
        .to_string(),
    )
    .unwrap();
    let output = dir.path().join("details.json");

    let mut config = test_config();
    config.output.state_dir = dir.path().join("state");

    let request = DetailRequest {
        source: DetailSource::Reviews(input),
        output: output.clone(),
    };
    let summary = scrape_details(http_factory(&config), &config, &request)
        .await
        .unwrap();

    assert_eq!(summary.targets, 2);

    let records: Vec<DetailRecord> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.anime.as_str()).collect();
    assert_eq!(names, vec!["Trigun", "Cowboy Bebop"]);

    let saved = load_url_list(&snapshot(&config.output.state_dir, DETAIL_SCRAPER)).unwrap();
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn test_corrupt_url_snapshot_exports_empty_array() {
    let dir = TempDir::new().unwrap();
    let urls = dir.path().join("urls.json");
    std::fs::write(&urls, "not json").unwrap();
    let output = dir.path().join("details.json");

    let config = test_config();
    let request = DetailRequest {
        source: DetailSource::Urls(urls),
        output: output.clone(),
    };
    let summary = scrape_details(http_factory(&config), &config, &request)
        .await
        .unwrap();

    assert_eq!(summary.records, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]");
}

#[tokio::test]
async fn test_missing_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("details.json");

    let config = test_config();
    let request = DetailRequest {
        source: DetailSource::Reviews(dir.path().join("absent.json")),
        output: output.clone(),
    };
    let result = scrape_details(http_factory(&config), &config, &request).await;

    assert!(matches!(result, Err(HarvestError::MissingInput { .. })));
    assert!(!output.exists());

    let message = result.unwrap_err().to_string();
    assert!(message.starts_with("Input file not found: "));
    assert!(message.ends_with("absent.json"));
}

#[tokio::test]
async fn test_source_urls_must_be_http() {
    let dir = TempDir::new().unwrap();
    let seeds = dir.path().join("sources.json");
    std::fs::write(&seeds, r#"["ftp://example.com/topanime.php"]"#).unwrap();
    let output = dir.path().join("reviews.json");

    let mut config = test_config();
    config.output.state_dir = dir.path().join("state");

    let request = ReviewRequest {
        source: ReviewSource::Listing { seeds: Some(seeds) },
        output: output.clone(),
    };
    let result = scrape_reviews(http_factory(&config), &config, &request).await;

    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::InvalidUrl(_)))
    ));
    assert!(!output.exists());
    assert!(!config.output.state_dir.exists());
}
