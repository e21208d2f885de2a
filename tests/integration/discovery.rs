use crate::common::{listing_page, mount_page, test_config};
use anime_harvest::discovery::ListingCrawler;
use anime_harvest::driver::{build_http_client, HttpDriver};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn driver() -> HttpDriver {
    HttpDriver::new(build_http_client("anime-harvest-test").unwrap())
}

/// Serves `ids` as the listing page at `route` with the given `limit` offset
async fn mount_listing_offset(server: &MockServer, route: &str, offset: &str, ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("limit", offset))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(ids, false))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn links(base: &str, ids: &[u32]) -> Vec<String> {
    ids.iter()
        .map(|id| format!("{}/anime/{}/Title_{}", base, id, id))
        .collect()
}

#[tokio::test]
async fn test_crawl_stops_at_scrape_limit_mid_page() {
    let server = MockServer::start().await;
    mount_listing_offset(&server, "/topanime.php", "50", &[6, 7, 8, 9, 10]).await;
    mount_page(&server, "/topanime.php", listing_page(&[1, 2, 3, 4, 5], false)).await;

    let crawler = ListingCrawler::new(2, 7, Duration::from_secs(1));
    let seeds = vec![format!("{}/topanime.php", server.uri())];

    let found = crawler.crawl(&mut driver(), &seeds).await;

    assert_eq!(found, links(&server.uri(), &[1, 2, 3, 4, 5, 6, 7]));
}

#[tokio::test]
async fn test_crawl_dedupes_across_pages_and_seeds() {
    let server = MockServer::start().await;
    mount_listing_offset(&server, "/topanime.php", "50", &[4, 5, 1, 6]).await;
    mount_page(&server, "/topanime.php", listing_page(&[1, 2, 3, 4], false)).await;
    mount_page(&server, "/popular.php", listing_page(&[6, 2, 7], false)).await;

    let crawler = ListingCrawler::new(2, 200, Duration::from_secs(1));
    let seeds = vec![
        format!("{}/topanime.php", server.uri()),
        format!("{}/popular.php", server.uri()),
    ];

    let found = crawler.crawl(&mut driver(), &seeds).await;

    // /popular.php?limit=50 also matches the bare route and repeats links already seen
    assert_eq!(found, links(&server.uri(), &[1, 2, 3, 4, 5, 6, 7]));
}

#[tokio::test]
async fn test_crawl_skips_unreachable_seed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.php"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/topanime.php", listing_page(&[1, 2], false)).await;

    let crawler = ListingCrawler::new(3, 200, Duration::from_secs(1));
    let seeds = vec![
        format!("{}/missing.php", server.uri()),
        format!("{}/topanime.php", server.uri()),
    ];

    let found = crawler.crawl(&mut driver(), &seeds).await;

    assert_eq!(found, links(&server.uri(), &[1, 2]));
}

#[tokio::test]
async fn test_consent_banner_dismissed_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/consent/accept"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Thanks</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/topanime.php", listing_page(&[1, 2], true)).await;

    let crawler = ListingCrawler::new(3, 200, Duration::from_secs(1));
    let seeds = vec![format!("{}/topanime.php", server.uri())];

    let found = crawler.crawl(&mut driver(), &seeds).await;

    assert_eq!(found, links(&server.uri(), &[1, 2]));
}

#[tokio::test]
async fn test_crawler_from_config() {
    let server = MockServer::start().await;
    mount_page(&server, "/topanime.php", listing_page(&[1, 2, 3], false)).await;

    let mut config = test_config();
    config.discovery.listing_pages = 1;
    config.discovery.scrape_limit = 2;

    let seeds = vec![format!("{}/topanime.php", server.uri())];
    let found = ListingCrawler::from_config(&config)
        .crawl(&mut driver(), &seeds)
        .await;

    assert_eq!(found, links(&server.uri(), &[1, 2]));
}
