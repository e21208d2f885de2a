use crate::common::{http_factory, mount_page, review_page, test_config, ReviewFixture};
use anime_harvest::driver::ChallengeGate;
use anime_harvest::extract::ReviewExtractor;
use anime_harvest::{Config, ReviewRecord, WorkerPool};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REVIEWS_PATH: &str = "/anime/1/Cowboy_Bebop/reviews";

async fn scrape(config: &Config, targets: &[String]) -> Vec<ReviewRecord> {
    let pool = WorkerPool::new(
        http_factory(config),
        ChallengeGate::new(Duration::from_millis(10)),
        NonZeroUsize::new(config.pool.workers).unwrap(),
    );
    pool.run(targets, Arc::new(ReviewExtractor::new(config)))
        .await
        .concat()
}

/// Mounts a page that must only be served when its query parameter matches
async fn mount_continuation(server: &MockServer, page: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .and(query_param("p", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_reviews_across_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Continuations are mounted first so they win over the bare path
    mount_continuation(
        &server,
        "3",
        review_page("Cowboy Bebop", &[], None),
        0,
    )
    .await;
    mount_continuation(
        &server,
        "2",
        review_page(
            "Cowboy Bebop",
            &[ReviewFixture {
                user: "spike",
                date: "Mar 1, 2021",
                verdict: "Not Recommended",
                body: "Too much jazz.",
            }],
            Some("/anime/1/Cowboy_Bebop/reviews?p=3"),
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        REVIEWS_PATH,
        review_page(
            "Cowboy Bebop",
            &[
                ReviewFixture {
                    user: "faye",
                    date: "Jan 5, 2020",
                    verdict: "Recommended",
                    body: r#"The first half...<span class="js-hidden" style="display: none;"> and the rest.</span>"#,
                },
                ReviewFixture {
                    user: "jet",
                    date: "Sep 12, 2023 4:51 AM",
                    verdict: "Mixed Feelings",
                    body: "Great show.<br>Slow middle.",
                },
            ],
            Some("/anime/1/Cowboy_Bebop/reviews?p=2"),
        ),
    )
    .await;

    let config = test_config();
    let records = scrape(&config, &[format!("{}{}", base, REVIEWS_PATH)]).await;

    assert_eq!(records.len(), 3);

    let page_url = format!("{}/anime/1/Cowboy_Bebop/", base);
    assert!(records.iter().all(|r| r.page_url == page_url));
    assert!(records.iter().all(|r| r.anime == "Cowboy Bebop"));

    assert_eq!(records[0].username, "faye");
    assert_eq!(records[0].timestamp, 1_578_182_400);
    assert_eq!(records[0].feelings, 3);
    assert_eq!(records[0].review_text, "The first half and the rest.");
    assert_eq!(
        records[0].avatar,
        format!("{}/images/userimages/faye.jpg", base)
    );

    assert_eq!(records[1].username, "jet");
    assert_eq!(records[1].timestamp, 1_694_476_800);
    assert_eq!(records[1].feelings, 2);
    assert_eq!(records[1].review_text, "Great show. Slow middle.");

    assert_eq!(records[2].username, "spike");
    assert_eq!(records[2].timestamp, 1_614_556_800);
    assert_eq!(records[2].feelings, 1);
}

#[tokio::test]
async fn test_newlines_kept_when_disabled() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        REVIEWS_PATH,
        review_page(
            "Cowboy Bebop",
            &[ReviewFixture {
                user: "ed",
                date: "Dec 24, 2019",
                verdict: "Recommended",
                body: "Line one<br>Line two",
            }],
            None,
        ),
    )
    .await;

    let mut config = test_config();
    config.reviews.replace_newlines = false;
    let records = scrape(&config, &[format!("{}{}", server.uri(), REVIEWS_PATH)]).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].review_text, "Line one\nLine two");
    assert_eq!(records[0].timestamp, 1_577_145_600);
}

#[tokio::test]
async fn test_unknown_verdict_drops_only_that_review() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(review_page(
                    "Cowboy Bebop",
                    &[
                        ReviewFixture {
                            user: "vicious",
                            date: "Jan 5, 2020",
                            verdict: "Funny",
                            body: "Not a verdict.",
                        },
                        ReviewFixture {
                            user: "julia",
                            date: "Jan 5, 2020",
                            verdict: "Recommended",
                            body: "See you space cowboy.",
                        },
                    ],
                    None,
                ))
                .insert_header("content-type", "text/html"),
        )
        // The page is not reloaded for a bad record
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config();
    let records = scrape(&config, &[format!("{}{}", server.uri(), REVIEWS_PATH)]).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username, "julia");
}

#[tokio::test]
async fn test_review_retry_ceiling() {
    let server = MockServer::start().await;

    // Always failing page: attempted exactly four times
    Mock::given(method("GET"))
        .and(path("/anime/9/Broken/reviews"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.pool.workers = 1;
    let records = scrape(
        &config,
        &[format!("{}/anime/9/Broken/reviews", server.uri())],
    )
    .await;

    assert!(records.is_empty());
}
