//! Shared fixtures: configuration, driver factory and synthetic site pages

use anime_harvest::config::{Config, DriverEngine};
use anime_harvest::driver::HttpDriverFactory;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Short waits and a fast challenge poll so failures resolve quickly
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.driver.engine = DriverEngine::Http;
    config.pool.workers = 2;
    config.timeouts.detail_ready_secs = 1;
    config.timeouts.review_ready_secs = 1;
    config.timeouts.listing_ready_secs = 1;
    config.timeouts.challenge_poll_ms = 10;
    config
}

pub fn http_factory(config: &Config) -> Arc<HttpDriverFactory> {
    Arc::new(HttpDriverFactory::new(&config.driver).expect("Failed to build HTTP client"))
}

pub fn html(body: &str) -> String {
    format!("<html><head><title>MyAnimeList</title></head><body>{}</body></html>", body)
}

/// Serves `body` as an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

pub struct DetailFixture<'a> {
    pub title: &'a str,
    pub english: Option<&'a str>,
    pub cover: Option<&'a str>,
    pub score: &'a str,
    pub users: &'a str,
    pub ranked: &'a str,
    pub popularity: &'a str,
    pub members: &'a str,
}

impl Default for DetailFixture<'_> {
    fn default() -> Self {
        Self {
            title: "Cowboy Bebop",
            english: Some("Cowboy Bebop (EN)"),
            cover: Some("/images/anime/1.jpg"),
            score: "8.75",
            users: "1,234,567 users",
            ranked: "#12,345",
            popularity: "#43",
            members: "3,912,006",
        }
    }
}

/// An anime detail page
pub fn detail_page(fixture: &DetailFixture<'_>) -> String {
    let english = fixture
        .english
        .map(|e| format!(r#"<p class="title-english title-inherit">{}</p>"#, e))
        .unwrap_or_default();
    let cover = fixture
        .cover
        .map(|src| format!(r#"<img class="lazyloaded" src="{}" alt="cover">"#, src))
        .unwrap_or_default();

    html(&format!(
        r#"
        <div class="h1-title">
          <h1 class="title-name h1_bold_none"><strong>{title}</strong></h1>
          {english}
        </div>
        <div class="leftside">{cover}</div>
        <div class="rightside">
          <div class="score score-label-wrap" data-title="score" data-user="{users}">
            <div class="score-label score-8">{score}</div>
          </div>
          <span class="numbers ranked">Ranked <strong>{ranked}</strong></span>
          <span class="numbers popularity">Popularity <strong>{popularity}</strong></span>
          <span class="numbers members">Members <strong>{members}</strong></span>
          <p itemprop="description">In the year 2071, humanity has colonized the solar system.<br>The crew of the Bebop hunts bounties. [Written by MAL Rewrite]</p>
          <div class="genres">
            <a href="/anime/genre/1/Action"><span itemprop="genre">Action</span></a>
            <a href="/anime/genre/24/Sci-Fi"><span itemprop="genre">Sci-Fi</span></a>
          </div>
        </div>
        "#,
        title = fixture.title,
        english = english,
        cover = cover,
        users = fixture.users,
        score = fixture.score,
        ranked = fixture.ranked,
        popularity = fixture.popularity,
        members = fixture.members,
    ))
}

pub struct ReviewFixture<'a> {
    pub user: &'a str,
    pub date: &'a str,
    pub verdict: &'a str,
    pub body: &'a str,
}

fn review_entry(review: &ReviewFixture<'_>) -> String {
    format!(
        r#"
        <div class="review-element js-review-element">
          <div class="thumb"><a href="/profile/{user}"><img class="lazyloaded" src="/images/userimages/{user}.jpg"></a></div>
          <div class="body">
            <div class="username"><a href="/profile/{user}">{user}</a></div>
            <div class="update_at">{date}</div>
            <div class="tags"><div class="tag recommended">{verdict}</div><div class="tag">Preliminary</div></div>
            <div class="text">{body}</div>
          </div>
        </div>
        "#,
        user = review.user,
        date = review.date,
        verdict = review.verdict,
        body = review.body,
    )
}

/// A review listing page, with a "more reviews" link when `next` is given
pub fn review_page(anime: &str, reviews: &[ReviewFixture<'_>], next: Option<&str>) -> String {
    let entries: String = reviews.iter().map(review_entry).collect();
    let more = next
        .map(|href| {
            format!(
                r#"<a class="ga-click" data-ga-click-type="review-more-reviews" href="{}">More Reviews</a>"#,
                href
            )
        })
        .unwrap_or_default();

    html(&format!(
        r#"<h1 class="title-name"><strong>{}</strong></h1>
        <div class="review-list">{}</div>
        <div class="pagination">{}</div>"#,
        anime, entries, more
    ))
}

/// A ranking listing page linking to `/anime/<id>/Title_<id>` for each id
pub fn listing_page(ids: &[u32], consent: bool) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr class="ranking-list"><td class="title">
                <h3 class="anime_ranking_h3"><a class="hoverinfo_trigger" href="/anime/{id}/Title_{id}">Title {id}</a></h3>
                </td></tr>"#,
                id = id
            )
        })
        .collect();
    let banner = if consent {
        r#"<div class="consent"><a id="accept-btn" href="/consent/accept">Accept</a></div>"#
    } else {
        ""
    };

    html(&format!(
        r#"{}<table class="top-ranking-table">{}</table>"#,
        banner, rows
    ))
}
