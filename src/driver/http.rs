//! Static HTML driver
//!
//! This driver fetches pages with `reqwest` and queries them with `scraper`. It runs
//! no JavaScript, so it suits server-rendered sites and the test-suite. Element
//! handles are snapshots of the element's outer HTML taken when they were found.

use crate::config::DriverConfig;
use crate::driver::{DriverError, DriverFactory, DriverResult, PageDriver, PageElement};
use crate::url::resolve_link;
use async_trait::async_trait;
use reqwest::Client;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Attributes resolved against the page URL before being returned
const URL_ATTRIBUTES: &[&str] = &["href", "src"];

/// Builds the HTTP client shared by every session of a factory
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Opens [`HttpDriver`] sessions
#[derive(Debug, Clone)]
pub struct HttpDriverFactory {
    client: Client,
}

impl HttpDriverFactory {
    pub fn new(config: &DriverConfig) -> DriverResult<Self> {
        Ok(Self {
            client: build_http_client(&config.user_agent)?,
        })
    }
}

#[async_trait]
impl DriverFactory for HttpDriverFactory {
    type Driver = HttpDriver;

    async fn open(&self, worker: usize) -> DriverResult<HttpDriver> {
        tracing::debug!(worker, "Opening HTTP session");
        Ok(HttpDriver::new(self.client.clone()))
    }
}

/// The page currently loaded in an [`HttpDriver`]
#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    body: String,
}

/// A session that loads one static HTML page at a time
#[derive(Debug)]
pub struct HttpDriver {
    client: Client,
    page: Option<LoadedPage>,
}

impl HttpDriver {
    pub fn new(client: Client) -> Self {
        Self { client, page: None }
    }

    fn select_page(&self, selector: &str) -> DriverResult<Vec<HtmlElement>> {
        let Some(page) = &self.page else {
            return Ok(Vec::new());
        };

        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&page.body);

        Ok(document
            .select(&selector)
            .map(|element| HtmlElement::new(element.html(), page.url.clone()))
            .collect())
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    type Element = HtmlElement;

    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DriverError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await?;

        self.page = Some(LoadedPage {
            url: final_url,
            body,
        });
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self
            .page
            .as_ref()
            .map(|page| page.url.to_string())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn find_all(&self, selector: &str) -> DriverResult<Vec<HtmlElement>> {
        self.select_page(selector)
    }

    /// Follows the element's link; anything without an `href` cannot be clicked
    async fn click(&mut self, element: &HtmlElement) -> DriverResult<()> {
        match element.attribute("href").await? {
            Some(target) => self.navigate(&target).await,
            None => Err(DriverError::Unsupported(
                "clicking elements without a link needs a browser".to_string(),
            )),
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.page = None;
        Ok(())
    }
}

/// Snapshot of an element found by [`HttpDriver`]
#[derive(Debug, Clone)]
pub struct HtmlElement {
    html: String,
    base_url: Url,
}

impl HtmlElement {
    pub fn new(html: String, base_url: Url) -> Self {
        Self { html, base_url }
    }

    /// Runs `f` on the element re-parsed from its snapshot
    fn with_root<R>(&self, f: impl FnOnce(ElementRef<'_>) -> R) -> DriverResult<R> {
        let fragment = Html::parse_fragment(&self.html);
        let root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: "<snapshot root>".to_string(),
            })?;
        Ok(f(root))
    }

    fn visible_text(&self) -> DriverResult<String> {
        self.with_root(|root| {
            let mut raw = String::new();
            collect_visible_text(root, &mut raw);
            tidy_text(&raw)
        })
    }

    fn raw_text(&self) -> DriverResult<String> {
        self.with_root(|root| root.text().collect::<String>())
    }

    fn read_attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.with_root(|root| {
            root.value().attr(name).map(|value| {
                if URL_ATTRIBUTES.contains(&name) {
                    resolve_link(value, &self.base_url).unwrap_or_else(|| value.to_string())
                } else {
                    value.to_string()
                }
            })
        })
    }

    fn select(&self, selector: &str) -> DriverResult<Vec<HtmlElement>> {
        let selector = parse_selector(selector)?;
        self.with_root(|root| {
            root.select(&selector)
                .map(|element| HtmlElement::new(element.html(), self.base_url.clone()))
                .collect()
        })
    }
}

#[async_trait]
impl PageElement for HtmlElement {
    async fn text(&self) -> DriverResult<String> {
        self.visible_text()
    }

    async fn text_content(&self) -> DriverResult<String> {
        self.raw_text()
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.read_attribute(name)
    }

    async fn find_all(&self, selector: &str) -> DriverResult<Vec<HtmlElement>> {
        self.select(selector)
    }
}

fn parse_selector(selector: &str) -> DriverResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| DriverError::InvalidSelector(format!("{}: {:?}", selector, e)))
}

/// Elements that never render and whose subtree is skipped by `text`
fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();

    if matches!(value.name(), "script" | "style" | "template") {
        return true;
    }

    if value.attr("hidden").is_some() {
        return true;
    }

    value
        .attr("style")
        .map(|style| {
            style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase()
                .contains("display:none")
        })
        .unwrap_or(false)
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_hidden(child) {
                    continue;
                }
                match child.value().name() {
                    "br" => out.push('\n'),
                    "p" | "div" | "li" => {
                        out.push('\n');
                        collect_visible_text(child, out);
                        out.push('\n');
                    }
                    _ => collect_visible_text(child, out),
                }
            }
            _ => {}
        }
    }
}

/// Collapses source formatting the way a browser renders it: runs of spaces become
/// one, lines are trimmed, blank lines are dropped
fn tidy_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
