//! Integration tests for anime-harvest
//!
//! These tests use wiremock to serve a synthetic copy of the scraped site and drive
//! it through the HTTP driver end-to-end.

mod common;
mod discovery;
mod pipeline;
mod reviews;
