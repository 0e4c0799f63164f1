#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use archive_engine::{FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher};

pub const SITE: &str = "https://site.test";
pub const THREAD: &str = "https://site.test/forum/thread/abc";

/// In-memory site: URL -> (status, body). Unknown URLs are 404.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, (u16, Vec<u8>)>,
    requests: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), (200, html.into().into_bytes()));
        self
    }

    pub fn bytes(mut self, url: impl Into<String>, body: &[u8]) -> Self {
        self.pages.insert(url.into(), (200, body.to_vec()));
        self
    }

    pub fn status(mut self, url: impl Into<String>, code: u16) -> Self {
        self.pages.insert(url.into(), (code, Vec::new()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, url: &str) -> bool {
        self.requests().iter().any(|r| r == url)
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some((status, body)) if (200..300).contains(status) => Ok(FetchOutput {
                bytes: body.clone(),
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    content_type: Some("text/html; charset=utf-8".into()),
                    byte_len: body.len() as u64,
                },
            }),
            Some((status, _)) => Err(FetchError::new(
                FailureKind::HttpStatus(*status),
                format!("status {status}"),
            )),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), "not found")),
        }
    }
}

pub fn document(items: &[String]) -> String {
    format!("<html><body>{}</body></html>", items.concat())
}

pub fn journal(title: &str, body: &str) -> String {
    format!(
        r#"<div class="media-content"><h3 class="feed-item-title"><a href="/j">{title}</a></h3><p class="post-tag-label">News</p><div class="post-content">{body}</div><p class="overall-mod" data-value="3"></p></div>"#
    )
}

pub fn status_update(text: &str) -> String {
    format!(
        r#"<div class="media-content"><p class="post-tag-label">Status</p><div class="post-content">{text}</div></div>"#
    )
}

pub fn post(poster: &str, number: &str, stamp: &str, body: &str) -> String {
    format!(
        r#"<div class="media-content"><a href="/user/{poster}">{poster}</a><a href="{number}">{number}</a><p class="post-stamp" title="{stamp}">ago</p><div class="post-body">{body}</div><p class="overall-mod" data-value="1"></p></div>"#
    )
}

pub fn thread_root(title: &str, last_page: usize) -> String {
    let items: String = (1..=last_page)
        .map(|n| {
            if n == 1 {
                format!(r#"<li class="active"><a>{n}</a></li>"#)
            } else {
                format!(r#"<li><a href="?page={n}">{n}</a></li>"#)
            }
        })
        .collect();
    format!(
        r#"<html><body><h1 class="content-title">{title}</h1><section class="pagination"><ul>{items}<li class="next"><a>Next</a></li></ul></section></body></html>"#
    )
}

pub fn feed_url(user: &str, page: usize) -> String {
    format!("{SITE}/user/{user}?page={page}")
}

pub fn thread_page(page: usize) -> String {
    format!("{THREAD}?page={page}")
}

/// Number of records in a written chunk file.
pub fn records_in(path: &Path) -> usize {
    std::fs::read_to_string(path).unwrap().matches("<hr>").count()
}
