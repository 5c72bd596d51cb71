//! In-memory fakes for the page source and messenger seams.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::services::{Messenger, OutboundMessage, PageSource};

/// Serves fixed HTML per URL; unknown URLs answer 404.
#[derive(Default)]
pub struct StaticPages {
    pages: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: String) -> Self {
        self.set_page(url, html);
        self
    }

    pub fn set_page(&self, url: &str, html: String) {
        self.pages.lock().unwrap().insert(url.to_string(), html);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for StaticPages {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Records every message and acknowledgement; can be told to fail sends.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<OutboundMessage>>,
    answers: Mutex<Vec<(String, String)>>,
    fail_sends: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<(String, String)> {
        self.answers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, message: &OutboundMessage) -> Result<()> {
        if self.fail_sends {
            return Err(AppError::telegram("sendMessage", "Too Many Requests"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn answer_action(&self, action_id: &str, text: &str) -> Result<()> {
        self.answers
            .lock()
            .unwrap()
            .push((action_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// A well-formed listing card with id `n`.
pub fn card_html(n: usize) -> String {
    format!(
        r#"<div data-marker="item" data-item-id="{n}">
             <a itemprop="url" href="/moskva/tovary/item_{n}?context=abc"><h3 itemprop="name">Item {n}</h3></a>
             <meta itemprop="price" content="{n}000">
             <p data-marker="item-date">{n} hours ago</p>
           </div>"#
    )
}

/// Normalized link of [`card_html`]`(n)`.
pub fn card_link(n: usize) -> String {
    format!("https://www.avito.ru/moskva/tovary/item_{n}")
}

pub fn page_html(cards: &[String]) -> String {
    format!(
        "<html><body><div data-marker=\"catalog-serp\">{}</div></body></html>",
        cards.join("\n")
    )
}

/// Serve one canned HTTP response on a local port.
///
/// Returns the URL to request and a task yielding the raw request, lowercased.
pub async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/search", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.ends_with(b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).to_lowercase()
    });

    (url, handle)
}
