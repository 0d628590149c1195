// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::document::HtmlDocument;
use crate::error::Result;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(user_agent: &str, timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page asynchronously and parse it as an HTML document.
///
/// The final URL after redirects becomes the document URL.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<HtmlDocument> {
    let response = client.get(url).send().await?.error_for_status()?;
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let text = response.text().await?;

    let mut document = HtmlDocument::parse(&final_url, &text)?;
    if let Some(content_type) = content_type {
        document.apply_content_type_header(&content_type);
    }
    Ok(document)
}
