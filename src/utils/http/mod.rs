use anyhow::{Result, bail};
use reqwest::{Client, Response};
use std::time::Duration;

/// Connect timeout for outbound API calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a `reqwest::Client` with a 5 s connect timeout and the given overall timeout.
///
/// Falls back to the default client if the builder fails.
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Download a response body as bytes with a size limit.
///
/// Rejects up front when `Content-Length` is over the limit, otherwise streams
/// and truncates at the limit. Returns `(bytes, was_truncated)`.
///
/// Errors never carry the request URL: it holds the access token.
pub async fn limited_body(resp: Response, max_bytes: usize) -> Result<(Vec<u8>, bool)> {
    if let Some(cl) = resp.content_length()
        && cl as usize > max_bytes
    {
        bail!(
            "response body too large: Content-Length {} exceeds limit {}",
            cl,
            max_bytes
        );
    }

    let mut buf = Vec::new();
    let mut stream = resp;
    while let Some(chunk) = stream.chunk().await.map_err(reqwest::Error::without_url)? {
        if buf.len() + chunk.len() > max_bytes {
            let remaining = max_bytes.saturating_sub(buf.len());
            buf.extend_from_slice(&chunk[..remaining]);
            return Ok((buf, true));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok((buf, false))
}

/// Same as [`limited_body`] but lossily decoded to a `String`, with a
/// `\n[truncated]` marker appended when the body was cut.
pub async fn limited_text(resp: Response, max_bytes: usize) -> Result<String> {
    let (bytes, truncated) = limited_body(resp, max_bytes).await?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if truncated {
        text.push_str("\n[truncated]");
    }
    Ok(text)
}
