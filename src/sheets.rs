//! Google Sheets export download.
//!
//! A shared document link is turned into the xlsx export endpoint and fetched
//! over HTTPS. No Sheets API credentials involved: the document must be
//! link-readable.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use reqwest::StatusCode;
use tracing::{info, warn};

static DOC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").unwrap());
static GID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#&?]gid=(\d+)").unwrap());

const USER_AGENT: &str = "Mozilla/5.0 (compatible; orm-report/0.1)";
const TIMEOUT: Duration = Duration::from_secs(30);
const RETRIES: u32 = 3;

/// A parsed spreadsheet reference: document id plus optional sheet gid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub doc_id: String,
    pub gid: Option<String>,
}

impl SheetRef {
    /// Accepts edit, view and share links.
    pub fn parse(url: &str) -> Result<Self> {
        let doc_id = DOC_ID
            .captures(url)
            .map(|c| c[1].to_string())
            .ok_or_else(|| anyhow!("not a Google Sheets link: {url}"))?;
        let gid = GID.captures(url).map(|c| c[1].to_string());
        Ok(Self { doc_id, gid })
    }

    /// The xlsx export endpoint for this document.
    pub fn export_url(&self) -> String {
        let mut url = format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=xlsx",
            self.doc_id
        );
        if let Some(gid) = &self.gid {
            url.push_str(&format!("&gid={gid}"));
        }
        url
    }
}

/// Download the xlsx export of a shared spreadsheet. Retries transient
/// failures with linear backoff; access and not-found errors are final.
pub async fn download_export(sheet: &SheetRef) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
        .context("building http client")?;

    let url = sheet.export_url();
    let mut last_err = None;

    for attempt in 1..=RETRIES {
        match client.get(&url).send().await {
            Ok(resp) => match resp.status() {
                StatusCode::OK => {
                    let bytes = resp.bytes().await.context("reading export body")?;
                    info!("downloaded {} bytes for document {}", bytes.len(), sheet.doc_id);
                    return Ok(bytes.to_vec());
                }
                StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                    bail!("document {} is not link-readable (HTTP {})", sheet.doc_id, resp.status())
                }
                StatusCode::NOT_FOUND => {
                    bail!("document {} not found", sheet.doc_id)
                }
                status => {
                    warn!("attempt {attempt}: HTTP {status} for {url}");
                    last_err = Some(anyhow!("HTTP {status}"));
                }
            },
            Err(e) => {
                warn!("attempt {attempt}: {e}");
                last_err = Some(e.into());
            }
        }
        if attempt < RETRIES {
            tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("download failed")))
        .with_context(|| format!("downloading {url}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edit_link() {
        let r = SheetRef::parse(
            "https://docs.google.com/spreadsheets/d/1AbC-_xyz123/edit#gid=1234",
        )
        .unwrap();
        assert_eq!(r.doc_id, "1AbC-_xyz123");
        assert_eq!(r.gid.as_deref(), Some("1234"));
    }

    #[test]
    fn parses_share_link_without_gid() {
        let r = SheetRef::parse(
            "https://docs.google.com/spreadsheets/d/1AbC/edit?usp=sharing",
        )
        .unwrap();
        assert_eq!(r.doc_id, "1AbC");
        assert_eq!(r.gid, None);
    }

    #[test]
    fn rejects_foreign_urls() {
        assert!(SheetRef::parse("https://example.com/spreadsheet").is_err());
        assert!(SheetRef::parse("not a url").is_err());
    }

    #[test]
    fn export_url_shape() {
        let r = SheetRef {
            doc_id: "ID".into(),
            gid: Some("7".into()),
        };
        assert_eq!(
            r.export_url(),
            "https://docs.google.com/spreadsheets/d/ID/export?format=xlsx&gid=7"
        );
        let r = SheetRef { doc_id: "ID".into(), gid: None };
        assert_eq!(
            r.export_url(),
            "https://docs.google.com/spreadsheets/d/ID/export?format=xlsx"
        );
    }
}
