//! HTTP response helpers.
//!
//! [`Reply`] owns the request and adds headers common to every response
//! (`Access-Control-Allow-Origin`) before sending.

use crate::utils::mime::types::{HTML, PLAIN};
use anyhow::{Result, anyhow};
use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// A request waiting for its response.
pub struct Reply {
    request: Request,
    cors: Option<Header>,
}

impl Reply {
    /// Wrap `request`, echoing `allow_origin` on every response when set.
    pub fn new(request: Request, allow_origin: Option<&str>) -> Self {
        let cors = allow_origin.and_then(|origin| {
            make_header("Access-Control-Allow-Origin", origin)
                .inspect_err(|e| crate::debug!("serve"; "{e}"))
                .ok()
        });
        Self { request, cors }
    }

    pub fn url(&self) -> &str {
        self.request.url()
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// First value of the named request header.
    pub fn header(&self, name: &str) -> Option<String> {
        self.request
            .headers()
            .iter()
            .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
            .map(|h| h.value.to_string())
    }

    fn send<R: Read>(self, mut response: Response<R>) -> Result<()> {
        if let Some(cors) = self.cors {
            response.add_header(cors);
        }
        self.request.respond(response)?;
        Ok(())
    }

    /// 200 with an empty body.
    pub fn empty(self) -> Result<()> {
        self.send(Response::empty(StatusCode(200)))
    }

    /// Generated page that must not be cached.
    pub fn html(self, body: String) -> Result<()> {
        let response = Response::from_string(body)
            .with_header(make_header("Content-Type", HTML)?)
            .with_header(make_header("Cache-Control", "no-store")?);
        self.send(response)
    }

    /// Plain text error response.
    pub fn error(self, status: u16, message: impl Display) -> Result<()> {
        let response = Response::from_string(message.to_string())
            .with_status_code(StatusCode(status))
            .with_header(make_header("Content-Type", PLAIN)?)
            .with_header(make_header("X-Content-Type-Options", "nosniff")?);
        self.send(response)
    }

    pub fn not_found(self) -> Result<()> {
        self.error(404, "404 page not found")
    }

    /// Redirect to `location` (relative or absolute URL).
    pub fn redirect(self, status: u16, location: &str) -> Result<()> {
        let response = Response::empty(StatusCode(status))
            .with_header(make_header("Location", location)?);
        self.send(response)
    }

    /// Stream a file, honoring a `Range: bytes=` request header.
    pub fn file(self, mut file: File, content_type: &str, no_store: bool) -> Result<()> {
        let size = file.metadata()?.len();
        let mut headers = vec![
            make_header("Content-Type", content_type)?,
            make_header("Accept-Ranges", "bytes")?,
        ];
        if no_store {
            headers.push(make_header("Cache-Control", "no-store")?);
        }

        let range = self
            .header("range")
            .and_then(|r| r.trim().strip_prefix("bytes=").map(str::to_owned));

        let Some(range) = range else {
            let response = Response::new(StatusCode(200), headers, file, Some(size as usize), None);
            return self.send(response);
        };

        let Some((start, end)) = parse_range(&range, size) else {
            headers.push(make_header("Content-Range", &format!("bytes */{size}"))?);
            let response = Response::new(StatusCode(416), headers, std::io::empty(), Some(0), None);
            return self.send(response);
        };

        let length = end - start + 1;
        file.seek(SeekFrom::Start(start))?;
        headers.push(make_header("Content-Range", &format!("bytes {start}-{end}/{size}"))?);
        let response = Response::new(
            StatusCode(206),
            headers,
            file.take(length),
            Some(length as usize),
            None,
        );
        self.send(response)
    }
}

/// Parse a single `start-end` byte range against `size`.
///
/// Returns inclusive bounds, or `None` when the range cannot be satisfied.
/// Multiple ranges are not supported; only the first is used.
pub fn parse_range(range: &str, size: u64) -> Option<(u64, u64)> {
    let first = range.split(',').next()?.trim();
    let (start, end) = first.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());
    if size == 0 {
        return None;
    }
    let last = size - 1;

    match (start.is_empty(), end.is_empty()) {
        // "-500": last 500 bytes
        (true, false) => {
            let suffix: u64 = end.parse().ok()?;
            if suffix == 0 {
                return None;
            }
            Some((size.saturating_sub(suffix), last))
        }
        // "100-": from 100 to the end
        (false, true) => {
            let start: u64 = start.parse().ok()?;
            (start <= last).then_some((start, last))
        }
        // "0-499"
        (false, false) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            (start <= end && start <= last).then_some((start, end.min(last)))
        }
        (true, true) => None,
    }
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
