// ABOUTME: Low-level resource fetching shared by the feed and page fetchers.
// ABOUTME: Handles URL validation, the private-network guard, size limits, header capture, and charset decoding.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use reqwest::redirect::Policy;
use tracing::debug;
use url::{Host, Url};

use crate::error::UpstreamFetchError;
use crate::TARGET_WEB_REQUEST;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    /// Return non-2xx responses instead of failing with a Status error.
    pub accept_non_success: bool,
    /// The client does not decompress, so the body is decoded here from its
    /// `Content-Encoding` and the response headers are left as sent.
    pub decode_content_encoding: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the charset from the content-type header
    /// or detection when none is declared.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

const PRIVATE_V4: [Ipv4Net; 5] = [
    Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 8),
    Ipv4Net::new_assert(Ipv4Addr::new(172, 16, 0, 0), 12),
    Ipv4Net::new_assert(Ipv4Addr::new(192, 168, 0, 0), 16),
    // Loopback
    Ipv4Net::new_assert(Ipv4Addr::new(127, 0, 0, 0), 8),
    // Link-local
    Ipv4Net::new_assert(Ipv4Addr::new(169, 254, 0, 0), 16),
];

const PRIVATE_V6: [Ipv6Net; 2] = [
    // Unique local fc00::/7
    Ipv6Net::new_assert(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    // Link-local fe80::/10
    Ipv6Net::new_assert(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
];

/// Check if an IP address is loopback, private, link-local, or unspecified.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => ip.is_unspecified() || PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => {
            if let Some(mapped) = ip.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(mapped));
            }
            ip.is_loopback() || ip.is_unspecified() || PRIVATE_V6.iter().any(|net| net.contains(ip))
        }
    }
}

/// Error handed to reqwest when a redirect hop targets a private address.
#[derive(Debug)]
pub(crate) struct BlockedRedirect(pub(crate) String);

impl fmt::Display for BlockedRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to private address {} blocked", self.0)
    }
}

impl std::error::Error for BlockedRedirect {}

/// True when `target` names a private IP literal or `localhost`.
///
/// Runs inside the redirect policy, which cannot await, so hostnames are not
/// resolved here; the final URL still goes through [`ensure_public_host`].
pub(crate) fn is_private_literal_host(target: &Url) -> bool {
    match target.host() {
        Some(Host::Ipv4(ip)) => is_private_ip(&IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_private_ip(&IpAddr::V6(ip)),
        Some(Host::Domain(name)) => {
            name.eq_ignore_ascii_case("localhost") || name.to_ascii_lowercase().ends_with(".localhost")
        }
        None => false,
    }
}

/// Redirect policy that refuses hops to private literals.
pub(crate) fn redirect_policy(allow_private_networks: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if !allow_private_networks && is_private_literal_host(attempt.url()) {
            let host = attempt.url().host_str().unwrap_or_default().to_string();
            return attempt.error(BlockedRedirect(host));
        }
        attempt.follow()
    })
}

/// Refuses URLs whose host is, or resolves to, a private address.
async fn ensure_public_host(target: &Url, url: &str, op: &str) -> Result<(), UpstreamFetchError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    // IPv6 literals come back bracketed from host_str
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(UpstreamFetchError::blocked(
                url,
                op,
                Some(anyhow::anyhow!("private IP addresses are not allowed")),
            ));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((bare, port)).await.map_err(|e| {
        UpstreamFetchError::connect(url, op, Some(anyhow::anyhow!("DNS lookup failed: {}", e)))
    })?;

    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(UpstreamFetchError::blocked(
                url,
                op,
                Some(anyhow::anyhow!(
                    "{} resolves to a private IP address",
                    host
                )),
            ));
        }
    }
    Ok(())
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Undoes a `Content-Encoding` (gzip, deflate, br, or a comma-separated chain of them).
fn decode_content(body: &Bytes, content_encoding: &str) -> anyhow::Result<Bytes> {
    let mut data = body.clone();
    // Codings are listed in the order they were applied
    for coding in content_encoding.split(',').map(str::trim).rev() {
        data = match coding {
            "" | "identity" => data,
            "gzip" | "x-gzip" => read_limited(flate2::read::GzDecoder::new(&data[..]))?,
            "deflate" => {
                // Servers disagree on whether deflate means zlib-wrapped or raw
                match read_limited(flate2::read::ZlibDecoder::new(&data[..])) {
                    Ok(decoded) => decoded,
                    Err(_) => read_limited(flate2::read::DeflateDecoder::new(&data[..]))?,
                }
            }
            "br" => read_limited(brotli::Decompressor::new(&data[..], 4096))?,
            other => anyhow::bail!("unsupported content encoding {:?}", other),
        };
    }
    Ok(data)
}

fn read_limited(reader: impl Read) -> anyhow::Result<Bytes> {
    let mut decoded = Vec::new();
    reader
        .take(MAX_CONTENT_LENGTH as u64 + 1)
        .read_to_end(&mut decoded)?;
    if decoded.len() > MAX_CONTENT_LENGTH {
        anyhow::bail!("content too large");
    }
    Ok(Bytes::from(decoded))
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Flattens response headers into a name -> value map. Repeated headers are
/// joined with ", ".
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match out.entry(name.as_str().to_string()) {
            Entry::Occupied(mut existing) => {
                let joined: &mut String = existing.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
        }
    }
    out
}

/// Validates that `url` is an absolute http(s) URL.
pub fn parse_http_url(url: &str, op: &str) -> Result<Url, UpstreamFetchError> {
    if url.is_empty() {
        return Err(UpstreamFetchError::invalid_url(url, op, None));
    }

    let parsed = Url::parse(url).map_err(|e| {
        UpstreamFetchError::invalid_url(url, op, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(UpstreamFetchError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    Ok(parsed)
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    op: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, UpstreamFetchError> {
    let parsed_url = parse_http_url(url, op)?;

    if !opts.allow_private_networks {
        ensure_public_host(&parsed_url, url, op).await?;
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    debug!(target: TARGET_WEB_REQUEST, "GET {}", url);
    let response = request
        .send()
        .await
        .map_err(|e| UpstreamFetchError::from_reqwest(url, op, e))?;

    // A redirect may have landed somewhere the original host check never saw
    if !opts.allow_private_networks {
        ensure_public_host(response.url(), url, op).await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(UpstreamFetchError::body(
                url,
                op,
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let success = response.status().is_success();
    let headers = collect_headers(response.headers());
    let content_encoding = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    if !success && !opts.accept_non_success {
        return Err(UpstreamFetchError::status(url, op, status));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| UpstreamFetchError::from_reqwest(url, op, e))?;

    let body = match content_encoding.as_deref() {
        Some(encoding) if opts.decode_content_encoding => decode_content(&body, encoding)
            .map_err(|e| UpstreamFetchError::body(url, op, Some(e)))?,
        _ => body,
    };

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(UpstreamFetchError::body(
            url,
            op,
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(target: TARGET_WEB_REQUEST, "GET {} -> {} ({} bytes)", url, status, body.len());

    Ok(FetchResult {
        status,
        url: url.to_string(),
        content_type,
        headers,
        body,
    })
}
