//! URL classification and filename/title derivation for uploads
//!
//! Clients send either a `file://` pseudo-URL (content picked from the device)
//! or a fetchable `http(s)` URL. This module decides which one it is, rejects
//! remote URLs that must not be fetched, and derives the page title and the
//! storage-safe file name from the URL path.

use percent_encoding::percent_decode_str;
use std::net::{IpAddr, Ipv6Addr};
use url::{Host, Url};

/// Scheme used by clients for device-local files.
pub const LOCAL_FILE_SCHEME: &str = "file";

/// File name used when nothing usable survives sanitization.
pub const DEFAULT_FILE_NAME: &str = "content.pdf";

const PDF_EXTENSION: &str = ".pdf";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileUrlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL rejected: {0}")]
    Rejected(String),

    #[error("Failed to decode URL path: {0}")]
    Decode(String),
}

/// Where the uploaded content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// `file://` reference to content on the client device
    LocalFile,
    /// Any other well-formed URL
    Remote,
}

impl UrlKind {
    pub fn is_local_file(&self) -> bool {
        matches!(self, UrlKind::LocalFile)
    }
}

fn parse(url: &str) -> Result<Url, FileUrlError> {
    Url::parse(url).map_err(|e| FileUrlError::InvalidUrl(e.to_string()))
}

/// Classify a URL as a local-file reference or a remote resource.
pub fn classify(url: &str) -> Result<UrlKind, FileUrlError> {
    let parsed = parse(url)?;
    if parsed.scheme() == LOCAL_FILE_SCHEME {
        Ok(UrlKind::LocalFile)
    } else {
        Ok(UrlKind::Remote)
    }
}

fn is_tracking_param(key: &str) -> bool {
    key.len() > 4
        && key
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("utm_"))
}

/// Normalize a URL before deriving names from it.
///
/// Drops the fragment and `utm_*` parameters and sorts the remaining query
/// parameters. `www.` and trailing slashes are kept. Scheme/host casing and
/// default ports are normalized by the parser.
pub fn normalize_url(url: &str) -> Result<Url, FileUrlError> {
    let mut parsed = parse(url)?;
    parsed.set_fragment(None);

    if parsed.query().is_some() {
        let mut pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        if pairs.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }

    Ok(parsed)
}

/// Validate a remote URL before the server trusts it as a page source.
///
/// Only `http`/`https` with a public host are accepted.
pub fn validate_remote_url(url: &str) -> Result<Url, FileUrlError> {
    let parsed = parse(url)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(FileUrlError::Rejected(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    match parsed.host() {
        None => return Err(FileUrlError::Rejected("URL must have a host".to_string())),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_lowercase();
            if domain == "localhost" || domain == "0.0.0.0" {
                return Err(FileUrlError::Rejected("URL is localhost".to_string()));
            }
        }
        Some(Host::Ipv4(ip)) => {
            if is_private_ip(&IpAddr::V4(ip)) {
                return Err(FileUrlError::Rejected("URL is a private IP".to_string()));
            }
        }
        Some(Host::Ipv6(ip)) => {
            if is_private_ip(&IpAddr::V6(ip)) {
                return Err(FileUrlError::Rejected("URL is a private IP".to_string()));
            }
        }
    }

    Ok(parsed)
}

/// Private, loopback, link-local, multicast, and unspecified addresses.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            octets[0] == 10
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                || (octets[0] == 192 && octets[1] == 168)
                || octets[0] == 127
                || (octets[0] == 169 && octets[1] == 254)
                || (224..=239).contains(&octets[0])
                || octets[0] == 0
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || ipv6.is_multicast()
                || is_ipv6_link_local(ipv6)
                || is_ipv6_unique_local(ipv6)
        }
    }
}

fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

fn is_ipv6_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}

/// Last path segment, ignoring trailing slashes.
///
/// `ext` is removed from the end unless it is the whole segment.
pub fn basename<'a>(path: &'a str, ext: Option<&str>) -> &'a str {
    let trimmed = path.trim_end_matches('/');
    let base = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };

    match ext {
        Some(ext) if base.len() > ext.len() && base.ends_with(ext) => {
            &base[..base.len() - ext.len()]
        }
        _ => base,
    }
}

fn decode(segment: &str) -> Result<String, FileUrlError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| FileUrlError::Decode(e.to_string()))
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// Page title for an uploaded file: the decoded basename without `.pdf`.
pub fn derive_title(url: &str) -> Result<String, FileUrlError> {
    let normalized = normalize_url(url)?;
    decode(basename(normalized.path(), Some(PDF_EXTENSION)))
}

/// Like [`derive_title`] but never fails; falls back to the raw input.
pub fn title_for_file_path(url: &str) -> String {
    let title = parse(url).and_then(|parsed| decode(basename(parsed.path(), Some(PDF_EXTENSION))));

    match title {
        Ok(title) => title,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to derive title from file path");
            url.to_string()
        }
    }
}

/// Decoded basename restricted to `[A-Za-z0-9-_.]`. May be empty.
pub fn file_name_for_file_path(url: &str) -> Result<String, FileUrlError> {
    let normalized = normalize_url(url)?;
    let decoded = decode(basename(normalized.path(), None))?;
    Ok(sanitize_file_name(&decoded))
}

/// Storage-safe file name for an upload; never empty, `.` or `..`.
pub fn derive_file_name(url: &str) -> Result<String, FileUrlError> {
    let file_name = file_name_for_file_path(url)?;
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        Ok(DEFAULT_FILE_NAME.to_string())
    } else {
        Ok(file_name)
    }
}
