//! HLS manifest detection and URI rewriting.
//!
//! The proxy rewrites every URI line of a fetched manifest so segment and
//! variant requests come back through the same origin. Directive and blank
//! lines must pass through untouched: `#EXTINF` metadata binds to the URI
//! line that follows it, so line alignment is load-bearing.

use std::io::Read;

use url::Url;

/// Route the rewritten URI lines point back at.
pub const PROXY_ROUTE: &str = "/api/proxy/hls";

/// Content type the rewritten manifest is served under.
pub const MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Content types panels use for HLS manifests.
const MANIFEST_CONTENT_TYPES: [&str; 3] = [
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
];

/// Decide whether a proxied response is an HLS manifest.
///
/// Checks the content type first, then falls back to the target URL's path
/// extension; plenty of panels serve manifests as `application/octet-stream`
/// or `text/plain`, so neither signal alone is enough.
pub fn is_manifest(content_type: &str, target: &Url) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    if MANIFEST_CONTENT_TYPES
        .iter()
        .any(|known| content_type.contains(known))
    {
        return true;
    }
    target.path().to_ascii_lowercase().ends_with(".m3u8")
}

/// Rewrite every URI line of a manifest to route back through the proxy.
///
/// Each non-empty line not starting with `#` is resolved against `base`
/// (the manifest's own URL) to an absolute URL, then replaced with a proxy
/// URL carrying that absolute URL percent-encoded in the query string. A
/// line that fails to resolve is kept as-is rather than dropped, so the
/// line count is always preserved. CRLF line endings are normalized to LF.
pub fn rewrite_manifest(body: &str, base: &Url) -> String {
    body.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with('#') {
                return line.to_string();
            }
            match base.join(line) {
                Ok(absolute) => format!(
                    "{PROXY_ROUTE}?url={}",
                    urlencoding::encode(absolute.as_str())
                ),
                Err(_) => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inflate a gzip-encoded manifest body.
///
/// Needed because the proxy forwards the browser's `accept-encoding`
/// upstream, so a manifest can come back compressed.
pub fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
