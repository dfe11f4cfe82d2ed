//! Domain normalization for result links.

use url::Url;

/// Extract the bare domain from a result link.
///
/// Takes the network location (host, plus an explicit non-default port) and
/// strips one leading `www.` label. Hosts come back lowercased from the URL
/// parser, so `https://www.Example.com/x` and `https://example.com/y` share a
/// domain. Returns `None` for links without a host.
pub fn extract_domain(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?;
    if host.is_empty() {
        return None;
    }

    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scheme_path_and_www() {
        assert_eq!(
            extract_domain("https://www.example.com/page?x=1").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_keeps_other_subdomains() {
        assert_eq!(
            extract_domain("https://shop.example.com/").as_deref(),
            Some("shop.example.com")
        );
    }

    #[test]
    fn test_only_leading_www_is_stripped() {
        assert_eq!(
            extract_domain("http://mywww.example.org").as_deref(),
            Some("mywww.example.org")
        );
        assert_eq!(
            extract_domain("http://www.www.example.org").as_deref(),
            Some("www.example.org")
        );
    }

    #[test]
    fn test_host_is_lowercased() {
        assert_eq!(
            extract_domain("https://www.Example.com/x").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_explicit_port_is_kept() {
        assert_eq!(
            extract_domain("http://www.example.com:8080/a").as_deref(),
            Some("example.com:8080")
        );
        // Default port is dropped by the parser.
        assert_eq!(
            extract_domain("https://example.com:443/a").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_links_without_host() {
        assert_eq!(extract_domain(""), None);
        assert_eq!(extract_domain("/relative/path"), None);
        assert_eq!(extract_domain("mailto:someone@example.com"), None);
    }
}
