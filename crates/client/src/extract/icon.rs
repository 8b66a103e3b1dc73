//! Icon `href` normalization to absolute URLs.

use url::Url;

use crate::fetch::authority;

/// Make an icon `href` absolute against the page it was found on.
///
/// - `//cdn/x.png` becomes `https://cdn/x.png`
/// - `/x.png` is prefixed with the page's scheme and host
/// - `x.png` and `./x.png` are resolved against the page's directory
/// - anything carrying a scheme is returned untouched
pub fn resolve_icon_href(href: &str, page: &Url) -> String {
    let href = href.trim();

    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }

    if has_scheme(href) {
        return href.to_string();
    }

    let origin = format!("{}://{}", page.scheme(), authority(page));

    if href.starts_with('/') {
        return format!("{origin}{href}");
    }

    let path = page.path();
    let directory = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    };
    let relative = href.strip_prefix("./").unwrap_or(href);

    format!("{origin}{directory}{relative}")
}

/// `scheme:` prefix per RFC 3986: a letter, then letters, digits, `+`, `-`, `.`.
fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home(host: &str) -> Url {
        Url::parse(&format!("https://{host}/")).unwrap()
    }

    #[test]
    fn test_dot_relative() {
        assert_eq!(
            resolve_icon_href("./assets/fav.png", &home("api.example.com")),
            "https://api.example.com/assets/fav.png"
        );
    }

    #[test]
    fn test_bare_relative() {
        assert_eq!(resolve_icon_href("fav.png", &home("api.example.com")), "https://api.example.com/fav.png");
    }

    #[test]
    fn test_relative_in_subdirectory() {
        let page = Url::parse("https://api.example.com/app/index.html").unwrap();
        assert_eq!(resolve_icon_href("./fav.png", &page), "https://api.example.com/app/fav.png");
    }

    #[test]
    fn test_root_relative() {
        let page = Url::parse("http://api.example.com/app/").unwrap();
        assert_eq!(resolve_icon_href("/favicon.svg", &page), "http://api.example.com/favicon.svg");
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(resolve_icon_href("//cdn.example.net/i.png", &home("a.example.com")), "https://cdn.example.net/i.png");
    }

    #[test]
    fn test_absolute_untouched() {
        let href = "http://static.example.net/i.png";
        assert_eq!(resolve_icon_href(href, &home("a.example.com")), href);
        let data = "data:image/png;base64,AAAA";
        assert_eq!(resolve_icon_href(data, &home("a.example.com")), data);
    }

    #[test]
    fn test_keeps_port() {
        let page = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(resolve_icon_href("icon.png", &page), "http://127.0.0.1:8080/icon.png");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://x"));
        assert!(has_scheme("data:abc"));
        assert!(!has_scheme("./a:b"));
        assert!(!has_scheme("assets/fav.png"));
    }
}
