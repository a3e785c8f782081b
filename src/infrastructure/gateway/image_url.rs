use once_cell::sync::Lazy;
use regex::Regex;

const STORAGE_PUBLIC_MARKER: &str = "supabase.co/storage/v1/object/public";
const STOCK_PHOTO_HOST: &str = "images.unsplash.com";
const RESIZE_KEYS: [&str; 3] = ["width", "quality", "resize"];

static STOCK_WIDTH_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<sep>[?&])w=\d+").expect("static regex is valid")
});

/// Rewrites an image URL so the hosting CDN serves it resized to `width`.
///
/// Storage CDN URLs get `width`, `quality=80` and `resize=contain` merged into
/// their query string; stock-photo URLs get their `w=` parameter replaced.
/// Anything else is returned unchanged.
pub fn optimize_image_url(url: &str, width: u32) -> String {
    if url.is_empty() {
        return String::new();
    }

    if url.contains(STORAGE_PUBLIC_MARKER) {
        return merge_resize_params(url, width);
    }

    if url.contains(STOCK_PHOTO_HOST) {
        return STOCK_WIDTH_PARAM
            .replace(url, format!("${{sep}}w={width}"))
            .into_owned();
    }

    url.to_string()
}

fn merge_resize_params(url: &str, width: u32) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => (url, ""),
    };

    let resize = format!("width={width}&quality=80&resize=contain");
    let mut params: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !RESIZE_KEYS.contains(&key)
        })
        .collect();
    params.push(&resize);

    format!("{base}?{}", params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = "https://abcd.supabase.co/storage/v1/object/public/images/0.123.png";

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(optimize_image_url("", 600), "");
    }

    #[test]
    fn storage_url_gets_resize_hints() {
        assert_eq!(
            optimize_image_url(STORED, 600),
            format!("{STORED}?width=600&quality=80&resize=contain")
        );
    }

    #[test]
    fn storage_url_keeps_existing_query() {
        let url = format!("{STORED}?token=abc");
        assert_eq!(
            optimize_image_url(&url, 1600),
            format!("{STORED}?token=abc&width=1600&quality=80&resize=contain")
        );
    }

    #[test]
    fn stock_photo_width_is_replaced() {
        let url = "https://images.unsplash.com/photo-1?auto=format&fit=crop&w=800&q=80";
        assert_eq!(
            optimize_image_url(url, 600),
            "https://images.unsplash.com/photo-1?auto=format&fit=crop&w=600&q=80"
        );
    }

    #[test]
    fn stock_photo_without_width_is_unchanged() {
        let url = "https://images.unsplash.com/photo-1?auto=format";
        assert_eq!(optimize_image_url(url, 600), url);
    }

    #[test]
    fn unknown_hosts_pass_through() {
        let url = "https://example.com/a.png?w=10";
        assert_eq!(optimize_image_url(url, 600), url);
    }

    #[test]
    fn rewrite_is_idempotent() {
        let urls = [
            STORED.to_string(),
            format!("{STORED}?token=abc"),
            "https://images.unsplash.com/photo-1?q=80&w=2564&auto=format".to_string(),
            "https://example.com/x.jpg".to_string(),
        ];

        for url in urls {
            let once = optimize_image_url(&url, 1200);
            assert_eq!(optimize_image_url(&once, 1200), once, "not idempotent for {url}");
        }
    }
}
