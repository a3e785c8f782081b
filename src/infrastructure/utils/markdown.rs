use pulldown_cmark::{html, Options, Parser};
use ammonia::{Builder, UrlRelative};

/// Converts Markdown content to sanitized HTML to prevent XSS attacks.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let parser = Parser::new_ext(markdown, Options::all());

    let mut raw_html = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut raw_html, parser);

    sanitize_html(&raw_html)
}

/// Sanitizes HTML; links open without leaking the referrer and may be
/// site-relative, since work descriptions point at other archive pages.
pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::PassThrough)
        .clean(content)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = safe_markdown_to_html("A **bold** poster");
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn strips_scripts() {
        let html = safe_markdown_to_html("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn keeps_site_relative_links() {
        let html = safe_markdown_to_html("[history](/history)");
        assert!(html.contains("href=\"/history\""));
        assert!(html.contains("noopener"));
    }

    #[test]
    fn blank_description_renders_nothing() {
        assert_eq!(safe_markdown_to_html("   "), "");
    }
}
