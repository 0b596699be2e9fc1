#[cfg(test)]
mod tests {
    use crate::fragments::{bookmark_item, domain_of, edit_form, html_escape, login_page};
    use crate::models::{Bookmark, Tag};

    fn sample_bookmark() -> Bookmark {
        Bookmark {
            id: 7,
            url: "https://example.com/a?b=1".to_string(),
            title: Some("Example <script>alert('x')</script>".to_string()),
            description: Some("Quotes \" and ' here".to_string()),
            favicon: None,
            tags: vec![
                Tag {
                    id: 1,
                    name: "news".to_string(),
                },
                Tag {
                    id: 2,
                    name: "<evil>".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain text"), "plain text");
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://example.com/path?q=1"), "example.com");
        assert_eq!(domain_of("http://sub.example.org"), "sub.example.org");
        assert_eq!(domain_of("example.net/path"), "example.net");
        assert_eq!(domain_of(""), "");
    }

    #[test]
    fn test_bookmark_item_escapes_remote_content() {
        let html = bookmark_item(&sample_bookmark());

        assert!(!html.contains("<script>"), "Raw script tags must not appear");
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;evil&gt;"));
        assert!(html.contains("/api/bookmarks/7/delete"));
    }

    #[test]
    fn test_bookmark_item_falls_back_to_url_label() {
        let bookmark = Bookmark {
            id: 1,
            url: "https://untitled.example".to_string(),
            title: None,
            description: None,
            favicon: None,
            tags: vec![],
        };

        let html = bookmark_item(&bookmark);
        assert!(html.contains(">https://untitled.example</a>"));
    }

    #[test]
    fn test_edit_form_prefills_and_escapes() {
        let html = edit_form(&sample_bookmark());

        assert!(html.contains("/api/bookmarks/7/update"));
        assert!(html.contains("name=\"new_tags\" value=\"news, &lt;evil&gt;\""));
        assert!(!html.contains("<script>"));
        assert!(html.contains("name=\"new_description\""));
    }

    #[test]
    fn test_login_page_escapes_error() {
        let html = login_page(Some("<img src=x onerror=alert(1)>"));

        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));

        let clean = login_page(None);
        assert!(!clean.contains("class=\"error\""));
    }
}
