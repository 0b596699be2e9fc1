#[cfg(test)]
mod tests {
    use crate::metadata::{PageMetadata, extract_description, extract_title, fetch_page_metadata};
    use rocket::tokio;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Example Domain</title></head></html>";
        assert_eq!(extract_title(html), "Example Domain");
    }

    #[test]
    fn test_extract_title_is_case_insensitive_and_trims() {
        let html = "<HTML><HEAD><TITLE>\n  Shouting Page  \n</TITLE></HEAD></HTML>";
        assert_eq!(extract_title(html), "Shouting Page");
    }

    #[test]
    fn test_extract_title_with_attributes_takes_first() {
        let html = r#"<title data-reactroot="">First</title><title>Second</title>"#;
        assert_eq!(extract_title(html), "First");
    }

    #[test]
    fn test_extract_title_missing() {
        assert_eq!(extract_title("<html><body>no head</body></html>"), "");
    }

    #[test]
    fn test_extract_description_double_quotes() {
        let html = r#"<meta name="description" content="A test page">"#;
        assert_eq!(extract_description(html), "A test page");
    }

    #[test]
    fn test_extract_description_single_quotes() {
        let html = "<meta name='description' content='Single quoted'>";
        assert_eq!(extract_description(html), "Single quoted");
    }

    #[test]
    fn test_extract_description_attribute_order() {
        let html = r#"<meta content="Content first" name="description">"#;
        assert_eq!(extract_description(html), "Content first");
    }

    #[test]
    fn test_extract_description_case_insensitive() {
        let html = r#"<META NAME="Description" CONTENT="Loud meta">"#;
        assert_eq!(extract_description(html), "Loud meta");
    }

    #[test]
    fn test_extract_description_ignores_other_meta() {
        let html = r#"<meta name="keywords" content="a,b"><meta name="description" content="Real one">"#;
        assert_eq!(extract_description(html), "Real one");
    }

    #[test]
    fn test_extract_description_missing() {
        assert_eq!(extract_description("<meta charset=\"utf-8\">"), "");
    }

    #[tokio::test]
    async fn test_fetch_empty_url_short_circuits() {
        let metadata = fetch_page_metadata("").await;
        assert_eq!(metadata, PageMetadata::default());

        let metadata = fetch_page_metadata("   ").await;
        assert_eq!(metadata, PageMetadata::default());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_returns_empty() {
        let metadata = fetch_page_metadata("not a url at all").await;
        assert_eq!(metadata, PageMetadata::default());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_returns_empty() {
        // Port 9 (discard) refuses connections on any sane machine.
        let start = std::time::Instant::now();
        let metadata = fetch_page_metadata("http://127.0.0.1:9/").await;

        assert_eq!(metadata, PageMetadata::default());
        assert!(
            start.elapsed() < std::time::Duration::from_secs(6),
            "Fetch must give up within the timeout bound"
        );
    }
}
