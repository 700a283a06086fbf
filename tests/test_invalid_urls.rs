use url_summarizer::{
    classify, validate, Orchestrator, Outcome, SourceKind, SummarizerConfig, SummaryError,
    SummaryRequest,
};

#[test]
fn test_malformed_urls_are_rejected() {
    let inputs = [
        "not a url",
        "example.com/article",
        "www.youtube.com/watch?v=abc",
        "ftp://example.com/file.txt",
        "mailto:someone@example.com",
        "javascript:alert(1)",
        "file:///etc/passwd",
        "https://",
        "http://exa mple.com",
    ];

    for input in inputs {
        match classify(input) {
            Err(SummaryError::InvalidUrl(_)) => {}
            other => panic!("{input:?} should be invalid, got {other:?}"),
        }
        assert!(validate(input).is_err(), "{input:?}");
    }
}

#[test]
fn test_classification_is_deterministic() {
    let cases = [
        ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", SourceKind::VideoPlatform),
        ("https://m.youtube.com/shorts/abc123", SourceKind::VideoPlatform),
        ("http://youtube.com/embed/abc123", SourceKind::VideoPlatform),
        ("https://example.com/article", SourceKind::GenericWebsite),
        ("https://blog.rust-lang.org/2024/01/01/post.html", SourceKind::GenericWebsite),
        ("https://youtu.be/dQw4w9WgXcQ", SourceKind::GenericWebsite),
    ];

    for (url, expected) in cases {
        for _ in 0..3 {
            assert_eq!(classify(url).unwrap(), expected, "{url}");
        }
    }
}

#[test]
fn test_marker_anywhere_in_url_selects_video_loader() {
    assert_eq!(
        classify("https://example.com/youtube.com-tips").unwrap(),
        SourceKind::VideoPlatform
    );
}

#[tokio::test]
async fn test_invalid_url_message_is_user_facing() {
    let outcome = Orchestrator::new(SummarizerConfig::default())
        .unwrap()
        .run(&SummaryRequest::new("gsk_key", "htp:/broken"))
        .await;

    assert_eq!(
        outcome,
        Outcome::Error {
            message:
                "Please enter a valid URL. It can either be a YouTube video URL or a website URL."
                    .to_string()
        }
    );
}
