use super::*;

#[test]
fn cors_header_matching() {
    let origin = "https://app.example.com";
    assert!(cors_permits(origin, Some("*")));
    assert!(cors_permits(origin, Some("https://app.example.com")));
    assert!(cors_permits(origin, Some(" HTTPS://App.Example.com/ ")));
    assert!(!cors_permits(origin, Some("https://other.example.com")));
    assert!(!cors_permits(origin, Some("")));
    assert!(!cors_permits(origin, None));
}

#[test]
fn rel_paths_are_normalized_and_confined() {
    assert_eq!(normalize_rel_path("a/./b//c.png").unwrap(), "a/b/c.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("./").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn remote_urls_are_detected() {
    assert!(is_remote_url("https://images.unsplash.com/x"));
    assert!(is_remote_url("HTTP://host/x"));
    assert!(!is_remote_url("file://bg.png"));
    assert!(!is_remote_url("backgrounds/bg.png"));
}

#[test]
fn memory_resolver_reports_cors_per_entry() {
    let mut r = MemoryResolver::new();
    assert!(r.is_empty());
    r.insert("open.png", vec![1, 2, 3]);
    r.insert_opaque("closed.png", vec![4]);
    assert_eq!(r.len(), 2);

    let open = r.fetch("open.png", "null").unwrap();
    assert!(open.cors_readable);
    assert_eq!(open.bytes.as_slice(), &[1, 2, 3]);
    assert!(!r.fetch("closed.png", "null").unwrap().cors_readable);
    assert!(matches!(
        r.fetch("missing.png", "null"),
        Err(FrameshotError::Resource(_))
    ));

    let shared: Arc<dyn ResourceResolver> = Arc::new(r);
    assert!(shared.fetch("open.png", "null").is_ok());
}

#[test]
fn fs_resolver_reads_below_root() {
    let dir = std::env::temp_dir().join(format!("frameshot-resolve-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("bg")).unwrap();
    std::fs::write(dir.join("bg/one.bin"), b"abc").unwrap();

    let r = FsResolver::new(&dir);
    let got = r.fetch("bg/one.bin", "null").unwrap();
    assert_eq!(got.bytes.as_slice(), b"abc");
    assert!(got.cors_readable);
    assert_eq!(
        r.fetch("file:///bg/one.bin", "null").unwrap().bytes.as_slice(),
        b"abc"
    );

    assert!(r.fetch("bg/missing.bin", "null").is_err());
    assert!(r.fetch("../one.bin", "null").is_err());
    assert!(matches!(
        r.fetch("https://example.com/x.png", "null"),
        Err(FrameshotError::Resource(_))
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
