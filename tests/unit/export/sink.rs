use super::*;

#[test]
fn in_memory_sink_keeps_blobs_in_order() {
    let mut sink = InMemorySink::new();
    sink.save(&FileBlob::png(vec![1])).unwrap();
    sink.save(&FileBlob::png(vec![2])).unwrap();
    let bytes: Vec<_> = sink.blobs.iter().map(|b| b.bytes.clone()).collect();
    assert_eq!(bytes, vec![vec![1], vec![2]]);
}

#[test]
fn dir_sink_writes_under_blob_name() {
    let dir = std::env::temp_dir().join(format!("frameshot-sink-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = DirSink::new(dir.join("nested"));
    sink.save(&FileBlob::png(vec![9, 8, 7])).unwrap();
    sink.save(&FileBlob::png(vec![6])).unwrap();

    let path = dir.join("nested").join("screenshot.png");
    assert_eq!(std::fs::read(&path).unwrap(), vec![6]);
    assert_eq!(sink.saved(), &[path.clone(), path]);

    std::fs::remove_dir_all(&dir).unwrap();
}
