use std::fs;
use tempfile::TempDir;

use beanmatch_core::documents::DocumentLoader;
use beanmatch_core::types::MetaValue;

#[test]
fn load_single_file_skips_blank_lines() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("beans.jsonl");
    fs::write(
        &path,
        "{\"id\":\"review_0\",\"text\":\"Bright lemon, honey\",\"metadata\":{\"roast\":\"Light\"}}\n\n{\"id\":\"review_1\",\"text\":\"Dark cocoa\"}\n",
    )
    .unwrap();

    let docs = DocumentLoader::new().load(&path).expect("load");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "review_0");
    assert_eq!(docs[0].metadata.get("roast"), Some(&MetaValue::Text("Light".into())));
    assert!(docs[1].metadata.is_empty(), "metadata defaults to empty");
}

#[test]
fn load_directory_in_path_order_with_limit() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("b.jsonl"), "{\"id\":\"b\",\"text\":\"nutty\"}\n").unwrap();
    fs::write(dir.join("a.jsonl"), "{\"id\":\"a\",\"text\":\"floral\"}\n").unwrap();
    fs::write(dir.join("nested/c.jsonl"), "{\"id\":\"c\",\"text\":\"woody\"}\n").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let docs = DocumentLoader::new().load(dir).expect("load dir");
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);

    let limited = DocumentLoader::with_limit(2).load(dir).expect("load limited");
    assert_eq!(limited.len(), 2);
}

#[test]
fn malformed_line_names_file_and_line() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.jsonl");
    fs::write(&path, "{\"id\":\"ok\",\"text\":\"fine\"}\n{not json}\n").unwrap();

    let err = DocumentLoader::new().load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("bad.jsonl:2"), "error was: {err:#}");
}
