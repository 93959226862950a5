//! Loading catalogs from disk and resolving through them

use std::io::Write;
use std::time::Duration;

use jukebox_bot::resolver::{resolve_with_timeout, Catalog, CatalogResolver};
use jukebox_bot::Error;
use tempfile::NamedTempFile;

const CATALOG: &str = r#"
[[tracks]]
id = "local:1"
name = "Glory Box"
artist = "Portishead"
album = "Dummy"

[[tracks]]
id = "local:2"
name = "Sour Times"
artist = "Portishead"
album = "Dummy"
"#;

fn write_catalog(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_resolve_from_catalog_file() {
    let file = write_catalog(CATALOG);
    let catalog = Catalog::from_file(file.path()).unwrap();
    assert_eq!(catalog.track_count(), 2);

    let resolver = CatalogResolver::new(catalog);
    let collection = resolve_with_timeout(&resolver, "album dummy", Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(collection.tracks().len(), 2);
    assert_eq!(collection.user(), "");

    let err = resolve_with_timeout(&resolver, "unfindable", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_missing_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::from_file(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, Error::Common(jukebox_common::Error::Io(_))));
}

#[test]
fn test_malformed_catalog_file() {
    let file = write_catalog("[[tracks]]\nid = 5\n");
    let err = Catalog::from_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Common(jukebox_common::Error::Toml(_))));
}

#[test]
fn test_duplicate_ids_rejected() {
    let file = write_catalog(&format!("{CATALOG}\n[[tracks]]\nid = \"local:1\"\nname = \"Again\"\nartist = \"Someone\"\n"));
    let err = Catalog::from_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Catalog(msg) if msg.contains("local:1")));
}
