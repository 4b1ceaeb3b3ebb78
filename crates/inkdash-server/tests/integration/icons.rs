//! Built-in icon tables against the shipped `static/icons` directory.

use std::path::PathBuf;

use inkdash_core::IconMap;

fn shipped_icons() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../static/icons")
}

#[test]
fn test_builtin_icon_images_are_shipped() {
    let dir = shipped_icons();
    for map in [IconMap::builtin(), IconMap::builtin_areas()] {
        let images = map
            .entries()
            .map(|(_, entry)| entry.image.as_str())
            .chain(std::iter::once(map.default_entry().image.as_str()));
        for image in images {
            assert!(dir.join(image).is_file(), "static/icons/{image} is missing");
        }
    }
}

#[test]
fn test_shipped_icons_are_png() {
    for entry in std::fs::read_dir(shipped_icons()).unwrap() {
        let path = entry.unwrap().path();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
    }
}
