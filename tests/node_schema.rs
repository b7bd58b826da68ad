use blockpaint::node::{AttrMap, BlockWidth, ImageAttrs, QuoteVariant, SCHEMA_VERSION, VideoAttrs};
use blockpaint::{BlockId, Node, NodeKind, SchemaError};
use serde_json::json;

fn attrs(value: serde_json::Value) -> AttrMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn test_image_round_trip() {
    let mut image = ImageAttrs::new("https://example.com/a.png").with_width(BlockWidth::Percent(49));
    image.alt = Some("A cat".to_owned());
    let node = Node::image(image);

    let bag = node.to_attrs().unwrap();
    assert_eq!(bag["width"], json!("49%"));
    assert_eq!(bag["v"], json!(SCHEMA_VERSION));
    assert!(!bag.contains_key("title"));

    let parsed = Node::from_attrs(node.kind().name(), &bag).unwrap();
    assert_eq!(parsed, node);
}

#[test]
fn test_defaults_fill_missing_fields() {
    let node = Node::from_attrs("image", &attrs(json!({ "src": "a.png" }))).unwrap();
    assert_eq!(node.as_image().map(|image| image.width), Some(BlockWidth::Auto));

    let node = Node::from_attrs("video", &attrs(json!({ "src": "clip.mp4" }))).unwrap();
    assert!(matches!(node.kind(), NodeKind::Video(VideoAttrs { width: BlockWidth::Full, .. })));

    let node = Node::from_attrs("blockquote", &attrs(json!({ "text": "hi" }))).unwrap();
    assert!(matches!(node.kind(), NodeKind::Blockquote(quote) if quote.variant == QuoteVariant::Plain));
}

#[test]
fn test_existing_id_is_kept() {
    let id = BlockId::new();
    let bag = attrs(json!({ "id": id.to_string(), "text": "hello" }));
    let node = Node::from_attrs("paragraph", &bag).unwrap();
    assert_eq!(node.id(), id);
}

#[test]
fn test_required_fields_and_unknown_fields_are_rejected() {
    let missing_src = Node::from_attrs("image", &attrs(json!({ "width": "50%" })));
    assert!(matches!(missing_src, Err(SchemaError::InvalidAttributes(_))));

    let unknown = Node::from_attrs("image", &attrs(json!({ "src": "a.png", "border": 2 })));
    assert!(matches!(unknown, Err(SchemaError::InvalidAttributes(_))));

    let bad_width = Node::from_attrs("image", &attrs(json!({ "src": "a.png", "width": "wide" })));
    assert!(matches!(bad_width, Err(SchemaError::InvalidAttributes(_))));
}

#[test]
fn test_unknown_kind_and_bad_id() {
    let unknown = Node::from_attrs("table", &AttrMap::new());
    assert!(matches!(unknown, Err(SchemaError::UnknownKind(kind)) if kind == "table"));

    let bad_id = Node::from_attrs("paragraph", &attrs(json!({ "id": "not-a-uuid" })));
    assert!(matches!(bad_id, Err(SchemaError::InvalidField { field: "id", .. })));
}

#[test]
fn test_newer_schema_version_is_rejected() {
    let bag = attrs(json!({ "src": "a.png", "v": SCHEMA_VERSION + 1 }));
    assert!(matches!(
        Node::from_attrs("image", &bag),
        Err(SchemaError::UnsupportedVersion { found, supported }) if found == SCHEMA_VERSION + 1 && supported == SCHEMA_VERSION
    ));

    let older = attrs(json!({ "src": "a.png", "v": 0 }));
    assert!(Node::from_attrs("image", &older).is_ok());
}
