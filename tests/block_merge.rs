use blockpaint::event::DocumentEvent;
use blockpaint::node::{BlockWidth, ImageAttrs};
use blockpaint::source::MemoryImageSource;
use blockpaint::{
    BlockDocument, BlockId, DocumentEdit, DocumentHost, EditStep, EditorConfig, MergeError, MergeGesture, MergeOutcome,
    MergePlanner, Node, NodeKind, SharedDocument,
};
use futures::executor::block_on;
use image::{DynamicImage, ImageFormat, RgbaImage};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::Arc;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

struct Fixture {
    doc: BlockDocument,
    source: MemoryImageSource,
    intro: BlockId,
    wide: BlockId,
    middle: BlockId,
    square: BlockId,
}

fn fixture() -> Fixture {
    let mut doc = BlockDocument::new();
    let intro = doc.push(Node::paragraph("intro"));
    let wide = doc.push(Node::image(ImageAttrs::new("wide.png")));
    let middle = doc.push(Node::paragraph("middle"));
    let square = doc.push(Node::image(ImageAttrs::new("square.png")));

    let mut source = MemoryImageSource::new();
    source.insert("wide.png", png_bytes(200, 100));
    source.insert("square.png", png_bytes(50, 50));

    Fixture {
        doc,
        source,
        intro,
        wide,
        middle,
        square,
    }
}

fn width_of(doc: &BlockDocument, id: BlockId) -> Option<BlockWidth> {
    doc.get(id).and_then(Node::as_image).map(|attrs| attrs.width)
}

#[test]
fn test_square_dropped_on_landscape() {
    init();
    let Fixture {
        mut doc,
        source,
        intro,
        wide,
        middle,
        square,
    } = fixture();

    let outcome = block_on(MergePlanner::default().merge(&mut doc, &source, square, wide)).unwrap();
    let MergeOutcome::Merged(plan) = outcome else {
        panic!("expected a merge");
    };
    assert_eq!((plan.target_width, plan.dragged_width), (65, 33));

    assert_eq!(doc.ids(), vec![intro, wide, square, middle]);
    assert_eq!(width_of(&doc, wide), Some(BlockWidth::Percent(65)));
    assert_eq!(width_of(&doc, square), Some(BlockWidth::Percent(33)));
    assert_eq!(doc.get(square).and_then(Node::as_image).map(|a| a.src.as_str()), Some("square.png"));
}

#[test]
fn test_merge_is_a_single_edit() {
    let Fixture {
        mut doc,
        source,
        wide,
        square,
        ..
    } = fixture();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    doc.subscribe(move |event| sink.lock().push(event.clone()));
    let revision = doc.revision();

    block_on(MergePlanner::default().merge(&mut doc, &source, square, wide)).unwrap();

    assert_eq!(doc.revision(), revision + 1);
    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], DocumentEvent::Edited { touched, .. } if touched == &vec![wide, square]));
}

#[test]
fn test_self_merge_leaves_document_alone() {
    let Fixture { mut doc, source, wide, .. } = fixture();
    let before = doc.nodes().to_vec();

    let outcome = block_on(MergePlanner::default().merge(&mut doc, &source, wide, wide)).unwrap();

    assert_eq!(outcome, MergeOutcome::Rejected);
    assert_eq!(doc.nodes(), before.as_slice());
}

#[test]
fn test_missing_block_aborts_without_changes() {
    let Fixture { mut doc, source, wide, .. } = fixture();
    let before = doc.nodes().to_vec();
    let ghost = BlockId::new();

    let result = block_on(MergePlanner::default().merge(&mut doc, &source, ghost, wide));

    assert_eq!(result, Err(MergeError::BlockNotFound(ghost)));
    assert_eq!(doc.nodes(), before.as_slice());
}

#[test]
fn test_only_images_can_merge() {
    let Fixture {
        mut doc,
        source,
        wide,
        middle,
        ..
    } = fixture();
    let result = block_on(MergePlanner::default().merge(&mut doc, &source, wide, middle));
    assert_eq!(result, Err(MergeError::NotAnImage(middle)));
}

#[test]
fn test_unreadable_image_counts_as_square() {
    let Fixture {
        mut doc,
        mut source,
        wide,
        square,
        ..
    } = fixture();
    source.remove("wide.png");

    block_on(MergePlanner::default().merge(&mut doc, &source, square, wide)).unwrap();

    assert_eq!(width_of(&doc, wide), Some(BlockWidth::Percent(49)));
    assert_eq!(width_of(&doc, square), Some(BlockWidth::Percent(49)));
}

#[test]
fn test_gap_comes_from_config() {
    let Fixture { doc, wide, square, .. } = fixture();
    let config = EditorConfig {
        merge_gap_percent: 0,
        ..EditorConfig::default()
    };
    let planner = MergePlanner::from_config(&config);

    let outcome = planner.plan(&doc, square, wide, 1.0, 2.0).unwrap();
    let MergeOutcome::Merged(plan) = outcome else {
        panic!("expected a merge");
    };
    assert_eq!((plan.target_width, plan.dragged_width), (67, 33));
    // Planning alone does not touch the document.
    assert_eq!(width_of(&doc, wide), Some(BlockWidth::Auto));
}

#[test]
fn test_drag_session_on_shared_document() {
    init();
    let Fixture {
        doc,
        source,
        intro,
        wide,
        middle,
        square,
    } = fixture();
    let mut shared = SharedDocument::new(doc);
    let reader = shared.clone();

    // Drag the landscape image over the paragraph, then onto the square.
    let mut gesture = MergeGesture::begin(wide);
    gesture.hover(Some(middle));
    gesture.hover(Some(square));
    let request = gesture.finish().unwrap();

    block_on(MergePlanner::default().merge(&mut shared, &source, request.dragged, request.target)).unwrap();

    assert_eq!(reader.read(BlockDocument::ids), vec![intro, middle, square, wide]);
    assert_eq!(reader.find_node(wide).map(|location| location.position), Some(3));
    assert_eq!(reader.read(|doc| width_of(doc, square)), Some(BlockWidth::Percent(33)));
    assert_eq!(reader.read(|doc| width_of(doc, wide)), Some(BlockWidth::Percent(65)));
}

#[test]
fn test_extreme_ratios_still_round_trip() {
    let Fixture { mut doc, wide, square, .. } = fixture();
    let planner = MergePlanner::default();

    let MergeOutcome::Merged(plan) = planner.plan(&doc, square, wide, 0.01, 10.0).unwrap() else {
        panic!("expected a merge");
    };
    assert_eq!((plan.target_width, plan.dragged_width), (97, 1));
    planner.commit(&mut doc, &plan).unwrap();

    let node = doc.get(square).unwrap().clone();
    let bag = node.to_attrs().unwrap();
    assert_eq!(bag["width"], "1%");
    assert_eq!(Node::from_attrs("image", &bag).unwrap(), node);
}

#[test]
fn test_commit_keeps_edits_made_after_planning() {
    let Fixture { doc, wide, square, .. } = fixture();
    let mut shared = SharedDocument::new(doc);
    let mut other = shared.clone();
    let planner = MergePlanner::default();

    let MergeOutcome::Merged(plan) = planner.plan(&shared, square, wide, 1.0, 2.0).unwrap() else {
        panic!("expected a merge");
    };

    // Someone else captions the dragged image before the merge lands.
    let mut captioned = ImageAttrs::new("square.png");
    captioned.alt = Some("caption".to_owned());
    other
        .apply_edit(&DocumentEdit::new().with_step(EditStep::SetAttributes {
            id: square,
            kind: NodeKind::Image(captioned),
        }))
        .unwrap();

    planner.commit(&mut shared, &plan).unwrap();

    let image = shared.read(|doc| doc.get(square).and_then(Node::as_image).cloned()).unwrap();
    assert_eq!(image.alt.as_deref(), Some("caption"));
    assert_eq!(image.width, BlockWidth::Percent(33));
    assert_eq!(image.src, "square.png");
}
