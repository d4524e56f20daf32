//! Dispatcher scenarios
//!
//! Each test drives the full request path (envelope in, envelope out) against
//! a fresh in-memory document.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{new_document, send, send_err, send_ok};
use docbridge_core::model::{Color, EntityKind, LayoutMode, PaddingQuad, Paint, SizingMode};
use docbridge_core::{DocumentHost, FontName, MemoryDocument};
use serde_json::json;

#[tokio::test]
async fn test_status_reports_document_and_current_page() {
    // GIVEN a keyed document
    let mut doc = MemoryDocument::new("Landing").with_key("file-1");

    // WHEN asking for status
    let response = send(&mut doc, "status", json!({})).await;

    // THEN the report carries name, key and current page
    assert!(response.ok);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["result"]["fileName"], "Landing");
    assert_eq!(json["result"]["fileKey"], "file-1");
    assert_eq!(json["result"]["pageId"], "0:1");
    assert_eq!(json["result"]["pageName"], "Page 1");
}

#[tokio::test]
async fn test_status_without_key_reports_empty_string() {
    let mut doc = new_document();
    let json = serde_json::to_value(send(&mut doc, "status", json!({})).await).unwrap();
    assert_eq!(json["result"]["fileKey"], "");
}

#[tokio::test]
async fn test_unknown_command_fails_with_its_name() {
    let mut doc = new_document();
    let error = send_err(&mut doc, "delete-everything", json!({})).await;
    assert_eq!(error, "Unsupported command: delete-everything");
}

#[tokio::test]
async fn test_create_page_defaults_to_untitled() {
    let mut doc = new_document();
    let id = send_ok(&mut doc, "create-page", json!({})).await;

    let page = doc.entity(&id).unwrap();
    assert_eq!(page.name, "Untitled");
    assert_eq!(page.kind(), EntityKind::Page);
    assert!(doc.root_children().contains(&id));
}

#[tokio::test]
async fn test_set_current_page_scenarios() {
    // GIVEN a document with a second page
    let mut doc = new_document();
    let cover = send_ok(&mut doc, "create-page", json!({"name": "Cover"})).await;

    // WHEN no page matches
    let error = send_err(&mut doc, "set-current-page", json!({"idOrName": "Missing"})).await;

    // THEN the failure names the selector and the current page is unchanged
    assert_eq!(error, "Page not found: Missing");
    assert_eq!(doc.current_page_id(), "0:1");

    // WHEN matching by id
    let response = send(&mut doc, "set-current-page", json!({"idOrName": cover})).await;

    // THEN the page becomes current and is described
    assert!(response.ok);
    let descriptor = response.result.as_ref().and_then(|r| r.as_entity()).unwrap();
    assert_eq!(descriptor.id, cover);
    assert_eq!(descriptor.name, "Cover");
    assert_eq!(descriptor.kind, EntityKind::Page);
    assert_eq!(doc.current_page_id(), cover);
}

#[tokio::test]
async fn test_set_current_page_first_match_wins() {
    let mut doc = new_document();
    let first = send_ok(&mut doc, "create-page", json!({"name": "Dup"})).await;
    let _second = send_ok(&mut doc, "create-page", json!({"name": "Dup"})).await;

    send_ok(&mut doc, "set-current-page", json!({"idOrName": "Dup"})).await;
    assert_eq!(doc.current_page_id(), first);
}

#[tokio::test]
async fn test_set_current_page_requires_selector() {
    let mut doc = new_document();
    assert_eq!(
        send_err(&mut doc, "set-current-page", json!({"idOrName": ""})).await,
        "Missing idOrName"
    );
}

#[tokio::test]
async fn test_red_frame_is_child_of_parent() {
    // GIVEN a container frame
    let mut doc = new_document();
    let parent = send_ok(&mut doc, "create-frame", json!({"name": "Shell"})).await;

    // WHEN creating a red frame under it
    let child = send_ok(
        &mut doc,
        "create-frame",
        json!({"name": "Red", "fill": "#FF0000", "parentId": parent}),
    )
    .await;

    // THEN the frame is a child of the parent with a pure red fill
    let parent_entity = doc.entity(&parent).unwrap();
    assert_eq!(parent_entity.children, vec![child.clone()]);

    let entity = doc.entity(&child).unwrap();
    assert_eq!(entity.parent_id.as_deref(), Some(parent.as_str()));
    assert_eq!(
        entity.fills(),
        Some(&[Paint::solid(Color { r: 1.0, g: 0.0, b: 0.0 })][..])
    );
    assert!(!doc.entity("0:1").unwrap().children.contains(&child));
}

#[tokio::test]
async fn test_create_frame_geometry_and_styling() {
    let mut doc = new_document();
    let id = send_ok(
        &mut doc,
        "create-frame",
        json!({
            "x": "10", "y": 20, "width": 320, "height": "48",
            "stroke": "#00f", "strokeWeight": 2, "radius": "8", "opacity": 0.5
        }),
    )
    .await;

    let frame = doc.entity(&id).unwrap();
    assert_eq!(frame.name, "Frame");
    assert_eq!(frame.position(), Some((10.0, 20.0)));
    assert_eq!(frame.size(), Some((320.0, 48.0)));
    assert_eq!(
        frame.strokes().map(|s| s[0].color()),
        Some(Color::from_rgb8(0, 0, 255))
    );
    assert_eq!(frame.stroke_weight(), Some(2.0));
    assert_eq!(frame.corner_radius(), Some(8.0));
    assert_eq!(frame.opacity(), Some(0.5));
}

#[tokio::test]
async fn test_create_frame_skips_invalid_optionals() {
    let mut doc = new_document();
    let id = send_ok(
        &mut doc,
        "create-frame",
        json!({"fill": "red", "stroke": 12, "strokeWeight": "", "radius": "big", "opacity": null}),
    )
    .await;

    let frame = doc.entity(&id).unwrap();
    assert_eq!(frame.fills().map(|f| f[0].color()), Some(Color::from_rgb8(255, 255, 255)));
    assert_eq!(frame.strokes(), Some(&[][..]));
    assert_eq!(frame.stroke_weight(), Some(1.0));
    assert_eq!(frame.corner_radius(), Some(0.0));
    assert_eq!(frame.opacity(), Some(1.0));
}

#[tokio::test]
async fn test_create_frame_without_layout_mode_leaves_layout_untouched() {
    let mut doc = new_document();
    let id = send_ok(
        &mut doc,
        "create-frame",
        json!({"itemSpacing": 16, "padding": "1,2,3,4"}),
    )
    .await;

    let layout = doc.entity(&id).unwrap().auto_layout().unwrap().clone();
    assert_eq!(layout.layout_mode, LayoutMode::None);
    assert_eq!(layout.primary_axis_sizing_mode, SizingMode::Fixed);
    assert_eq!(layout.counter_axis_sizing_mode, SizingMode::Fixed);
    assert_eq!(layout.item_spacing, 0.0);
    assert_eq!(layout.padding, PaddingQuad::default());
}

#[tokio::test]
async fn test_create_frame_with_layout_forces_auto_sizing() {
    let mut doc = new_document();
    let id = send_ok(
        &mut doc,
        "create-frame",
        json!({
            "layoutMode": "HORIZONTAL", "width": 400, "itemSpacing": "12", "padding": 8
        }),
    )
    .await;

    let frame = doc.entity(&id).unwrap();
    let layout = frame.auto_layout().unwrap();
    assert_eq!(layout.layout_mode, LayoutMode::Horizontal);
    assert_eq!(layout.primary_axis_sizing_mode, SizingMode::Auto);
    assert_eq!(layout.counter_axis_sizing_mode, SizingMode::Auto);
    assert_eq!(layout.item_spacing, 12.0);
    assert_eq!(layout.padding, PaddingQuad::uniform(8.0));
    assert_eq!(frame.size(), Some((400.0, 100.0)));
}

#[tokio::test]
async fn test_create_frame_under_leaf_parent_falls_back_to_current_page() {
    let mut doc = new_document();
    let text = send_ok(&mut doc, "create-text", json!({"text": "label"})).await;

    let frame = send_ok(&mut doc, "create-frame", json!({"parentId": text})).await;
    assert_eq!(doc.entity(&frame).unwrap().parent_id.as_deref(), Some("0:1"));

    let frame = send_ok(&mut doc, "create-frame", json!({"parentId": "99:99"})).await;
    assert_eq!(doc.entity(&frame).unwrap().parent_id.as_deref(), Some("0:1"));
}

#[tokio::test]
async fn test_create_frame_lands_on_switched_page() {
    let mut doc = new_document();
    let screens = send_ok(&mut doc, "create-page", json!({"name": "Screens"})).await;
    send_ok(&mut doc, "set-current-page", json!({"idOrName": "Screens"})).await;

    let frame = send_ok(&mut doc, "create-frame", json!({})).await;
    assert_eq!(doc.entity(&frame).unwrap().parent_id.as_deref(), Some(screens.as_str()));
}

#[tokio::test]
async fn test_create_text_loads_font_and_sets_content() {
    let mut doc = new_document();
    let id = send_ok(
        &mut doc,
        "create-text",
        json!({
            "text": "Hello", "fontFamily": "Inter", "fontStyle": "Bold",
            "fontSize": 24, "x": 4, "fill": "#333333", "opacity": "0.8"
        }),
    )
    .await;

    let text = doc.entity(&id).unwrap();
    assert_eq!(text.kind(), EntityKind::Text);
    assert_eq!(text.name, "Text");
    assert_eq!(text.characters(), Some("Hello"));
    assert_eq!(text.font_name(), Some(&FontName::new("Inter", "Bold")));
    assert_eq!(text.font_size(), Some(24.0));
    assert_eq!(text.position(), Some((4.0, 0.0)));
    assert_eq!(text.fills().map(|f| f[0].color()), Some(Color::from_rgb8(0x33, 0x33, 0x33)));
    assert_eq!(text.opacity(), Some(0.8));
    assert!(doc.is_font_loaded(&FontName::new("Inter", "Bold")));
}

#[tokio::test]
async fn test_create_text_with_unavailable_font_propagates_host_failure() {
    let mut doc = new_document();
    let error = send_err(
        &mut doc,
        "create-text",
        json!({"fontFamily": "Papyrus", "text": "nope"}),
    )
    .await;
    assert_eq!(error, "The font \"Papyrus Regular\" could not be loaded");
}

#[tokio::test]
async fn test_set_text_scenarios() {
    let mut doc = new_document();
    let text = send_ok(&mut doc, "create-text", json!({"text": "before"})).await;
    let frame = send_ok(&mut doc, "create-frame", json!({})).await;

    assert_eq!(
        send_err(&mut doc, "set-text", json!({"id": frame, "text": "x"})).await,
        "Text node not found"
    );
    assert_eq!(
        send_err(&mut doc, "set-text", json!({"id": "42:42", "text": "x"})).await,
        "Text node not found"
    );
    assert_eq!(
        send_err(&mut doc, "set-text", json!({"id": text})).await,
        "Missing text"
    );
    assert_eq!(
        send_err(&mut doc, "set-text", json!({"id": text, "text": ["a"]})).await,
        "Missing text"
    );

    send_ok(&mut doc, "set-text", json!({"id": text, "text": "after"})).await;
    assert_eq!(doc.entity(&text).unwrap().characters(), Some("after"));

    send_ok(&mut doc, "set-text", json!({"id": text, "text": ""})).await;
    assert_eq!(doc.entity(&text).unwrap().characters(), Some(""));
}

#[tokio::test]
async fn test_set_fill_scenarios() {
    let mut doc = new_document();
    let frame = send_ok(&mut doc, "create-frame", json!({})).await;

    assert_eq!(
        send_err(&mut doc, "set-fill", json!({"id": "8:8", "color": "#000"})).await,
        "Node not found"
    );

    send_ok(&mut doc, "set-fill", json!({"id": frame, "color": "00ff00"})).await;
    assert_eq!(
        doc.entity(&frame).unwrap().fills().map(|f| f[0].color()),
        Some(Color::from_rgb8(0, 255, 0))
    );

    // Undecodable colors leave the fill as it was
    send_ok(&mut doc, "set-fill", json!({"id": frame, "color": "#12"})).await;
    assert_eq!(
        doc.entity(&frame).unwrap().fills().map(|f| f[0].color()),
        Some(Color::from_rgb8(0, 255, 0))
    );
}

#[tokio::test]
async fn test_set_fill_on_fill_less_entity_is_a_successful_noop() {
    let mut doc = new_document();
    let before = doc.entity("0:1").unwrap().clone();

    let id = send_ok(&mut doc, "set-fill", json!({"id": "0:1", "color": "#FF0000"})).await;

    assert_eq!(id, "0:1");
    assert_eq!(doc.entity("0:1").unwrap(), &before);
}

#[tokio::test]
async fn test_set_opacity_scenarios() {
    let mut doc = new_document();
    let text = send_ok(&mut doc, "create-text", json!({})).await;

    assert_eq!(
        send_err(&mut doc, "set-opacity", json!({"id": "0:1", "value": 0.5})).await,
        "Opacity-capable node not found"
    );
    assert_eq!(
        send_err(&mut doc, "set-opacity", json!({"id": text, "value": "abc"})).await,
        "Missing opacity value"
    );

    send_ok(&mut doc, "set-opacity", json!({"id": text, "value": "0.25"})).await;
    assert_eq!(doc.entity(&text).unwrap().opacity(), Some(0.25));
}

#[tokio::test]
async fn test_set_layout_scenarios() {
    let mut doc = new_document();
    let frame = send_ok(&mut doc, "create-frame", json!({})).await;
    let text = send_ok(&mut doc, "create-text", json!({})).await;

    assert_eq!(
        send_err(&mut doc, "set-layout", json!({"id": text, "mode": "VERTICAL"})).await,
        "Layout node not found"
    );

    send_ok(
        &mut doc,
        "set-layout",
        json!({"id": frame, "mode": "vertical", "gap": 6, "padding": "2,4,2,4"}),
    )
    .await;

    let layout = doc.entity(&frame).unwrap().auto_layout().unwrap().clone();
    assert_eq!(layout.layout_mode, LayoutMode::Vertical);
    assert_eq!(layout.item_spacing, 6.0);
    assert_eq!(layout.padding.right, 4.0);
    // set-layout does not touch sizing
    assert_eq!(layout.primary_axis_sizing_mode, SizingMode::Fixed);

    // Unknown modes and bad padding are skipped
    send_ok(
        &mut doc,
        "set-layout",
        json!({"id": frame, "mode": "GRID", "padding": "1,2"}),
    )
    .await;
    let layout = doc.entity(&frame).unwrap().auto_layout().unwrap().clone();
    assert_eq!(layout.layout_mode, LayoutMode::Vertical);
    assert_eq!(layout.padding.right, 4.0);
}

#[tokio::test]
async fn test_failed_command_keeps_earlier_mutations() {
    // GIVEN a font that is listed but fails after the entity is created
    let mut doc = MemoryDocument::new("Partial").with_fonts([FontName::default()]);
    let before = doc.entity("0:1").unwrap().children.len();

    // WHEN create-text asks for an unavailable style
    let error = send_err(&mut doc, "create-text", json!({"fontStyle": "Black"})).await;

    // THEN the failure is reported and the created entity remains
    assert_eq!(error, "The font \"Inter Black\" could not be loaded");
    assert_eq!(doc.entity("0:1").unwrap().children.len(), before + 1);
}

#[tokio::test]
async fn test_every_request_gets_exactly_one_response_with_its_id() {
    let mut doc = new_document();
    for (command, args) in [
        ("status", json!({})),
        ("create-frame", json!({"width": "wide"})),
        ("set-fill", json!({})),
        ("", json!(null)),
    ] {
        let response = send(&mut doc, command, args).await;
        assert_eq!(response.ok, response.error.is_none(), "{}", command);
        assert_eq!(response.ok, response.result.is_some(), "{}", command);
    }
}
