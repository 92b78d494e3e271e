mod common;

use asciilab_core::catalog::{Availability, Step};
use asciilab_core::ledger::HistoryEntry;
use asciilab_core::params::{Layout, DEFAULT_TYPEFACE, FATAL_OUTPUT, PLACEHOLDER_OUTPUT};
use asciilab_core::scheduler::RenderPhase;
use asciilab_core::session::Change;
use common::session;

#[tokio::test]
async fn renders_with_the_default_typeface() {
    let mut s = session(&[], &[]).await;
    s.apply(Change::Text("HI".into()));

    assert_eq!(s.render_once().await, RenderPhase::Done);
    assert_eq!(s.preview().output, "<Standard>HI");
    assert_eq!(s.preview().used_typeface.as_deref(), Some("Standard"));
    assert_eq!(s.preview().warning, None);
    assert_eq!(s.ledger().history(), &[HistoryEntry::new("HI", "Standard")]);
    assert_eq!(s.controller().resolver().probe_count(DEFAULT_TYPEFACE), 0);
}

#[tokio::test]
async fn unavailable_typeface_falls_back_and_leaves_catalog() {
    let mut s = session(&["Ghostfont"], &[]).await;
    assert!(s.offer_typeface("Ghostfont"));
    s.apply(Change::Text("HI".into()));
    assert!(s.apply(Change::Typeface("Ghostfont".into())));

    s.render_once().await;

    let preview = s.preview();
    assert_eq!(preview.output, "<Standard>HI");
    assert_eq!(preview.used_typeface.as_deref(), Some("Standard"));
    assert_eq!(
        preview.warning.as_deref(),
        Some("\"Ghostfont\" is unavailable right now. Showing STANDARD.")
    );
    assert_eq!(s.catalog().availability("Ghostfont"), Availability::Unavailable);
    assert!(!s.listing().iter().any(|n| n == "Ghostfont"));
    assert_eq!(s.params().typeface, DEFAULT_TYPEFACE);
    assert_eq!(s.ledger().history(), &[HistoryEntry::new("HI", "Standard")]);

    // Gone for good: neither selectable nor re-offerable.
    assert!(!s.apply(Change::Typeface("Ghostfont".into())));
    assert!(!s.offer_typeface("Ghostfont"));
}

#[tokio::test]
async fn warning_only_reflects_the_latest_cycle() {
    let mut s = session(&["Slant"], &[]).await;
    s.apply(Change::Text("HI".into()));
    s.apply(Change::Typeface("Slant".into()));
    s.render_once().await;
    assert!(s.preview().warning.is_some());

    s.apply(Change::Typeface("Big".into()));
    s.render_once().await;
    assert_eq!(s.preview().warning, None);
    assert_eq!(s.preview().used_typeface.as_deref(), Some("Big"));
}

#[tokio::test]
async fn probes_each_typeface_at_most_once() {
    let mut s = session(&["Slant"], &[]).await;
    s.apply(Change::Text("HI".into()));
    for _ in 0..3 {
        s.apply(Change::Typeface("Big".into()));
        s.render_once().await;
        s.apply(Change::Text("HI again".into()));
        s.render_once().await;
    }
    s.apply(Change::Typeface("Slant".into()));
    s.render_once().await;
    s.apply(Change::Typeface("Slant".into()));
    s.render_once().await;

    let resolver = s.controller().resolver();
    assert_eq!(resolver.probe_count("Big"), 1);
    assert_eq!(resolver.probe_count("Slant"), 1);
}

#[tokio::test]
async fn engine_failure_names_the_requested_typeface() {
    let mut s = session(&[], &["Doom"]).await;
    s.apply(Change::Text("HI".into()));
    s.apply(Change::Typeface("Doom".into()));
    s.render_once().await;

    assert_eq!(
        s.preview().warning.as_deref(),
        Some("\"Doom\" failed to render. Showing STANDARD.")
    );
    assert!(!s.catalog().is_offered("Doom"));
    assert_eq!(s.params().typeface, DEFAULT_TYPEFACE);
}

#[tokio::test]
async fn blank_text_shows_placeholder_without_rendering() {
    let mut s = session(&[], &[]).await;
    s.apply(Change::Text("   ".into()));

    assert_eq!(s.render_once().await, RenderPhase::Done);
    assert_eq!(s.preview().output, PLACEHOLDER_OUTPUT);
    assert_eq!(s.preview().warning, None);
    assert!(s.controller().engine().calls.borrow().is_empty());
    assert!(s.ledger().history().is_empty());
}

#[tokio::test]
async fn broken_default_is_fatal_and_leaves_history_alone() {
    let mut s = session(&[], &["Standard"]).await;
    s.apply(Change::Text("HI".into()));

    assert_eq!(s.render_once().await, RenderPhase::Failed);
    assert_eq!(s.preview().output, FATAL_OUTPUT);
    assert!(s.ledger().history().is_empty());
}

#[tokio::test]
async fn stale_render_does_not_reach_history() {
    let mut s = session(&[], &[]).await;
    s.apply(Change::Text("FIRST".into()));
    let snapshot = s.params().clone();
    let outcome = s.render(&snapshot).await;

    s.apply(Change::Text("SECOND".into()));
    s.commit(&snapshot, outcome).await;

    assert_eq!(s.preview().output, "<Standard>FIRST");
    assert!(s.ledger().history().is_empty());
}

#[tokio::test]
async fn inputs_are_clamped() {
    let mut s = session(&[], &[]).await;
    s.apply(Change::Width(5));
    assert_eq!(s.params().width, 10);
    s.apply(Change::Width(9999));
    assert_eq!(s.params().width, 200);
    s.apply(Change::PreviewSize(-3));
    assert_eq!(s.params().preview_size, 10);
    assert_eq!(s.preview().preview_size, 10);
    s.apply(Change::Text("x".repeat(250)));
    assert_eq!(s.params().text.chars().count(), 100);
    assert!(s.params().is_within_bounds());
}

#[tokio::test]
async fn restore_resets_unknown_typeface() {
    let mut s = session(&[], &[]).await;
    assert!(s.apply(Change::Restore(
        "#t=HI&f=Ghostfont&w=120&aw=1&hl=fitted&vl=full&fs=18".into()
    )));

    let p = s.params();
    assert_eq!(p.text, "HI");
    assert_eq!(p.typeface, DEFAULT_TYPEFACE);
    assert_eq!(p.width, 120);
    assert!(p.auto_width);
    assert_eq!(p.horizontal_layout, Layout::Fitted);
    assert_eq!(p.vertical_layout, Layout::Full);
    assert_eq!(p.preview_size, 18);
    assert_eq!(s.preview().preview_size, 18);
}

#[tokio::test]
async fn stepping_follows_search_and_favorites() {
    let mut s = session(&[], &[]).await;
    s.toggle_favorite("Slant").await;
    s.set_search("sla");

    assert_eq!(s.listing(), vec!["Slant", "Slant Relief"]);
    s.apply(Change::StepTypeface(Step::Next));
    assert_eq!(s.params().typeface, "Slant");
    s.apply(Change::StepTypeface(Step::Next));
    assert_eq!(s.params().typeface, "Slant Relief");
    s.apply(Change::StepTypeface(Step::Next));
    assert_eq!(s.params().typeface, "Slant");
    s.apply(Change::StepTypeface(Step::Prev));
    assert_eq!(s.params().typeface, "Slant Relief");
}

#[tokio::test]
async fn random_typeface_comes_from_catalog() {
    let mut s = session(&[], &[]).await;
    for _ in 0..20 {
        s.apply(Change::RandomTypeface);
        assert!(s.catalog().is_offered(&s.params().typeface));
    }
}

#[tokio::test]
async fn history_entry_restores_text_and_typeface() {
    let mut s = session(&[], &[]).await;
    s.apply(Change::Text("HI".into()));
    s.apply(Change::Typeface("Big".into()));
    s.render_once().await;
    s.apply(Change::Text("other".into()));
    s.apply(Change::Typeface("Slant".into()));

    assert!(s.apply(Change::FromHistory(0)));
    assert_eq!(s.params().text, "HI");
    assert_eq!(s.params().typeface, "Big");
    assert!(!s.apply(Change::FromHistory(7)));
}

#[tokio::test]
async fn fragment_tracks_parameters() {
    let mut s = session(&[], &[]).await;
    s.apply(Change::Text("HI there".into()));
    s.apply(Change::HorizontalLayout(Layout::UniversalSmushing));
    assert_eq!(
        s.fragment(),
        "t=HI+there&f=Standard&w=80&aw=0&hl=universal+smushing&vl=default&fs=12"
    );
}
