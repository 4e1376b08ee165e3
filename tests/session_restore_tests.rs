//! Tests for bootstrapping from the recent-files ledger
//!
//! Active ledger rows are reopened in ledger order when the restore
//! preference is on. Rows whose file has disappeared are skipped, and the
//! previously current tab is reselected (clamped to what was restored).

mod common;

use common::HarnessBuilder;
use quire::ledger::{InMemoryLedger, RecentFilesLedger};
use std::sync::Arc;

#[tokio::test]
async fn test_restore_reopens_active_files_in_order() {
    let h = HarnessBuilder::new()
        .restore(true)
        .with_active_file("a.txt", 3)
        .with_active_file("b.txt", 9)
        .start();

    assert_eq!(h.titles(), vec!["a.txt", "b.txt"]);
    let b = h.coordinator.document(1).unwrap();
    assert_eq!(b.cursor_offset(), 9);
    assert_eq!(b.encoding(), Some("UTF-8"));
}

#[tokio::test]
async fn test_restore_loads_file_contents() {
    let builder = HarnessBuilder::new()
        .restore(true)
        .with_active_file("a.txt", 0);
    common::write_file(builder.dir(), "a.txt", "left over from last time");
    let h = builder.start();

    let doc = h.coordinator.document(0).unwrap();
    assert_eq!(doc.text(), "left over from last time");
    assert!(!doc.is_modified());
}

#[tokio::test]
async fn test_restore_skips_unreadable_files() {
    let builder = HarnessBuilder::new()
        .restore(true)
        .with_active_file("a.txt", 0)
        .with_active_file("b.dat", 0);
    std::fs::write(builder.dir().join("b.dat"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
    let h = builder.start();

    assert_eq!(h.titles(), vec!["a.txt"]);
}

#[tokio::test]
async fn test_restore_publishes_tab_list_once() {
    let h = HarnessBuilder::new()
        .restore(true)
        .with_active_file("a.txt", 0)
        .with_active_file("b.txt", 0)
        .with_active_file("c.txt", 0)
        .start();

    let log = h.views.lock();
    assert_eq!(log.tab_lists.len(), 1);
    assert_eq!(log.page_sets, 1);
}

#[tokio::test]
async fn test_restore_selects_last_active_position() {
    let h = HarnessBuilder::new()
        .restore(true)
        .last_tab(1)
        .with_active_file("a.txt", 0)
        .with_active_file("b.txt", 0)
        .with_active_file("c.txt", 0)
        .start();

    assert_eq!(h.coordinator.current_tab(), Some(1));
    assert_eq!(
        h.toolbar_titles().last().unwrap(),
        &h.canonical("b.txt").display().to_string()
    );
}

#[tokio::test]
async fn test_restore_clamps_stale_last_position() {
    let h = HarnessBuilder::new()
        .restore(true)
        .last_tab(5)
        .with_active_file("a.txt", 0)
        .with_active_file("b.txt", 0)
        .start();

    assert_eq!(h.coordinator.current_tab(), Some(1));
}

#[tokio::test]
async fn test_restore_skips_missing_files() {
    let builder = HarnessBuilder::new()
        .restore(true)
        .with_active_file("a.txt", 0)
        .with_active_file("gone.txt", 0)
        .with_active_file("c.txt", 0);
    std::fs::remove_file(builder.dir().join("gone.txt")).unwrap();
    let h = builder.start();

    assert_eq!(h.titles(), vec!["a.txt", "c.txt"]);
}

#[tokio::test]
async fn test_restore_skips_directories() {
    let builder = HarnessBuilder::new().restore(true);
    let dir_path = builder.dir().join("folder");
    std::fs::create_dir(&dir_path).unwrap();
    let ledger = Arc::new(InMemoryLedger::new(10));
    ledger.upsert_entry(&dir_path, 0, "UTF-8", true).unwrap();

    let h = builder.ledger(ledger).start();

    assert_eq!(h.titles(), vec!["new file 1"]);
}

#[tokio::test]
async fn test_restore_ignores_inactive_rows() {
    let builder = HarnessBuilder::new().restore(true);
    let path = common::touch(builder.dir(), "old.txt");
    let ledger = Arc::new(InMemoryLedger::new(10));
    ledger.upsert_entry(&path, 0, "UTF-8", false).unwrap();

    let h = builder.ledger(ledger).start();

    assert_eq!(h.titles(), vec!["new file 1"]);
}

#[tokio::test]
async fn test_restore_disabled_leaves_files_closed() {
    let h = HarnessBuilder::new()
        .restore(false)
        .with_active_file("a.txt", 0)
        .start();

    assert_eq!(h.titles(), vec!["new file 1"]);
    assert_eq!(h.coordinator.current_tab(), Some(0));
}

#[tokio::test]
async fn test_all_files_missing_falls_back_to_blank_tab() {
    let builder = HarnessBuilder::new()
        .restore(true)
        .with_active_file("a.txt", 0);
    std::fs::remove_file(builder.dir().join("a.txt")).unwrap();
    let h = builder.start();

    assert_eq!(h.titles(), vec!["new file 1"]);
}

#[tokio::test]
async fn test_session_round_trip() {
    let ledger = Arc::new(InMemoryLedger::new(10));
    let mut first = HarnessBuilder::new()
        .restore(true)
        .ledger(ledger.clone())
        .start();
    let a = first.touch("a.txt");
    let b = first.touch("b.txt");
    first.coordinator.open_or_focus(&a, 0, "UTF-8").unwrap();
    first.coordinator.open_or_focus(&b, 0, "UTF-8").unwrap();
    first
        .coordinator
        .edit_document(2, |doc| doc.set_cursor_offset(21))
        .unwrap();
    first.coordinator.close_all_and_exit();
    first.coordinator.run_until_idle().await;
    assert!(first.coordinator.is_terminated());

    // Next launch reads the same ledger
    let second = HarnessBuilder::new()
        .restore(true)
        .last_tab(first.stored_preferences().last_tab)
        .ledger(ledger)
        .start();

    assert_eq!(second.titles(), vec!["a.txt", "b.txt"]);
    // b.txt was current at position 2; only two tabs come back, so it is now 1
    assert_eq!(second.coordinator.current_tab(), Some(1));
    assert_eq!(second.coordinator.document(1).unwrap().cursor_offset(), 21);
}
