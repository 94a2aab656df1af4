use mynote_core::{
    MemoryNoteRepository, MemorySettingsStore, NoteViewModel, SaveNotification, SaveOutcome,
    Settings, ViewModelError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

type Vm = NoteViewModel<Arc<MemoryNoteRepository>>;

fn setup(auto_save_enabled: bool) -> (Arc<MemoryNoteRepository>, Vm) {
    let repo = Arc::new(MemoryNoteRepository::new());
    let vm = NoteViewModel::new(
        Arc::clone(&repo),
        Arc::new(MemorySettingsStore::new(Settings { auto_save_enabled })),
        Duration::from_secs(2),
    );
    (repo, vm)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn edit_inside_window_restarts_the_timer() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);

    editor.edit("", "first");
    sleep(ms(1500)).await;
    editor.edit("", "first draft");

    sleep(ms(600)).await;
    assert_eq!(repo.write_count(), 0);
    assert!(editor.has_pending_auto_save());

    sleep(ms(1500)).await;
    assert_eq!(repo.write_count(), 1);
    assert_eq!(vm.notes()[0].content, "first draft");
    assert_eq!(vm.save_notification(), SaveNotification::None);
    assert!(!editor.is_dirty());
    assert!(!editor.has_pending_auto_save());
}

#[tokio::test(start_paused = true)]
async fn quiet_period_persists_exactly_once() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);

    editor.edit("Title", "");
    sleep(ms(2100)).await;
    assert_eq!(repo.write_count(), 1);

    sleep(ms(5000)).await;
    assert_eq!(repo.write_count(), 1);
    assert_eq!(vm.save_notification(), SaveNotification::None);
}

#[tokio::test(start_paused = true)]
async fn later_auto_saves_update_the_inserted_row() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);

    editor.edit("v1", "");
    sleep(ms(2100)).await;
    let id = editor.note().and_then(|note| note.id).unwrap();

    editor.edit("v2", "");
    sleep(ms(2100)).await;

    assert_eq!(repo.write_count(), 2);
    let notes = vm.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, Some(id));
    assert_eq!(notes[0].title, "v2");
}

#[tokio::test(start_paused = true)]
async fn editing_existing_note_updates_in_place() {
    let (repo, vm) = setup(true);
    let original = vm.insert_note("t", "c").unwrap().saved().unwrap().clone();

    let editor = vm.open_editor(Some(original.clone()));
    editor.edit("t", "c changed");
    sleep(ms(2100)).await;

    assert_eq!(repo.write_count(), 2);
    let notes = vm.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, original.id);
    assert_eq!(notes[0].content, "c changed");
}

#[tokio::test(start_paused = true)]
async fn disabling_auto_save_cancels_pending_write() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);

    editor.edit("", "pending");
    sleep(ms(1000)).await;
    vm.set_auto_save_enabled(false).unwrap();
    sleep(ms(3000)).await;

    assert_eq!(repo.write_count(), 0);
    assert!(editor.is_dirty());
    assert!(!editor.close().unwrap());
    assert_eq!(repo.write_count(), 0);
    assert_eq!(vm.save_notification(), SaveNotification::None);
}

#[tokio::test(start_paused = true)]
async fn blank_or_unchanged_edits_do_not_arm_a_timer() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);

    editor.edit("  ", "\n");
    assert!(!editor.has_pending_auto_save());
    assert!(!editor.is_dirty());

    editor.edit("a", "");
    editor.edit("", "");
    assert!(!editor.has_pending_auto_save());
    sleep(ms(3000)).await;
    assert_eq!(repo.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn reverting_to_saved_text_clears_dirty() {
    let (repo, vm) = setup(true);
    let original = vm.insert_note("t", "c").unwrap().saved().unwrap().clone();
    let editor = vm.open_editor(Some(original));

    editor.edit("t", "cc");
    assert!(editor.is_dirty());
    editor.edit("t", "c");
    assert!(!editor.is_dirty());

    sleep(ms(3000)).await;
    assert_eq!(repo.write_count(), 1);
    assert!(!editor.close().unwrap());
}

#[tokio::test(start_paused = true)]
async fn manual_save_writes_once_and_notifies_even_with_auto_save_off() {
    for auto_save_enabled in [true, false] {
        let (repo, vm) = setup(auto_save_enabled);
        let editor = vm.open_editor(None);

        editor.edit("manual", "");
        let outcome = editor.save().unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved(_)));
        assert_eq!(vm.save_notification(), SaveNotification::Manual);

        sleep(ms(3000)).await;
        assert_eq!(repo.write_count(), 1);
        assert!(!editor.close().unwrap());
        assert_eq!(repo.write_count(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn manual_save_of_blank_note_writes_nothing() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);
    assert_eq!(editor.save().unwrap(), SaveOutcome::SkippedBlank);
    assert_eq!(repo.write_count(), 0);
    assert_eq!(vm.save_notification(), SaveNotification::None);
}

#[tokio::test(start_paused = true)]
async fn close_saves_dirty_note_with_auto_notification() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);

    editor.edit("leaving", "soon");
    assert!(editor.close().unwrap());
    assert_eq!(repo.write_count(), 1);
    assert_eq!(vm.save_notification(), SaveNotification::Auto);

    sleep(ms(3000)).await;
    assert_eq!(repo.write_count(), 1);
    assert!(!editor.close().unwrap());
    editor.edit("after close", "");
    assert!(!editor.has_pending_auto_save());
}

#[tokio::test(start_paused = true)]
async fn close_without_auto_save_discards_changes() {
    let (repo, vm) = setup(false);
    let editor = vm.open_editor(None);

    editor.edit("unsaved", "");
    assert!(!editor.has_pending_auto_save());
    assert!(!editor.close().unwrap());
    assert_eq!(repo.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn delete_from_editor_removes_note_and_cancels_timer() {
    let (repo, vm) = setup(true);
    let original = vm.insert_note("t", "c").unwrap().saved().unwrap().clone();
    let editor = vm.open_editor(Some(original));

    editor.edit("t", "edited");
    editor.delete().unwrap();
    sleep(ms(3000)).await;

    assert!(vm.notes().is_empty());
    assert_eq!(repo.write_count(), 2);
    assert!(editor.is_closed());
}

#[tokio::test(start_paused = true)]
async fn save_after_delete_does_not_resurrect_the_note() {
    let (repo, vm) = setup(true);
    let original = vm.insert_note("t", "c").unwrap().saved().unwrap().clone();
    let editor = vm.open_editor(Some(original));

    editor.delete().unwrap();
    let writes = repo.write_count();

    let err = editor.save().unwrap_err();
    assert!(matches!(err, ViewModelError::SessionClosed));
    assert_eq!(repo.write_count(), writes);
    assert!(vm.notes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn save_after_close_writes_nothing() {
    let (repo, vm) = setup(false);
    let editor = vm.open_editor(None);

    editor.edit("kept local", "");
    assert!(!editor.close().unwrap());
    assert!(matches!(editor.save(), Err(ViewModelError::SessionClosed)));
    assert_eq!(repo.write_count(), 0);
    assert_eq!(vm.save_notification(), SaveNotification::None);
}

#[tokio::test(start_paused = true)]
async fn close_can_be_retried_after_a_failed_write() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);
    editor.edit("retry me", "");

    repo.set_fail_writes(true);
    assert!(editor.close().is_err());
    assert!(!editor.is_closed());
    assert!(editor.is_dirty());
    assert_eq!(vm.save_notification(), SaveNotification::Failed);

    repo.set_fail_writes(false);
    assert!(editor.close().unwrap());
    assert!(editor.is_closed());
    assert_eq!(repo.write_count(), 1);
    assert_eq!(vm.notes()[0].title, "retry me");
    assert_eq!(vm.save_notification(), SaveNotification::Auto);
}

#[tokio::test(start_paused = true)]
async fn failed_auto_save_raises_failure_notification() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);
    repo.set_fail_writes(true);

    editor.edit("doomed", "");
    sleep(ms(2100)).await;

    assert_eq!(repo.write_count(), 0);
    assert_eq!(vm.save_notification(), SaveNotification::Failed);
    assert!(editor.is_dirty());

    repo.set_fail_writes(false);
    assert!(editor.save().is_ok());
    assert_eq!(vm.save_notification(), SaveNotification::Manual);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_cancels_the_timer() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);
    editor.edit("dropped", "");
    drop(editor);

    sleep(ms(3000)).await;
    assert_eq!(repo.write_count(), 0);
}

#[test]
fn edit_without_runtime_tracks_text_but_arms_nothing() {
    let (repo, vm) = setup(true);
    let editor = vm.open_editor(None);
    editor.edit("no runtime", "");
    assert!(editor.is_dirty());
    assert!(!editor.has_pending_auto_save());
    assert_eq!(editor.title(), "no runtime");
    assert!(editor.close().unwrap());
    assert_eq!(repo.write_count(), 1);
}
