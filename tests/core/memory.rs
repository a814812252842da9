use hcmd::core::error::HcmdError;
use hcmd::core::memory::{RECENT_OBJECTS_CAP, SessionMemory};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_and_reload_round_trip() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("state").join("memory.json");

    let mut memory = SessionMemory::load(&path);
    assert!(memory.last_path().is_none());
    memory.push_object("/work/notes.txt");
    memory.set_last_src("/work/a.txt");
    memory.set_last_dst("/work/backup");
    memory.set_last_git_intent("GIT_STATUS");
    memory.push_rollback("rm \"/work/notes.txt\"".to_string());
    memory.save().unwrap();

    let reloaded = SessionMemory::load(&path);
    assert_eq!(reloaded.state, memory.state);
    assert_eq!(reloaded.last_path(), Some("/work/notes.txt"));
    assert_eq!(reloaded.last_git_intent(), Some("GIT_STATUS"));
    assert_eq!(reloaded.peek_rollback(), Some("rm \"/work/notes.txt\""));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("memory.json");
    fs::write(&path, "{ this is not json").unwrap();

    let err = SessionMemory::try_load(&path).unwrap_err();
    assert!(matches!(err, HcmdError::CorruptState(_)));

    let memory = SessionMemory::load(&path);
    assert!(memory.last_path().is_none());
    assert!(memory.state.history.is_empty());
}

#[test]
fn test_missing_fields_use_defaults() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("memory.json");
    fs::write(&path, r#"{"last_path": "/work/a.txt"}"#).unwrap();

    let memory = SessionMemory::load(&path);
    assert_eq!(memory.last_path(), Some("/work/a.txt"));
    assert!(memory.last_src().is_none());
    assert!(memory.state.history.is_empty());
}

#[test]
fn test_recent_objects_ring_is_capped() {
    let mut memory = SessionMemory::in_memory();
    for i in 0..8 {
        memory.push_object(&format!("/work/{}.txt", i));
    }
    let recent: Vec<&str> = memory.recent_objects().collect();
    assert_eq!(recent.len(), RECENT_OBJECTS_CAP);
    assert_eq!(recent.first(), Some(&"/work/3.txt"));
    assert_eq!(recent.last(), Some(&"/work/7.txt"));
    assert_eq!(memory.last_path(), Some("/work/7.txt"));
}

#[test]
fn test_oversized_ring_on_disk_is_trimmed() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("memory.json");
    let objects: Vec<String> = (0..9).map(|i| format!("/work/{}.txt", i)).collect();
    let body = serde_json::json!({ "recent_objects": objects });
    fs::write(&path, body.to_string()).unwrap();

    let memory = SessionMemory::load(&path);
    let recent: Vec<&str> = memory.recent_objects().collect();
    assert_eq!(recent.len(), RECENT_OBJECTS_CAP);
    assert_eq!(recent.last(), Some(&"/work/8.txt"));
}

#[test]
fn test_rollback_history_is_lifo() {
    let mut memory = SessionMemory::in_memory();
    memory.push_rollback("first".to_string());
    memory.push_rollback("second".to_string());
    assert_eq!(memory.pop_rollback().as_deref(), Some("second"));
    assert_eq!(memory.pop_rollback().as_deref(), Some("first"));
    assert!(memory.pop_rollback().is_none());
}

#[test]
fn test_in_memory_save_is_a_no_op() {
    let mut memory = SessionMemory::in_memory();
    memory.push_object("/work/a.txt");
    memory.save().unwrap();
    assert!(memory.path().as_os_str().is_empty());
}
