use catalog_core::db::open_db_in_memory;
use catalog_core::{init_logging, Author, RepoError, Repository, SqliteAuthorRepository};
use std::path::Path;

fn read_logs(dir: &Path) -> String {
    std::fs::read_dir(dir)
        .expect("log dir should be readable")
        .filter_map(|entry| std::fs::read_to_string(entry.ok()?.path()).ok())
        .collect()
}

#[test]
fn failed_update_and_remove_are_logged_as_errors() {
    let log_dir = tempfile::tempdir().expect("temp dir should be creatable");
    let log_dir_str = log_dir
        .path()
        .to_str()
        .expect("temp dir should be valid UTF-8")
        .to_string();
    init_logging("info", &log_dir_str).expect("logging should start");

    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();
    let unknown = Author::with_id(77, "Unknown Author", "");

    assert!(matches!(
        repo.update(77, &unknown),
        Err(RepoError::NotFound(77))
    ));
    assert!(matches!(
        repo.update(78, &unknown),
        Err(RepoError::IdentityMismatch { .. })
    ));
    assert!(matches!(repo.remove(&unknown), Err(RepoError::NotFound(77))));

    log::logger().flush();
    let written = read_logs(log_dir.path());
    assert!(written.contains(
        "event=repo_update module=repo status=error table=authors id=77 error_code=not_found"
    ));
    assert!(written.contains(
        "event=repo_update module=repo status=error table=authors id=78 error_code=identity_mismatch"
    ));
    assert!(written.contains(
        "event=repo_remove module=repo status=error table=authors id=77 error_code=not_found"
    ));
    assert!(!written.contains("Unknown Author"));
}
