//! Integration tests for `DieselNoteRepository` against a temporary SQLite
//! database.

use std::time::Duration;

use bookmd::domain::ports::{NoteRepository, NoteRepositoryError};
use bookmd::domain::{ImageRef, NewNote, NoteId};
use bookmd::outbound::persistence::{DieselNoteRepository, run_migrations};
use rstest::rstest;

mod support;

use support::TestDatabase;

fn image(name: &str) -> ImageRef {
    ImageRef::new(name).expect("valid image name")
}

fn new_note(image_name: &str, markdown: &str) -> NewNote {
    NewNote {
        image: image(image_name),
        markdown: markdown.to_owned(),
    }
}

async fn repository() -> (TestDatabase, DieselNoteRepository) {
    let db = TestDatabase::new().await;
    let repo = DieselNoteRepository::new(db.pool.clone());
    (db, repo)
}

#[rstest]
#[tokio::test]
async fn create_then_get_round_trips_and_ids_increase() {
    let (_db, repo) = repository().await;

    let first = repo
        .create(&new_note("a.png", "# First"))
        .await
        .expect("create first");
    let second = repo
        .create(&new_note("b.png", ""))
        .await
        .expect("create second");

    assert!(second.id > first.id);
    let fetched = repo.get_by_id(first.id).await.expect("get first");
    assert_eq!(fetched, first);
    assert_eq!(fetched.image.as_str(), "a.png");
    assert_eq!(fetched.markdown, "# First");
    let empty = repo.get_by_id(second.id).await.expect("get second");
    assert_eq!(empty.markdown, "");
}

#[rstest]
#[tokio::test]
async fn update_replaces_image_and_markdown_but_not_creation_time() {
    let (_db, repo) = repository().await;
    let created = repo
        .create(&new_note("old.png", "# Old"))
        .await
        .expect("create");
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = repo
        .update_by_id(created.id, &image("new.jpg"), "# New")
        .await
        .expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.image.as_str(), "new.jpg");
    assert_eq!(updated.markdown, "# New");
    assert_eq!(updated.date_created, created.date_created);
    assert_eq!(repo.get_by_id(created.id).await.expect("get"), updated);
}

#[rstest]
#[tokio::test]
async fn update_unknown_id_is_not_found_and_changes_nothing() {
    let (_db, repo) = repository().await;
    let existing = repo
        .create(&new_note("a.png", "# Keep"))
        .await
        .expect("create");
    let missing = NoteId::new(existing.id.get() + 100);

    let err = repo
        .update_by_id(missing, &image("b.png"), "# Lost")
        .await
        .expect_err("unknown id");

    assert_eq!(err, NoteRepositoryError::not_found(missing));
    let all = repo.list_all().await.expect("list");
    assert_eq!(all, vec![existing]);
}

#[rstest]
#[tokio::test]
async fn get_and_delete_report_missing_rows() {
    let (_db, repo) = repository().await;
    let missing = NoteId::new(42);

    assert_eq!(
        repo.get_by_id(missing).await.expect_err("missing"),
        NoteRepositoryError::not_found(missing)
    );
    assert_eq!(
        repo.delete_by_id(missing).await.expect_err("missing"),
        NoteRepositoryError::not_found(missing)
    );
}

#[rstest]
#[tokio::test]
async fn delete_removes_the_row_and_ids_are_not_reused() {
    let (_db, repo) = repository().await;
    let first = repo.create(&new_note("a.png", "")).await.expect("create");

    repo.delete_by_id(first.id).await.expect("delete");
    let next = repo.create(&new_note("b.png", "")).await.expect("create");

    assert!(matches!(
        repo.get_by_id(first.id).await,
        Err(NoteRepositoryError::NotFound { .. })
    ));
    assert!(next.id > first.id);
}

#[rstest]
#[tokio::test]
async fn list_all_is_newest_first() {
    let (_db, repo) = repository().await;
    let mut created = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        created.push(repo.create(&new_note(name, name)).await.expect("create"));
    }

    let listed: Vec<NoteId> = repo
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .map(|note| note.id)
        .collect();

    let mut expected: Vec<NoteId> = created.iter().map(|note| note.id).collect();
    expected.reverse();
    assert_eq!(listed, expected);
}

#[rstest]
#[tokio::test]
async fn list_all_on_empty_table_is_empty() {
    let (_db, repo) = repository().await;
    assert!(repo.list_all().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn migrations_are_idempotent() {
    let (db, repo) = repository().await;
    let created = repo.create(&new_note("a.png", "# Kept")).await.expect("create");

    run_migrations(&db.url).await.expect("second run succeeds");

    assert_eq!(repo.get_by_id(created.id).await.expect("get"), created);
}

#[rstest]
#[tokio::test]
async fn references_image_tracks_current_rows() {
    let (_db, repo) = repository().await;
    let shared = image("shared.png");
    assert!(!repo.references_image(&shared).await.expect("lookup"));

    let created = repo
        .create(&new_note("shared.png", ""))
        .await
        .expect("create");
    assert!(repo.references_image(&shared).await.expect("lookup"));

    repo.update_by_id(created.id, &image("other.png"), "")
        .await
        .expect("update");
    assert!(!repo.references_image(&shared).await.expect("lookup"));
}

#[rstest]
#[tokio::test]
async fn ids_beyond_32_bits_are_plain_misses() {
    let (_db, repo) = repository().await;
    let wide = NoteId::new(i64::from(i32::MAX) + 1);

    assert_eq!(
        repo.get_by_id(wide).await.expect_err("missing"),
        NoteRepositoryError::not_found(wide)
    );
}
