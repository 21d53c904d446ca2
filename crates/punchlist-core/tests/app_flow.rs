use chrono::Utc;
use punchlist_core::App;
use punchlist_core::actions::ActionError;
use punchlist_core::theme::Theme;
use punchlist_core::view::View;
use tempfile::tempdir;

fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn open_app(dir: &tempfile::TempDir) -> App {
    let rc = dir.path().join("rc");
    std::fs::write(&rc, "").expect("write empty rc");
    App::open(Some(&rc), Some(&dir.path().join("data"))).expect("open app")
}

#[test]
fn create_toggle_save_delete_round_trip() {
    let dir = tempdir().expect("tempdir");
    let app = open_app(&dir);
    let now = Utc::now();

    // Seed one task, then add another through the write endpoint.
    app.submit(&form(&[("intent", "create task"), ("description", "buy milk")]), now)
        .expect("create first");
    let created = app
        .submit(
            &form(&[("intent", "create task"), ("description", "walk dog")]),
            now,
        )
        .expect("create second")
        .expect("created record returned");

    let tasks = app.tasks().expect("read");
    assert_eq!(tasks.len(), 2);
    assert!(!created.completed);
    assert!(created.completed_at.is_none());

    // Toggling an active task completes it and stamps completedAt.
    let id = created.id.to_string();
    let toggled = app
        .submit(
            &form(&[
                ("intent", "toggle completion"),
                ("id", &id),
                ("completed", "false"),
            ]),
            now,
        )
        .expect("toggle")
        .expect("updated record returned");
    assert!(toggled.completed);
    assert_eq!(toggled.completed_at, Some(now));

    // Toggling back clears the stamp.
    let untoggled = app
        .submit(
            &form(&[
                ("intent", "toggle completion"),
                ("id", &id),
                ("completed", "true"),
            ]),
            now,
        )
        .expect("toggle back")
        .expect("updated record returned");
    assert!(!untoggled.completed);
    assert!(untoggled.completed_at.is_none());

    // Edit then save with a new description.
    let editing = app
        .submit(&form(&[("intent", "edit task"), ("id", &id)]), now)
        .expect("edit")
        .expect("record");
    assert!(editing.editing);

    let saved = app
        .submit(
            &form(&[
                ("intent", "save task"),
                ("id", &id),
                ("description", "walk the dog"),
            ]),
            now,
        )
        .expect("save")
        .expect("record");
    assert_eq!(saved.description, "walk the dog");
    assert!(!saved.editing);

    // Delete returns no record; the list shrinks.
    let outcome = app
        .submit(&form(&[("intent", "delete task"), ("id", &id)]), now)
        .expect("delete");
    assert!(outcome.is_none());
    assert_eq!(app.tasks().expect("read").len(), 1);
}

#[test]
fn empty_save_is_rejected_and_row_stays_in_edit_mode() {
    let dir = tempdir().expect("tempdir");
    let app = open_app(&dir);
    let now = Utc::now();

    let task = app
        .submit(&form(&[("intent", "create task"), ("description", "buy milk")]), now)
        .expect("create")
        .expect("record");
    let id = task.id.to_string();

    app.submit(&form(&[("intent", "edit task"), ("id", &id)]), now)
        .expect("edit");

    let err = app
        .submit(
            &form(&[("intent", "save task"), ("id", &id), ("description", "  ")]),
            now,
        )
        .expect_err("blank save must fail");
    assert!(matches!(err, ActionError::EmptyDescription));
    assert_eq!(err.status_code(), 422);

    let tasks = app.tasks().expect("read");
    assert_eq!(tasks[0].description, "buy milk");
    assert!(tasks[0].editing, "failed save leaves the row in edit mode");
}

#[test]
fn unknown_intent_fails_without_touching_the_store() {
    let dir = tempdir().expect("tempdir");
    let app = open_app(&dir);
    let now = Utc::now();

    app.submit(&form(&[("intent", "create task"), ("description", "buy milk")]), now)
        .expect("create");

    let err = app
        .submit(&form(&[("intent", "bogus")]), now)
        .expect_err("bogus intent must fail");
    assert!(matches!(err, ActionError::UnknownIntent(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(app.tasks().expect("read").len(), 1);
}

#[test]
fn bulk_intents_clear_and_empty_the_store() {
    let dir = tempdir().expect("tempdir");
    let app = open_app(&dir);
    let now = Utc::now();

    for description in ["one", "two", "three"] {
        app.submit(
            &form(&[("intent", "create task"), ("description", description)]),
            now,
        )
        .expect("create");
    }

    let second = app.tasks().expect("read")[1].clone();
    app.submit(
        &form(&[
            ("intent", "toggle completion"),
            ("id", &second.id.to_string()),
            ("completed", "false"),
        ]),
        now,
    )
    .expect("toggle");

    app.submit(&form(&[("intent", "clear completed")]), now)
        .expect("clear completed");
    let remaining = app.tasks().expect("read");
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|task| !task.completed));

    // Called twice in a row: empty both times, no error.
    app.submit(&form(&[("intent", "delete all")]), now)
        .expect("delete all");
    app.submit(&form(&[("intent", "delete all")]), now)
        .expect("delete all again");
    assert!(app.tasks().expect("read").is_empty());
}

#[test]
fn page_derives_view_and_theme_per_request() {
    let dir = tempdir().expect("tempdir");
    let app = open_app(&dir);
    let now = Utc::now();

    app.submit(&form(&[("intent", "create task"), ("description", "buy milk")]), now)
        .expect("create");

    let page = app
        .page(Some("active"), Some("theme=dark"))
        .expect("page context");
    assert_eq!(page.view, View::Active);
    assert_eq!(page.theme, Theme::Dark);
    assert_eq!(page.tasks.len(), 1);

    let fallback = app.page(Some("nonsense"), None).expect("page context");
    assert_eq!(fallback.view, View::All);
    assert_eq!(fallback.theme, Theme::System);
}
