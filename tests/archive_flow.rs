use camille_archive::store::{ARTWORKS_KEY, CHILDREN_KEY};
use camille_archive::{
    KeyValueStore, NewArtwork, NewChild, SqliteStore, Store, Visibility,
};
use chrono::{TimeZone, Utc};

fn new_child(name: &str, visibility: Visibility) -> NewChild {
    NewChild {
        name: name.into(),
        nickname: format!("{name} nick"),
        age: "6".into(),
        one_liner: "I like clouds".into(),
        teacher_observation: "Looks up a lot".into(),
        visibility,
        profile_image: String::new(),
    }
}

#[test]
fn records_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("archive.sqlite");
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

    let child_id = {
        let mut store = Store::load(Box::new(SqliteStore::open(&db_path).unwrap()));
        assert_eq!(store.children().len(), 3);

        let next = store
            .snapshot()
            .with_child(new_child("Hana", Visibility::LinkOnly), now);
        store.apply(next);
        let child_id = store.children()[3].id.clone();

        let next = store.snapshot().with_artwork(
            &child_id,
            NewArtwork {
                date: "2024-03-01".into(),
                topic: "Clouds".into(),
                child_quote: "They are sheep".into(),
                teacher_record: "Metaphor".into(),
                image_urls: vec!["data:image/png;base64,AAAA".into()],
            },
            now,
        );
        store.apply(next);
        child_id
    };

    let store = Store::load(Box::new(SqliteStore::open(&db_path).unwrap()));
    assert_eq!(store.children().len(), 4);
    assert_eq!(store.child(&child_id).map(|c| c.visibility), Some(Visibility::LinkOnly));
    assert!(store.public_children().iter().all(|c| c.id != child_id));

    let artworks = store.artworks_for(&child_id);
    assert_eq!(artworks.len(), 1);
    assert_eq!(artworks[0].image_urls, vec!["data:image/png;base64,AAAA"]);
}

#[test]
fn deleting_a_child_rewrites_both_keys() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("archive.sqlite");

    let mut store = Store::load(Box::new(SqliteStore::open(&db_path).unwrap()));
    let next = store.snapshot().without_child("child-1");
    store.apply(next);

    let raw = SqliteStore::open(&db_path).unwrap();
    let children = raw.get(CHILDREN_KEY).unwrap().unwrap();
    let artworks = raw.get(ARTWORKS_KEY).unwrap().unwrap();
    assert!(!children.contains("\"child-1\""));
    assert!(!artworks.contains("\"child-1\""));
    assert!(artworks.contains("\"child-2\""));
}

#[test]
fn corrupt_half_is_reseeded_without_touching_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("archive.sqlite");

    let raw = SqliteStore::open(&db_path).unwrap();
    raw.set(CHILDREN_KEY, "[]").unwrap();
    raw.set(ARTWORKS_KEY, "{not json").unwrap();

    let store = Store::load(Box::new(raw));
    assert!(store.children().is_empty());
    assert_eq!(store.artworks().len(), 2);
}
