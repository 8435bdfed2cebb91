//! The authoritative in-memory snapshot and its persisted mirror.
//!
//! Every mutation is expressed as "build the next full [`Snapshot`], then
//! [`Store::replace`] it". Persistence is best effort: the in-memory copy is
//! always updated, and a failed write is only logged.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::db::KeyValueStore;
use crate::models::{Artwork, Child, NewArtwork, NewChild};
use crate::seed;

/// Key holding the JSON list of children.
pub const CHILDREN_KEY: &str = "camille_children";
/// Key holding the JSON list of artworks.
pub const ARTWORKS_KEY: &str = "camille_artworks";

/// The pair of collections that is always replaced as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub children: Vec<Child>,
    pub artworks: Vec<Artwork>,
}

impl Snapshot {
    pub fn new(children: Vec<Child>, artworks: Vec<Artwork>) -> Self {
        Self { children, artworks }
    }

    /// Built-in demo content.
    #[cfg(test)]
    pub(crate) fn seed() -> Self {
        Self::new(seed::initial_children(), seed::initial_artworks())
    }

    /// Append a child created at `now`. A missing profile image is replaced
    /// with a placeholder portrait.
    pub fn with_child(&self, new_child: NewChild, now: DateTime<Utc>) -> Snapshot {
        let stamp = self.unique_stamp(now.timestamp_millis(), |stamp| {
            let id = format!("child-{stamp}");
            self.children.iter().any(|c| c.id == id)
        });

        let profile_image = if new_child.profile_image.trim().is_empty() {
            seed::placeholder_profile_image(stamp)
        } else {
            new_child.profile_image
        };

        let child = Child {
            id: format!("child-{stamp}"),
            name: new_child.name,
            nickname: new_child.nickname,
            age: new_child.age,
            one_liner: new_child.one_liner,
            teacher_observation: new_child.teacher_observation,
            visibility: new_child.visibility,
            profile_image,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut children = self.children.clone();
        children.push(child);
        Snapshot::new(children, self.artworks.clone())
    }

    /// Append an artwork owned by `child_id`. An empty image list becomes a
    /// single placeholder image.
    pub fn with_artwork(&self, child_id: &str, new_art: NewArtwork, now: DateTime<Utc>) -> Snapshot {
        let stamp = self.unique_stamp(now.timestamp_millis(), |stamp| {
            let id = format!("art-{stamp}");
            self.artworks.iter().any(|a| a.id == id)
        });

        let image_urls = if new_art.image_urls.is_empty() {
            vec![seed::placeholder_artwork_image(stamp)]
        } else {
            new_art.image_urls
        };

        let artwork = Artwork {
            id: format!("art-{stamp}"),
            child_id: child_id.to_string(),
            image_urls,
            date: new_art.date,
            topic: new_art.topic,
            child_quote: new_art.child_quote,
            teacher_record: new_art.teacher_record,
        };

        let mut artworks = self.artworks.clone();
        artworks.push(artwork);
        Snapshot::new(self.children.clone(), artworks)
    }

    /// Drop a child and, by cascade, every artwork it owns.
    pub fn without_child(&self, child_id: &str) -> Snapshot {
        Snapshot::new(
            self.children
                .iter()
                .filter(|c| c.id != child_id)
                .cloned()
                .collect(),
            self.artworks
                .iter()
                .filter(|a| a.child_id != child_id)
                .cloned()
                .collect(),
        )
    }

    // Millisecond ids collide when two records are created within the same
    // millisecond; bump until free.
    fn unique_stamp(&self, mut stamp: i64, taken: impl Fn(i64) -> bool) -> i64 {
        while taken(stamp) {
            stamp += 1;
        }
        stamp
    }
}

/// Owns the snapshot and the backend it is mirrored to.
pub struct Store {
    backend: Box<dyn KeyValueStore>,
    snapshot: Snapshot,
}

impl Store {
    /// Read both keys, seeding whichever half is missing, unreadable or
    /// corrupt. Never fails.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let children = load_half(backend.as_ref(), CHILDREN_KEY, seed::initial_children);
        let artworks = load_half(backend.as_ref(), ARTWORKS_KEY, seed::initial_artworks);
        info!(
            children = children.len(),
            artworks = artworks.len(),
            "archive loaded"
        );
        Self {
            backend,
            snapshot: Snapshot::new(children, artworks),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn children(&self) -> &[Child] {
        &self.snapshot.children
    }

    pub fn artworks(&self) -> &[Artwork] {
        &self.snapshot.artworks
    }

    /// Children listed on the home page, in stored order.
    pub fn public_children(&self) -> Vec<&Child> {
        self.snapshot
            .children
            .iter()
            .filter(|c| c.is_public())
            .collect()
    }

    pub fn child(&self, id: &str) -> Option<&Child> {
        self.snapshot.children.iter().find(|c| c.id == id)
    }

    /// Artworks owned by `child_id`, in stored order.
    pub fn artworks_for(&self, child_id: &str) -> Vec<&Artwork> {
        self.snapshot
            .artworks
            .iter()
            .filter(|a| a.child_id == child_id)
            .collect()
    }

    /// Swap in a new snapshot, then try to persist it. Write failures are
    /// logged; the in-memory state keeps the change either way.
    pub fn replace(&mut self, children: Vec<Child>, artworks: Vec<Artwork>) {
        self.snapshot = Snapshot::new(children, artworks);
        self.persist();
    }

    pub fn apply(&mut self, next: Snapshot) {
        self.replace(next.children, next.artworks);
    }

    fn persist(&self) {
        let children = match serde_json::to_string(&self.snapshot.children) {
            Ok(json) => json,
            Err(err) => {
                error!(%err, "failed to serialize children");
                return;
            }
        };
        let artworks = match serde_json::to_string(&self.snapshot.artworks) {
            Ok(json) => json,
            Err(err) => {
                error!(%err, "failed to serialize artworks");
                return;
            }
        };

        match self
            .backend
            .set_all(&[(CHILDREN_KEY, &children), (ARTWORKS_KEY, &artworks)])
        {
            Ok(()) => debug!("snapshot persisted"),
            Err(err) => error!(%err, "failed to persist snapshot; keeping in-memory copy"),
        }
    }
}

fn load_half<T>(backend: &dyn KeyValueStore, key: &str, seed: fn() -> Vec<T>) -> Vec<T>
where
    T: Serialize + DeserializeOwned,
{
    match backend.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(records) => return records,
            Err(err) => warn!(key, %err, "stored data is corrupt, falling back to seed"),
        },
        Ok(None) => info!(key, "no stored data, seeding"),
        Err(err) => warn!(key, %err, "storage read failed, falling back to seed"),
    }

    let records = seed();
    match serde_json::to_string(&records) {
        Ok(json) => {
            if let Err(err) = backend.set(key, &json) {
                warn!(key, %err, "failed to persist seed data");
            }
        }
        Err(err) => error!(key, %err, "failed to serialize seed data"),
    }
    records
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Visibility;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn new_child(name: &str, visibility: Visibility) -> NewChild {
        NewChild {
            name: name.to_string(),
            nickname: format!("{name}-nick"),
            age: "7세".to_string(),
            one_liner: "hello".to_string(),
            teacher_observation: "observes".to_string(),
            visibility,
            profile_image: String::new(),
        }
    }

    fn new_art(topic: &str, images: &[&str]) -> NewArtwork {
        NewArtwork {
            date: "2024-05-01".to_string(),
            topic: topic.to_string(),
            child_quote: "quote".to_string(),
            teacher_record: "record".to_string(),
            image_urls: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn first_load_seeds_and_populates_both_keys() {
        let backend = MemoryStore::new();
        let store = Store::load(Box::new(backend.clone()));

        assert_eq!(store.children().len(), 3);
        assert_eq!(store.artworks().len(), 2);
        assert_eq!(store.snapshot(), &Snapshot::seed());
        assert!(backend.peek(CHILDREN_KEY).is_some());
        assert!(backend.peek(ARTWORKS_KEY).is_some());
    }

    #[test]
    fn unreadable_storage_falls_back_to_seed_without_error() {
        let backend = MemoryStore::new();
        backend.set_fail_reads(true);
        backend.set_fail_writes(true);

        let store = Store::load(Box::new(backend.clone()));

        assert_eq!(store.snapshot(), &Snapshot::seed());
        assert!(backend.is_empty());
    }

    #[test]
    fn corrupt_half_is_reseeded_independently() {
        let backend = MemoryStore::new();
        let custom = vec![Artwork {
            id: "art-x".into(),
            child_id: "child-2".into(),
            image_urls: vec!["u".into()],
            date: "d".into(),
            topic: "t".into(),
            child_quote: "q".into(),
            teacher_record: "r".into(),
        }];
        backend.set(CHILDREN_KEY, "{not json").unwrap();
        backend
            .set(ARTWORKS_KEY, &serde_json::to_string(&custom).unwrap())
            .unwrap();

        let store = Store::load(Box::new(backend.clone()));

        assert_eq!(store.children(), seed::initial_children().as_slice());
        assert_eq!(store.artworks(), custom.as_slice());
        let rewritten: Vec<Child> =
            serde_json::from_str(&backend.peek(CHILDREN_KEY).unwrap()).unwrap();
        assert_eq!(rewritten, seed::initial_children());
    }

    #[test]
    fn reload_reproduces_the_persisted_snapshot() {
        let backend = MemoryStore::new();
        let mut store = Store::load(Box::new(backend.clone()));
        let next = store
            .snapshot()
            .with_child(new_child("Mina", Visibility::LinkOnly), at(1_700_000_000_000));
        store.apply(next);

        let reloaded = Store::load(Box::new(backend));
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn replace_is_idempotent_on_persisted_state() {
        let backend = MemoryStore::new();
        let mut store = Store::load(Box::new(backend.clone()));
        let next = store.snapshot().without_child("child-1");

        store.apply(next.clone());
        let once = (backend.peek(CHILDREN_KEY), backend.peek(ARTWORKS_KEY));
        store.apply(next);
        let twice = (backend.peek(CHILDREN_KEY), backend.peek(ARTWORKS_KEY));

        assert_eq!(once, twice);
    }

    #[test]
    fn write_failure_keeps_the_in_memory_change() {
        let backend = MemoryStore::new();
        let mut store = Store::load(Box::new(backend.clone()));
        let before = backend.peek(CHILDREN_KEY);
        backend.set_fail_writes(true);

        let next = store.snapshot().without_child("child-2");
        store.apply(next);

        assert_eq!(store.children().len(), 2);
        assert_eq!(backend.peek(CHILDREN_KEY), before);
    }

    #[test]
    fn deleting_a_child_cascades_only_to_its_artworks() {
        let base = Snapshot::seed()
            .with_artwork("child-1", new_art("extra", &["a"]), at(1))
            .with_artwork("child-3", new_art("other", &["b"]), at(2));

        let next = base.without_child("child-1");

        assert!(next.children.iter().all(|c| c.id != "child-1"));
        assert!(next.artworks.iter().all(|a| a.child_id != "child-1"));
        let survivors: Vec<_> = base
            .artworks
            .iter()
            .filter(|a| a.child_id != "child-1")
            .cloned()
            .collect();
        assert_eq!(next.artworks, survivors);
        assert_eq!(next.artworks.len(), 2);
    }

    #[test]
    fn public_listing_tracks_visibility_in_stored_order() {
        let mut store = Store::load(Box::new(MemoryStore::new()));
        let next = store
            .snapshot()
            .with_child(new_child("Hidden", Visibility::Private), at(10))
            .with_child(new_child("Shown", Visibility::Public), at(11))
            .with_child(new_child("Linked", Visibility::LinkOnly), at(12));
        store.apply(next);

        let names: Vec<&str> = store
            .public_children()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["김서윤", "이준우", "박지아", "Shown"]);
    }

    #[test]
    fn artwork_without_images_gets_a_single_placeholder() {
        let next = Snapshot::seed().with_artwork("child-2", new_art("bare", &[]), at(42));
        let art = next.artworks.last().unwrap();
        assert_eq!(art.image_urls, vec![seed::placeholder_artwork_image(42)]);
        assert_eq!(art.id, "art-42");
        assert_eq!(art.child_id, "child-2");
    }

    #[test]
    fn child_ids_stay_unique_within_one_millisecond() {
        let now = at(5);
        let next = Snapshot::default()
            .with_child(new_child("A", Visibility::Public), now)
            .with_child(new_child("B", Visibility::Public), now);
        assert_eq!(next.children[0].id, "child-5");
        assert_eq!(next.children[1].id, "child-6");
        assert_eq!(next.children[0].profile_image, seed::placeholder_profile_image(5));
        assert_eq!(next.children[0].created_at, "1970-01-01T00:00:00.005Z");
    }

    #[test]
    fn lookups_resolve_children_and_their_artworks() {
        let store = Store::load(Box::new(MemoryStore::new()));
        assert_eq!(store.child("child-2").map(|c| c.nickname.as_str()), Some("우주여행자"));
        assert!(store.child("child-404").is_none());
        assert_eq!(store.artworks_for("child-1").len(), 1);
        assert!(store.artworks_for("child-3").is_empty());
    }
}
