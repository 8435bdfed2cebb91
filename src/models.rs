//! Domain records that get serialized into the key-value store and passed
//! throughout the TUI. They are plain data holders; filtering lives in
//! `store.rs` and presentation in `ui/`.
//!
//! Field names serialize in camelCase so a stored snapshot stays readable by
//! the browser edition of the archive that shares the same two keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access tier of a child profile. Only `Public` profiles are listed on the
/// home screen; the other two are visible to the admin list only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    LinkOnly,
    Public,
}

impl Visibility {
    /// Order used by the visibility picker in the add-child form.
    pub const ALL: [Visibility; 3] = [Visibility::Private, Visibility::LinkOnly, Visibility::Public];

    /// Wire label, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::LinkOnly => "LINK_ONLY",
            Visibility::Public => "PUBLIC",
        }
    }

    /// Human description shown next to the picker.
    pub fn describe(self) -> &'static str {
        match self {
            Visibility::Private => "private (admin only)",
            Visibility::LinkOnly => "link only",
            Visibility::Public => "public (listed on the home page)",
        }
    }

    /// Step through the picker options, wrapping at either end.
    pub fn cycle(self, offset: isize) -> Visibility {
        let len = Self::ALL.len() as isize;
        let current = Self::ALL.iter().position(|v| *v == self).unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len);
        Self::ALL[next as usize]
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child's public or private profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    /// Stable identifier. Admin-created records use `child-<unix millis>`.
    pub id: String,
    pub name: String,
    pub nickname: String,
    /// Free-text age label such as "7세".
    pub age: String,
    /// Short quote shown on the home card.
    pub one_liner: String,
    /// Longer observation shown on the detail page.
    pub teacher_observation: String,
    pub visibility: Visibility,
    /// Either a web URL or an inline `data:` URI produced by image ingestion.
    pub profile_image: String,
    pub created_at: String,
}

impl Child {
    /// `Name (Nickname)` as used by the admin list and confirmation dialog.
    pub fn display_name(&self) -> String {
        if self.nickname.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.nickname)
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// One dated creative session owned by a single child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    /// Owning child's id. Only the admin add-artwork flow creates artworks, and
    /// it always scopes them to an existing child.
    pub child_id: String,
    /// Image references in the order they were accepted by the form. Older
    /// stored records may lack the field entirely.
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub date: String,
    pub topic: String,
    pub child_quote: String,
    pub teacher_record: String,
}

/// Validated input for a new child, before the store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewChild {
    pub name: String,
    pub nickname: String,
    pub age: String,
    pub one_liner: String,
    pub teacher_observation: String,
    pub visibility: Visibility,
    /// Empty when the admin did not pick a file; a placeholder is substituted.
    pub profile_image: String,
}

/// Validated input for a new artwork.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArtwork {
    pub date: String,
    pub topic: String,
    pub child_quote: String,
    pub teacher_record: String,
    pub image_urls: Vec<String>,
}
