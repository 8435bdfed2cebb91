//! Built-in demo content. The store falls back to these collections whenever a
//! persisted key is missing or unreadable.

use crate::models::{Artwork, Child, Visibility};

/// Messages interleaved through the detail timeline and the home page.
pub const PHILOSOPHY_MESSAGES: &[&str] = &[
    "이 그림은 결과물이 아니라 과정의 일부입니다.",
    "아이의 한 마디는 그림보다 더 큰 세계를 담고 있습니다.",
    "우리는 '잘 그린 그림'보다 '생각이 담긴 시간'을 기록합니다.",
    "비교되지 않는 아이의 고유한 시선을 존중합니다.",
];

#[allow(clippy::too_many_arguments)]
fn child(
    id: &str,
    name: &str,
    nickname: &str,
    age: &str,
    one_liner: &str,
    teacher_observation: &str,
    profile_image: &str,
    created_at: &str,
) -> Child {
    Child {
        id: id.to_string(),
        name: name.to_string(),
        nickname: nickname.to_string(),
        age: age.to_string(),
        one_liner: one_liner.to_string(),
        teacher_observation: teacher_observation.to_string(),
        visibility: Visibility::Public,
        profile_image: profile_image.to_string(),
        created_at: created_at.to_string(),
    }
}

pub fn initial_children() -> Vec<Child> {
    vec![
        child(
            "child-1",
            "김서윤",
            "별사탕",
            "7세",
            "“이 그림은 혼자 놀이터에 있었던 날이에요.”",
            "서윤이는 사물을 그리기보다 기억 속의 감정에서 그림을 출발하는 편입니다.",
            "https://picsum.photos/seed/child1/600/800",
            "2024-01-01",
        ),
        child(
            "child-2",
            "이준우",
            "우주여행자",
            "6세",
            "“하늘이 무거워서 까맣게 칠해봤어요.”",
            "색채의 무게감을 스스로 조절하며 자신의 심상을 표현하는 능력이 탁월합니다.",
            "https://picsum.photos/seed/child2/600/800",
            "2024-01-02",
        ),
        child(
            "child-3",
            "박지아",
            "풀잎",
            "8세",
            "“비오는 날의 냄새를 그리고 싶었어요.”",
            "시각적 형태 너머의 감각을 화폭에 담아내려는 시도가 돋보이는 아이입니다.",
            "https://picsum.photos/seed/child3/600/800",
            "2024-01-03",
        ),
    ]
}

pub fn initial_artworks() -> Vec<Artwork> {
    vec![
        Artwork {
            id: "art-1".to_string(),
            child_id: "child-1".to_string(),
            image_urls: vec![
                "https://picsum.photos/seed/art1/1200/800".to_string(),
                "https://picsum.photos/seed/art1-2/1200/800".to_string(),
            ],
            date: "2024.03.15".to_string(),
            topic: "기억의 조각".to_string(),
            child_quote: "“놀이터 미끄럼틀 밑에 개미가 많았는데, 걔네들도 집이 있을까요?”"
                .to_string(),
            teacher_record: "관찰력이 세밀하며 일상의 작은 존재에 대한 공감이 깊습니다.".to_string(),
        },
        Artwork {
            id: "art-2".to_string(),
            child_id: "child-2".to_string(),
            image_urls: vec!["https://picsum.photos/seed/art2/1200/800".to_string()],
            date: "2024.04.10".to_string(),
            topic: "밤의 공기".to_string(),
            child_quote: "“하늘이 무거워서 까맣게 했어요. 별들도 졸려 보여요.”".to_string(),
            teacher_record:
                "학교 이야기를 나눈 뒤 색 선택이 대담해졌으며, 감정의 깊이가 색면으로 나타납니다."
                    .to_string(),
        },
    ]
}

/// Placeholder portrait used when the admin saves a child without a photo.
pub fn placeholder_profile_image(seed: i64) -> String {
    format!("https://picsum.photos/seed/{seed}/600/800")
}

/// Placeholder artwork image used when the admin saves a record without files.
pub fn placeholder_artwork_image(seed: i64) -> String {
    format!("https://picsum.photos/seed/{seed}/1200/800")
}

/// Philosophy message interjected after the artwork at `index` on the detail
/// timeline, if any. One appears after every second entry except the last.
pub fn timeline_interjection(index: usize, total: usize) -> Option<&'static str> {
    if (index + 1) % 2 == 0 && index + 1 != total {
        Some(PHILOSOPHY_MESSAGES[(index + 1) % PHILOSOPHY_MESSAGES.len()])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_artworks_reference_seed_children() {
        let children = initial_children();
        for art in initial_artworks() {
            assert!(children.iter().any(|c| c.id == art.child_id));
        }
    }

    #[test]
    fn interjection_appears_after_every_second_entry_but_not_the_last() {
        assert_eq!(timeline_interjection(0, 5), None);
        assert_eq!(timeline_interjection(1, 5), Some(PHILOSOPHY_MESSAGES[2]));
        assert_eq!(timeline_interjection(3, 5), Some(PHILOSOPHY_MESSAGES[0]));
        assert_eq!(timeline_interjection(1, 2), None);
    }
}
