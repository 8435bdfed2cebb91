use anyhow::{anyhow, Result};
use chrono::Local;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Child, NewArtwork, NewChild, Visibility};

/// Style a `Label: value` line, greying out empty required fields and
/// highlighting the focused one.
fn field_line(label: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

fn required(value: &str, label: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(anyhow!("{label} is required."))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Password prompt shown before the admin screen.
#[derive(Default, Clone)]
pub(crate) struct LoginForm {
    pub(crate) password: String,
}

impl LoginForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.password.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.password.pop();
    }

    /// Masked password line.
    pub(crate) fn build_line(&self) -> Line<'static> {
        let masked = "*".repeat(self.password.chars().count());
        field_line("Password", &masked, true, "")
    }

    pub(crate) fn value_len(&self) -> usize {
        self.password.chars().count()
    }
}

/// Fields of the add-child form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum ChildField {
    #[default]
    Name,
    Nickname,
    Age,
    Visibility,
    OneLiner,
    Observation,
    ProfileImage,
}

impl ChildField {
    pub(crate) const ORDER: [ChildField; 7] = [
        ChildField::Name,
        ChildField::Nickname,
        ChildField::Age,
        ChildField::Visibility,
        ChildField::OneLiner,
        ChildField::Observation,
        ChildField::ProfileImage,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ChildField::Name => "Name",
            ChildField::Nickname => "Nickname",
            ChildField::Age => "Age",
            ChildField::Visibility => "Visibility",
            ChildField::OneLiner => "One-liner",
            ChildField::Observation => "Observation",
            ChildField::ProfileImage => "Photo file",
        }
    }
}

/// State of the add-child form. `ticket` ties background image reads to this
/// particular form instance.
#[derive(Clone)]
pub(crate) struct ChildForm {
    pub(crate) name: String,
    pub(crate) nickname: String,
    pub(crate) age: String,
    pub(crate) visibility: Visibility,
    pub(crate) one_liner: String,
    pub(crate) observation: String,
    pub(crate) profile_path: String,
    pub(crate) profile_image: String,
    pub(crate) ticket: u64,
    pub(crate) active: ChildField,
    pub(crate) error: Option<String>,
}

impl ChildForm {
    pub(crate) fn new(ticket: u64) -> Self {
        Self {
            name: String::new(),
            nickname: String::new(),
            age: String::new(),
            visibility: Visibility::Private,
            one_liner: String::new(),
            observation: String::new(),
            profile_path: String::new(),
            profile_image: String::new(),
            ticket,
            active: ChildField::Name,
            error: None,
        }
    }

    pub(crate) fn move_focus(&mut self, offset: isize) {
        let len = ChildField::ORDER.len() as isize;
        let current = ChildField::ORDER
            .iter()
            .position(|f| *f == self.active)
            .unwrap_or(0) as isize;
        self.active = ChildField::ORDER[(current + offset).rem_euclid(len) as usize];
    }

    fn text_mut(&mut self, field: ChildField) -> Option<&mut String> {
        match field {
            ChildField::Name => Some(&mut self.name),
            ChildField::Nickname => Some(&mut self.nickname),
            ChildField::Age => Some(&mut self.age),
            ChildField::OneLiner => Some(&mut self.one_liner),
            ChildField::Observation => Some(&mut self.observation),
            ChildField::ProfileImage => Some(&mut self.profile_path),
            ChildField::Visibility => None,
        }
    }

    fn text(&self, field: ChildField) -> &str {
        match field {
            ChildField::Name => &self.name,
            ChildField::Nickname => &self.nickname,
            ChildField::Age => &self.age,
            ChildField::OneLiner => &self.one_liner,
            ChildField::Observation => &self.observation,
            ChildField::ProfileImage => &self.profile_path,
            ChildField::Visibility => self.visibility.as_str(),
        }
    }

    /// Type into the focused field. Space cycles the visibility picker.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == ChildField::Visibility {
            if ch == ' ' {
                self.visibility = self.visibility.cycle(1);
                return true;
            }
            return false;
        }
        match self.text_mut(self.active) {
            Some(value) => {
                value.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.text_mut(self.active) {
            value.pop();
        }
    }

    pub(crate) fn cycle_visibility(&mut self, offset: isize) {
        self.visibility = self.visibility.cycle(offset);
    }

    /// Hand over the typed photo path so a read can be started, clearing the
    /// input.
    pub(crate) fn take_profile_path(&mut self) -> Option<String> {
        let path = self.profile_path.trim().to_string();
        self.profile_path.clear();
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<NewChild> {
        Ok(NewChild {
            name: required(&self.name, "Name")?,
            nickname: required(&self.nickname, "Nickname")?,
            age: required(&self.age, "Age")?,
            one_liner: required(&self.one_liner, "One-liner")?,
            teacher_observation: required(&self.observation, "Observation")?,
            visibility: self.visibility,
            profile_image: self.profile_image.clone(),
        })
    }

    pub(crate) fn build_line(&self, field: ChildField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            ChildField::Visibility => Line::from(vec![
                Span::raw(format!("{}: ", field.label())),
                Span::styled(
                    format!("< {} >", self.visibility.as_str()),
                    if is_active {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().add_modifier(Modifier::BOLD)
                    },
                ),
                Span::styled(
                    format!("  {}", self.visibility.describe()),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            ChildField::ProfileImage => {
                field_line(field.label(), &self.profile_path, is_active, "<path, Enter to load>")
            }
            _ => field_line(field.label(), self.text(field), is_active, "<required>"),
        }
    }

    pub(crate) fn value_len(&self, field: ChildField) -> usize {
        self.text(field).chars().count()
    }
}

/// Fields of the add-artwork form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum ArtworkField {
    #[default]
    Date,
    Topic,
    ChildQuote,
    TeacherRecord,
    Images,
}

impl ArtworkField {
    pub(crate) const ORDER: [ArtworkField; 5] = [
        ArtworkField::Date,
        ArtworkField::Topic,
        ArtworkField::ChildQuote,
        ArtworkField::TeacherRecord,
        ArtworkField::Images,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ArtworkField::Date => "Date",
            ArtworkField::Topic => "Topic",
            ArtworkField::ChildQuote => "Child's words",
            ArtworkField::TeacherRecord => "Teacher's record",
            ArtworkField::Images => "Image file",
        }
    }
}

#[derive(Clone)]
pub(crate) struct ArtworkForm {
    pub(crate) date: String,
    pub(crate) topic: String,
    pub(crate) child_quote: String,
    pub(crate) teacher_record: String,
    pub(crate) image_path: String,
    /// Accepted images, in the order their reads completed.
    pub(crate) image_urls: Vec<String>,
    pub(crate) ticket: u64,
    pub(crate) active: ArtworkField,
    pub(crate) error: Option<String>,
}

impl ArtworkForm {
    /// Fresh form with the date preset to today.
    pub(crate) fn new(ticket: u64) -> Self {
        Self::with_date(ticket, Local::now().format("%Y-%m-%d").to_string())
    }

    pub(crate) fn with_date(ticket: u64, date: String) -> Self {
        Self {
            date,
            topic: String::new(),
            child_quote: String::new(),
            teacher_record: String::new(),
            image_path: String::new(),
            image_urls: Vec::new(),
            ticket,
            active: ArtworkField::Topic,
            error: None,
        }
    }

    pub(crate) fn move_focus(&mut self, offset: isize) {
        let len = ArtworkField::ORDER.len() as isize;
        let current = ArtworkField::ORDER
            .iter()
            .position(|f| *f == self.active)
            .unwrap_or(0) as isize;
        self.active = ArtworkField::ORDER[(current + offset).rem_euclid(len) as usize];
    }

    fn text_mut(&mut self, field: ArtworkField) -> &mut String {
        match field {
            ArtworkField::Date => &mut self.date,
            ArtworkField::Topic => &mut self.topic,
            ArtworkField::ChildQuote => &mut self.child_quote,
            ArtworkField::TeacherRecord => &mut self.teacher_record,
            ArtworkField::Images => &mut self.image_path,
        }
    }

    fn text(&self, field: ArtworkField) -> &str {
        match field {
            ArtworkField::Date => &self.date,
            ArtworkField::Topic => &self.topic,
            ArtworkField::ChildQuote => &self.child_quote,
            ArtworkField::TeacherRecord => &self.teacher_record,
            ArtworkField::Images => &self.image_path,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.text_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.text_mut(self.active).pop();
    }

    pub(crate) fn take_image_path(&mut self) -> Option<String> {
        let path = self.image_path.trim().to_string();
        self.image_path.clear();
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }

    pub(crate) fn accept_image(&mut self, data_uri: String) {
        self.image_urls.push(data_uri);
    }

    /// Drop the most recently accepted image.
    pub(crate) fn remove_last_image(&mut self) -> bool {
        self.image_urls.pop().is_some()
    }

    pub(crate) fn parse_inputs(&self) -> Result<NewArtwork> {
        Ok(NewArtwork {
            date: required(&self.date, "Date")?,
            topic: required(&self.topic, "Topic")?,
            child_quote: required(&self.child_quote, "Child's words")?,
            teacher_record: required(&self.teacher_record, "Teacher's record")?,
            image_urls: self.image_urls.clone(),
        })
    }

    pub(crate) fn build_line(&self, field: ArtworkField) -> Line<'static> {
        let placeholder = if field == ArtworkField::Images {
            "<path, Enter to add>"
        } else {
            "<required>"
        };
        field_line(field.label(), self.text(field), self.active == field, placeholder)
    }

    pub(crate) fn value_len(&self, field: ArtworkField) -> usize {
        self.text(field).chars().count()
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmChildDelete {
    pub(crate) id: String,
    pub(crate) display_name: String,
    pub(crate) artwork_count: usize,
}

impl ConfirmChildDelete {
    pub(crate) fn new(child: &Child, artwork_count: usize) -> Self {
        Self {
            id: child.id.clone(),
            display_name: child.display_name(),
            artwork_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_child_form() -> ChildForm {
        let mut form = ChildForm::new(1);
        form.name = " Mina ".into();
        form.nickname = "Moon".into();
        form.age = "5".into();
        form.one_liner = "hi".into();
        form.observation = "calm".into();
        form
    }

    #[test]
    fn child_form_requires_every_text_field() {
        let mut form = filled_child_form();
        form.age.clear();
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "Age is required.");
    }

    #[test]
    fn child_form_trims_and_defaults_to_private() {
        let parsed = filled_child_form().parse_inputs().unwrap();
        assert_eq!(parsed.name, "Mina");
        assert_eq!(parsed.visibility, Visibility::Private);
        assert!(parsed.profile_image.is_empty());
    }

    #[test]
    fn space_cycles_visibility_instead_of_typing() {
        let mut form = ChildForm::new(1);
        form.active = ChildField::Visibility;
        assert!(form.push_char(' '));
        assert_eq!(form.visibility, Visibility::LinkOnly);
        assert!(!form.push_char('x'));
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = ChildForm::new(1);
        form.move_focus(-1);
        assert_eq!(form.active, ChildField::ProfileImage);
        form.move_focus(1);
        assert_eq!(form.active, ChildField::Name);
    }

    #[test]
    fn artwork_form_keeps_images_in_acceptance_order() {
        let mut form = ArtworkForm::with_date(3, "2024-06-01".into());
        form.topic = "Rain".into();
        form.child_quote = "wet".into();
        form.teacher_record = "bold".into();
        form.accept_image("data:b".into());
        form.accept_image("data:a".into());
        form.accept_image("data:c".into());
        assert!(form.remove_last_image());

        let parsed = form.parse_inputs().unwrap();
        assert_eq!(parsed.image_urls, vec!["data:b", "data:a"]);
        assert_eq!(parsed.date, "2024-06-01");
    }

    #[test]
    fn image_path_is_consumed_once() {
        let mut form = ArtworkForm::with_date(3, "d".into());
        form.image_path = "  /tmp/x.png ".into();
        assert_eq!(form.take_image_path().as_deref(), Some("/tmp/x.png"));
        assert_eq!(form.take_image_path(), None);
    }
}
