use std::mem;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Utc;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, info, warn};

use crate::auth::AdminGate;
use crate::images::{describe_image_ref, is_web_ref, ImageIngestor, ImageSlot, Ingested};
use crate::models::{Artwork, Child};
use crate::router::{Page, Router};
use crate::seed::{timeline_interjection, PHILOSOPHY_MESSAGES};
use crate::store::Store;

use super::forms::{
    ArtworkField, ArtworkForm, ChildField, ChildForm, ConfirmChildDelete, LoginForm,
};
use super::helpers::{centered_rect, key_hint, surface_error, truncate_chars, window_start};
use super::screens::{CardGrid, ListCursor};

/// Home page cards per row.
const GRID: CardGrid = CardGrid { columns: 3 };
const HEADER_HEIGHT: u16 = 2;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const CARD_HEIGHT: u16 = 7;
const BRAND: &str = "Camille Mignon";

/// Modal state layered over the current page. `Normal` means no modal.
enum Mode {
    Normal,
    Login(LoginForm),
    /// Blocking alert after a wrong password; dismissing it returns to the
    /// prompt.
    PasswordAlert {
        form: LoginForm,
        message: String,
    },
    AddingChild(ChildForm),
    AddingArtwork {
        child_id: String,
        form: ArtworkForm,
    },
    ConfirmChildDelete(ConfirmChildDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: Store,
    router: Router,
    gate: AdminGate,
    ingestor: ImageIngestor,
    home: ListCursor,
    timeline: ListCursor,
    admin: ListCursor,
    mode: Mode,
    status: Option<StatusMessage>,
    next_ticket: u64,
}

impl App {
    pub fn new(store: Store, gate: AdminGate) -> Self {
        Self {
            store,
            router: Router::new(),
            gate,
            ingestor: ImageIngestor::new(),
            home: ListCursor::default(),
            timeline: ListCursor::default(),
            admin: ListCursor::default(),
            mode: Mode::Normal,
            status: None,
            next_ticket: 1,
        }
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Login(form) => self.handle_login(code, form),
            Mode::PasswordAlert { form, message } => {
                self.handle_password_alert(code, form, message)
            }
            Mode::AddingChild(form) => self.handle_add_child(code, form),
            Mode::AddingArtwork { child_id, form } => {
                self.handle_add_artwork(code, child_id, form)
            }
            Mode::ConfirmChildDelete(confirm) => self.handle_confirm_child_delete(code, confirm),
        };

        exit
    }

    /// Accept any image reads that finished since the last tick.
    pub fn tick(&mut self) {
        for done in self.ingestor.poll() {
            self.accept_ingested(done);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match self.router.page() {
            Page::Home => {
                let len = self.store.public_children().len();
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Left => GRID.move_horizontal(&mut self.home, -1, len),
                    KeyCode::Right => GRID.move_horizontal(&mut self.home, 1, len),
                    KeyCode::Up => GRID.move_vertical(&mut self.home, -1, len),
                    KeyCode::Down => GRID.move_vertical(&mut self.home, 1, len),
                    KeyCode::Enter => {
                        let selected = self
                            .home
                            .current(len)
                            .and_then(|index| self.store.public_children().get(index).copied())
                            .map(|child| child.id.clone());
                        match selected {
                            Some(id) => {
                                self.clear_status();
                                self.open_child(id);
                            }
                            None => self.set_status("No child selected.", StatusKind::Error),
                        }
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => return self.open_admin(),
                    _ => {}
                }
                Mode::Normal
            }
            Page::ChildDetail => {
                let len = self
                    .router
                    .selected_child()
                    .map(|id| self.store.artworks_for(id).len())
                    .unwrap_or(0);
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => {
                        self.clear_status();
                        self.go_home();
                    }
                    KeyCode::Up => self.timeline.move_selection(-1, len),
                    KeyCode::Down => self.timeline.move_selection(1, len),
                    KeyCode::PageUp => self.timeline.move_selection(-5, len),
                    KeyCode::PageDown => self.timeline.move_selection(5, len),
                    KeyCode::Home => self.timeline.select_first(),
                    KeyCode::End => self.timeline.select_last(len),
                    KeyCode::Char('o') | KeyCode::Char('O') => self.open_profile_image(),
                    KeyCode::Enter => self.open_artwork_image(),
                    KeyCode::Char('a') | KeyCode::Char('A') => return self.open_admin(),
                    _ => {}
                }
                Mode::Normal
            }
            Page::Admin => {
                if !self.gate.is_unlocked() {
                    return Mode::Login(LoginForm::default());
                }
                let len = self.store.children().len();
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc | KeyCode::Char('h') => {
                        self.clear_status();
                        self.go_home();
                    }
                    KeyCode::Up => self.admin.move_selection(-1, len),
                    KeyCode::Down => self.admin.move_selection(1, len),
                    KeyCode::PageUp => self.admin.move_selection(-5, len),
                    KeyCode::PageDown => self.admin.move_selection(5, len),
                    KeyCode::Home => self.admin.select_first(),
                    KeyCode::End => self.admin.select_last(len),
                    KeyCode::Char('+') => {
                        self.clear_status();
                        let ticket = self.take_ticket();
                        return Mode::AddingChild(ChildForm::new(ticket));
                    }
                    KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                        if let Some(child) = self.current_admin_child() {
                            let child_id = child.id.clone();
                            self.clear_status();
                            let ticket = self.take_ticket();
                            return Mode::AddingArtwork {
                                child_id,
                                form: ArtworkForm::new(ticket),
                            };
                        }
                        self.set_status("No child selected to record for.", StatusKind::Error);
                    }
                    KeyCode::Char('-') | KeyCode::Delete => {
                        if let Some(child) = self.current_admin_child() {
                            let count = self.store.artworks_for(&child.id).len();
                            let confirm = ConfirmChildDelete::new(child, count);
                            self.clear_status();
                            return Mode::ConfirmChildDelete(confirm);
                        }
                        self.set_status("No child selected to delete.", StatusKind::Error);
                    }
                    _ => {}
                }
                Mode::Normal
            }
        }
    }

    fn handle_login(&mut self, code: KeyCode, mut form: LoginForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.go_home();
                Mode::Normal
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::Login(form)
            }
            KeyCode::Enter => match self.gate.try_unlock(&form.password) {
                Ok(()) => {
                    self.admin.ensure_in_bounds(self.store.children().len());
                    self.set_status("Admin unlocked.", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => Mode::PasswordAlert {
                    form,
                    message: err.to_string(),
                },
            },
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Mode::Login(form)
            }
            _ => Mode::Login(form),
        }
    }

    fn handle_password_alert(&mut self, code: KeyCode, form: LoginForm, message: String) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Login(form),
            _ => Mode::PasswordAlert { form, message },
        }
    }

    fn handle_add_child(&mut self, code: KeyCode, mut form: ChildForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add child cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Left if form.active == ChildField::Visibility => form.cycle_visibility(-1),
            KeyCode::Right if form.active == ChildField::Visibility => form.cycle_visibility(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter if form.active == ChildField::ProfileImage => {
                match form.take_profile_path() {
                    Some(path) => self.request_image(form.ticket, ImageSlot::Profile, path),
                    None => match self.save_new_child(&form) {
                        Ok(()) => keep_open = false,
                        Err(err) => self.report_form_error(&mut form.error, &err),
                    },
                }
            }
            KeyCode::Enter => match self.save_new_child(&form) {
                Ok(()) => keep_open = false,
                Err(err) => self.report_form_error(&mut form.error, &err),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::AddingChild(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_add_artwork(&mut self, code: KeyCode, child_id: String, mut form: ArtworkForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add artwork cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Delete => {
                if form.remove_last_image() {
                    self.set_status("Removed the last image.", StatusKind::Info);
                }
            }
            KeyCode::Enter if form.active == ArtworkField::Images => {
                match form.take_image_path() {
                    Some(path) => self.request_image(form.ticket, ImageSlot::Artwork, path),
                    None => match self.save_new_artwork(&child_id, &form) {
                        Ok(()) => keep_open = false,
                        Err(err) => self.report_form_error(&mut form.error, &err),
                    },
                }
            }
            KeyCode::Enter => match self.save_new_artwork(&child_id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => self.report_form_error(&mut form.error, &err),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::AddingArtwork { child_id, form }
        } else {
            Mode::Normal
        }
    }

    fn handle_confirm_child_delete(&mut self, code: KeyCode, confirm: ConfirmChildDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let next = self.store.snapshot().without_child(&confirm.id);
                self.store.apply(next);
                self.admin.ensure_in_bounds(self.store.children().len());
                info!(child = %confirm.id, "child deleted");
                self.set_status(
                    format!(
                        "Deleted {} and {} artwork record(s).",
                        confirm.display_name, confirm.artwork_count
                    ),
                    StatusKind::Info,
                );
                Mode::Normal
            }
            _ => Mode::ConfirmChildDelete(confirm),
        }
    }

    fn save_new_child(&mut self, form: &ChildForm) -> Result<()> {
        self.ensure_no_pending_reads(form.ticket)?;
        ensure_path_loaded(&form.profile_path, ChildField::ProfileImage.label())?;
        let new_child = form.parse_inputs()?;
        let name = new_child.name.clone();

        let next = self.store.snapshot().with_child(new_child, Utc::now());
        self.store.apply(next);
        self.admin.select_last(self.store.children().len());

        info!(%name, "child added");
        self.set_status(format!("Saved {name}."), StatusKind::Info);
        Ok(())
    }

    fn save_new_artwork(&mut self, child_id: &str, form: &ArtworkForm) -> Result<()> {
        self.ensure_no_pending_reads(form.ticket)?;
        ensure_path_loaded(&form.image_path, ArtworkField::Images.label())?;
        let new_art = form.parse_inputs()?;
        let topic = new_art.topic.clone();

        let next = self.store.snapshot().with_artwork(child_id, new_art, Utc::now());
        self.store.apply(next);

        info!(child = child_id, %topic, "artwork added");
        self.set_status(format!("Recorded \"{topic}\"."), StatusKind::Info);
        Ok(())
    }

    fn ensure_no_pending_reads(&self, ticket: u64) -> Result<()> {
        match self.ingestor.pending(ticket) {
            0 => Ok(()),
            pending => Err(anyhow!(
                "Wait for {pending} image(s) to finish loading."
            )),
        }
    }

    fn report_form_error(&mut self, slot: &mut Option<String>, err: &anyhow::Error) {
        let message = surface_error(err);
        *slot = Some(message.clone());
        self.set_status(message, StatusKind::Error);
    }

    fn request_image(&mut self, ticket: u64, slot: ImageSlot, path: String) {
        self.set_status(format!("Loading {path}..."), StatusKind::Info);
        self.ingestor.request(ticket, slot, PathBuf::from(path));
    }

    fn accept_ingested(&mut self, done: Ingested) {
        let Ingested {
            ticket,
            slot,
            path,
            result,
        } = done;
        let path = path.display().to_string();

        let outcome = match &mut self.mode {
            Mode::AddingChild(form) if form.ticket == ticket && slot == ImageSlot::Profile => {
                Some(match result {
                    Ok(uri) => {
                        form.profile_image = uri;
                        (format!("Photo loaded from {path}."), StatusKind::Info)
                    }
                    Err(err) => (err.to_string(), StatusKind::Error),
                })
            }
            Mode::AddingArtwork { form, .. }
                if form.ticket == ticket && slot == ImageSlot::Artwork =>
            {
                Some(match result {
                    Ok(uri) => {
                        form.accept_image(uri);
                        (
                            format!("Added image {} from {path}.", form.image_urls.len()),
                            StatusKind::Info,
                        )
                    }
                    Err(err) => (err.to_string(), StatusKind::Error),
                })
            }
            _ => {
                debug!(ticket, %path, "dropping image read for a closed form");
                None
            }
        };

        if let Some((text, kind)) = outcome {
            if matches!(kind, StatusKind::Error) {
                warn!(%path, "image read failed: {text}");
            }
            self.set_status(text, kind);
        }
    }

    fn open_child(&mut self, id: String) {
        self.router.open_child(id);
        self.timeline.select_first();
    }

    /// Leaving the admin page locks it again.
    fn go_home(&mut self) {
        self.router.go_home();
        self.gate.lock();
        self.home
            .ensure_in_bounds(self.store.public_children().len());
    }

    fn open_admin(&mut self) -> Mode {
        self.clear_status();
        self.router.open_admin();
        self.admin.ensure_in_bounds(self.store.children().len());
        if self.gate.is_unlocked() {
            Mode::Normal
        } else {
            Mode::Login(LoginForm::default())
        }
    }

    fn open_profile_image(&mut self) {
        let reference = self
            .router
            .selected_child()
            .and_then(|id| self.store.child(id))
            .map(|child| child.profile_image.clone());
        match reference {
            Some(reference) => self.open_reference(&reference, "profile photo"),
            None => self.set_status("This record is no longer available.", StatusKind::Error),
        }
    }

    fn open_artwork_image(&mut self) {
        let reference = self.router.selected_child().and_then(|id| {
            let artworks = self.store.artworks_for(id);
            let art = artworks.get(self.timeline.current(artworks.len())?)?;
            Some(
                art.image_urls
                    .iter()
                    .find(|url| is_web_ref(url))
                    .or_else(|| art.image_urls.first())
                    .cloned()
                    .unwrap_or_default(),
            )
        });
        match reference {
            Some(reference) => self.open_reference(&reference, "artwork image"),
            None => self.set_status("No artwork selected.", StatusKind::Error),
        }
    }

    fn open_reference(&mut self, reference: &str, what: &str) {
        if reference.trim().is_empty() {
            self.set_status(format!("There is no {what} to open."), StatusKind::Error);
        } else if !is_web_ref(reference) {
            self.set_status(
                format!("This {what} is stored inline and cannot be opened in a browser."),
                StatusKind::Error,
            );
        } else if let Err(err) = open_link(reference) {
            self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
        } else {
            self.set_status(format!("Opened {what}."), StatusKind::Info);
        }
    }

    fn current_admin_child(&self) -> Option<&Child> {
        let children = self.store.children();
        children.get(self.admin.current(children.len())?)
    }

    fn take_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match self.router.page() {
            Page::Home => self.draw_home(frame, chunks[1]),
            Page::ChildDetail => self.draw_child_detail(frame, chunks[1]),
            Page::Admin => self.draw_admin(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Login(form) => self.draw_login(frame, area, form),
            Mode::PasswordAlert { message, .. } => self.draw_password_alert(frame, area, message),
            Mode::AddingChild(form) => self.draw_child_form(frame, area, form),
            Mode::AddingArtwork { child_id, form } => {
                self.draw_artwork_form(frame, area, child_id, form)
            }
            Mode::ConfirmChildDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let tab = |label: &'static str, active: bool| {
            if active {
                Span::styled(
                    format!(" {label} "),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                )
            } else {
                Span::styled(format!(" {label} "), Style::default().fg(Color::Gray))
            }
        };
        let page = self.router.page();
        let line = Line::from(vec![
            Span::styled(BRAND, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            tab("Stories", page == Page::Home),
            tab("Child", page == Page::ChildDetail),
            tab("Manage", page == Page::Admin),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, area);
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(5),
            ])
            .split(area);

        let hero = Paragraph::new(vec![
            Line::from(Span::styled(
                "아이 한 명 한 명의 시간과 생각을 담습니다",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "여기는 결과를 소비하지 않는 곳입니다. 그림 뒤에 숨겨진 아이의 문장과 교사의 관찰을 통해 하나의 작은 세계를 만나보세요.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(hero, chunks[0]);

        let children = self.store.public_children();
        if children.is_empty() {
            let message = Paragraph::new("No public stories yet.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, chunks[1]);
        } else {
            self.draw_card_grid(frame, chunks[1], &children);
        }

        let philosophy = Paragraph::new(vec![
            Line::from(Span::styled(
                "우리는 '잘 그린 그림'보다 '아이가 머문 시간'을 믿습니다",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "까미유미뇽 아카이브는 아이들의 예술적 완성도보다 그 과정에서 일어나는 생각의 흐름에 집중합니다.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP).title("Philosophy"));
        frame.render_widget(philosophy, chunks[2]);
    }

    fn draw_card_grid(&self, frame: &mut Frame, area: Rect, children: &[&Child]) {
        let visible_rows = ((area.height / CARD_HEIGHT) as usize).max(1);
        let start_row = window_start(
            GRID.row_of(self.home.selected),
            visible_rows,
            GRID.row_count(children.len()),
        );

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(area);

        for (offset, row_area) in rows.iter().enumerate() {
            let row = start_row + offset;
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID.columns as u32); GRID.columns])
                .split(*row_area);
            for (col, cell) in columns.iter().enumerate() {
                let index = row * GRID.columns + col;
                if let Some(child) = children.get(index) {
                    self.draw_child_card(frame, *cell, child, index == self.home.selected);
                }
            }
        }
    }

    fn draw_child_card(&self, frame: &mut Frame, area: Rect, child: &Child, selected: bool) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(child.nickname.clone());
        if selected {
            block = block.style(Style::default().fg(Color::Yellow));
        }

        let lines = vec![
            Line::from(Span::styled(
                child.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(child.age.clone(), Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                child.one_liner.clone(),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];

        let card = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(card, area);
    }

    fn draw_child_detail(&self, frame: &mut Frame, area: Rect) {
        let child = self
            .router
            .selected_child()
            .and_then(|id| self.store.child(id));
        let Some(child) = child else {
            let message = Paragraph::new("This record is no longer available. Press Esc to return.")
                .alignment(Alignment::Center);
            frame.render_widget(message, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(area);

        let profile = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{} | {}", child.age, child.visibility),
                Style::default().fg(Color::Gray),
            )),
            Line::from(vec![
                Span::raw("Photo: "),
                Span::styled(
                    describe_image_ref(&child.profile_image),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(Span::styled(
                format!("“{}”", child.teacher_observation),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("\"{}\"", PHILOSOPHY_MESSAGES[0]),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(child.display_name()),
        );
        frame.render_widget(profile, chunks[0]);

        let artworks = self.store.artworks_for(&child.id);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Timeline ({})", artworks.len()));
        if artworks.is_empty() {
            let message = Paragraph::new("기록된 작품이 아직 없습니다.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, chunks[1]);
            return;
        }

        let inner_height = block.inner(chunks[1]).height as usize;
        let (lines, selected_end) = self.timeline_lines(&artworks);
        let scroll = selected_end.saturating_sub(inner_height) as u16;
        let timeline = Paragraph::new(lines).block(block).scroll((scroll, 0));
        frame.render_widget(timeline, chunks[1]);
    }

    /// Timeline text plus the line index just past the selected entry, which
    /// drives scrolling.
    fn timeline_lines(&self, artworks: &[&Artwork]) -> (Vec<Line<'static>>, usize) {
        let selected = self.timeline.selected;
        let mut lines = Vec::new();
        let mut selected_end = 0;

        for (index, art) in artworks.iter().enumerate() {
            let is_selected = index == selected;
            let marker = if is_selected { "▶ " } else { "  " };
            let heading_style = if is_selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(
                format!("{marker}{} · {}", art.date, art.topic),
                heading_style,
            )));

            if art.image_urls.is_empty() {
                lines.push(Line::from(Span::styled(
                    "    (이미지가 없습니다.)",
                    Style::default().fg(Color::DarkGray),
                )));
            } else {
                for url in &art.image_urls {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", describe_image_ref(url)),
                        Style::default().fg(Color::Cyan),
                    )));
                }
            }

            lines.push(Line::from(Span::styled(
                format!("    “{}”", art.child_quote),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(Span::styled(
                format!("    {}", art.teacher_record),
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(""));

            if is_selected {
                selected_end = lines.len();
            }

            if let Some(message) = timeline_interjection(index, artworks.len()) {
                lines.push(Line::from(Span::styled(
                    format!("        \"{message}\""),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::from(""));
            }
        }

        (lines, selected_end)
    }

    fn draw_admin(&self, frame: &mut Frame, area: Rect) {
        if !self.gate.is_unlocked() {
            let message = Paragraph::new("관리자 로그인이 필요합니다.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(message, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                "기록 관리 시스템",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "아이들의 소중한 시간을 기록하세요.",
                Style::default().fg(Color::Gray),
            )),
        ]);
        frame.render_widget(title, chunks[0]);

        let children = self.store.children();
        if children.is_empty() {
            let message = Paragraph::new("No children recorded yet. Press '+' to add the first one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let width = chunks[1].width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = children
            .iter()
            .map(|child| {
                let count = self.store.artworks_for(&child.id).len();
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            child.display_name(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {} | {} | {count} artwork(s)", child.age, child.visibility),
                            Style::default().fg(Color::Gray),
                        ),
                    ]),
                    Line::from(Span::styled(
                        truncate_chars(&format!("\"{}\"", child.one_liner), width),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Children"))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(self.admin.current(children.len()));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: Vec<(&str, &str)> = match (&self.mode, self.router.page()) {
            (Mode::Login(_), _) => vec![("Enter", "Sign in"), ("Esc", "Home")],
            (Mode::PasswordAlert { .. }, _) => vec![("Enter", "Dismiss")],
            (Mode::AddingChild(_), _) => vec![
                ("Tab", "Next field"),
                ("←→/Space", "Visibility"),
                ("Enter", "Save / load photo"),
                ("Esc", "Cancel"),
            ],
            (Mode::AddingArtwork { .. }, _) => vec![
                ("Tab", "Next field"),
                ("Enter", "Save / add image"),
                ("Del", "Remove last image"),
                ("Esc", "Cancel"),
            ],
            (Mode::ConfirmChildDelete(_), _) => vec![("Y", "Delete"), ("N", "Keep")],
            (Mode::Normal, Page::Home) => vec![
                ("←↑↓→", "Navigate"),
                ("Enter", "Open"),
                ("A", "Manage"),
                ("Q", "Quit"),
            ],
            (Mode::Normal, Page::ChildDetail) => vec![
                ("↑↓", "Timeline"),
                ("Enter", "Open artwork"),
                ("O", "Open photo"),
                ("Esc", "All children"),
                ("Q", "Quit"),
            ],
            (Mode::Normal, Page::Admin) => vec![
                ("↑↓", "Select"),
                ("+", "Add child"),
                ("R", "Add artwork"),
                ("-", "Delete"),
                ("Esc", "Home"),
                ("Q", "Quit"),
            ],
        };

        Line::from(
            hints
                .into_iter()
                .flat_map(|(key, action)| key_hint(key, action))
                .collect::<Vec<_>>(),
        )
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("관리자 로그인").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            Line::from(Span::styled(
                "교사 전용 업로드 시스템 • Enter to sign in • Esc to go home",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "Password: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn draw_password_alert(&self, frame: &mut Frame, area: Rect, message: &str) {
        let popup_area = centered_rect(40, 20, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Alert")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Red));
        let paragraph = Paragraph::new(vec![
            Line::from(message.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to continue.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_child_form(&self, frame: &mut Frame, area: Rect, form: &ChildForm) {
        let popup_area = centered_rect(80, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("새 아이 등록").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ChildField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();

        let photo = if form.profile_image.is_empty() {
            "none (a placeholder portrait will be used)".to_string()
        } else {
            describe_image_ref(&form.profile_image)
        };
        lines.push(Line::from(vec![
            Span::raw("Photo: "),
            Span::styled(photo, Style::default().fg(Color::Cyan)),
        ]));
        self.push_pending_line(&mut lines, form.ticket);
        lines.push(Line::from(""));
        push_error_or_hint(&mut lines, &form.error, "Enter to save • Tab to switch • Esc to cancel");

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        if form.active != ChildField::Visibility {
            let row = ChildField::ORDER
                .iter()
                .position(|f| *f == form.active)
                .unwrap_or(0) as u16;
            let prefix = form.active.label().chars().count() as u16 + 2;
            frame.set_cursor_position((
                inner.x + prefix + form.value_len(form.active) as u16,
                inner.y + row,
            ));
        }
    }

    fn draw_artwork_form(&self, frame: &mut Frame, area: Rect, child_id: &str, form: &ArtworkForm) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let target = self
            .store
            .child(child_id)
            .map(|child| child.nickname.clone())
            .unwrap_or_else(|| child_id.to_string());
        let block = Block::default()
            .title(format!("작품 기록 추가 | 대상: {target}"))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ArtworkField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();

        lines.push(Line::from(format!("Images ({}):", form.image_urls.len())));
        if form.image_urls.is_empty() {
            lines.push(Line::from(Span::styled(
                "  none yet (a placeholder image will be used)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (index, url) in form.image_urls.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("  {}. {}", index + 1, describe_image_ref(url)),
                Style::default().fg(Color::Cyan),
            )));
        }
        self.push_pending_line(&mut lines, form.ticket);
        lines.push(Line::from(""));
        push_error_or_hint(
            &mut lines,
            &form.error,
            "Enter to save • Tab to switch • Del to drop the last image • Esc to cancel",
        );

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        let row = ArtworkField::ORDER
            .iter()
            .position(|f| *f == form.active)
            .unwrap_or(0) as u16;
        let prefix = form.active.label().chars().count() as u16 + 2;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn push_pending_line(&self, lines: &mut Vec<Line<'static>>, ticket: u64) {
        let pending = self.ingestor.pending(ticket);
        if pending > 0 {
            lines.push(Line::from(Span::styled(
                format!("Reading {pending} file(s)..."),
                Style::default().fg(Color::Yellow),
            )));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmChildDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete every record of {}?", confirm.display_name)),
            Line::from(format!(
                "This also removes {} artwork record(s).",
                confirm.artwork_count
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

/// A typed path only becomes an image once Enter is pressed on its field.
fn ensure_path_loaded(path: &str, label: &str) -> Result<()> {
    let path = path.trim();
    if path.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Press Enter on the {label} field to load {path} first."
        ))
    }
}

fn push_error_or_hint(lines: &mut Vec<Line<'static>>, error: &Option<String>, hint: &'static str) {
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::Gray),
        )));
    }
}
