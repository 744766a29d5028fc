//! Local state of the non-quiz screens: dashboard list, create-session
//! form with its catalog pickers, profile form, and text fields.

use crate::api::model::{NewSession, ProfileUpdate, Section, Session, Topic, User};
use crate::auth::provider::DevicePrompt;
use chrono::NaiveDate;
use std::fmt::Write;

pub const SESSIONS_FAILED: &str = "Failed to load sessions. Please try again later.";

/// Single-line editable text with a byte-offset cursor.
#[derive(Debug, Default, Clone)]
pub struct TextField {
    pub text: String,
    pub cursor: usize,
}

impl TextField {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Display column of the cursor.
    pub fn cursor_col(&self) -> usize {
        unicode_width::UnicodeWidthStr::width(&self.text[..self.cursor])
    }

    pub fn value(&self) -> &str {
        self.text.trim()
    }
}

#[derive(Debug, Default)]
pub struct LandingState {
    pub signing_in: bool,
    pub prompt: Option<DevicePrompt>,
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub loading: bool,
    pub sessions: Vec<Session>,
    pub error: Option<String>,
    pub selected: usize,
}

impl DashboardState {
    pub fn start_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Returns `true` when there is nothing to show, i.e. the user should be
    /// sent straight to the create-session form.
    pub fn loaded(&mut self, sessions: Vec<Session>) -> bool {
        self.loading = false;
        self.sessions = sessions;
        self.selected = self.selected.min(self.sessions.len().saturating_sub(1));
        self.sessions.is_empty()
    }

    pub fn failed(&mut self) {
        self.loading = false;
        self.error = Some(SESSIONS_FAILED.to_string());
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.sessions.len() {
            self.selected += 1;
        }
    }

    pub fn selected_session(&self) -> Option<&Session> {
        self.sessions.get(self.selected)
    }
}

/// `Untimed`, `<m>mins` or `<h>h <m>mins`.
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(seconds) = seconds else {
        return "Untimed".to_string();
    };
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours == 0 {
        format!("{}mins", minutes)
    } else {
        format!("{}h {}mins", hours, minutes)
    }
}

/// Format `date` with a user-configured strftime pattern; `-` when the
/// pattern is invalid.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return "-".to_string();
    }
    out
}

pub fn format_percent(correct: u32, attempted: u32) -> String {
    if attempted == 0 {
        return "N/A".to_string();
    }
    format!("{:.2}%", correct as f64 / attempted as f64 * 100.0)
}

/// A selectable catalog entry.
pub trait CatalogEntry: Clone {
    fn id(&self) -> i64;
    fn title(&self) -> &str;
    fn count(&self) -> u32;

    fn label(&self) -> String {
        format!("{} ({})", self.title(), self.count())
    }
}

impl CatalogEntry for Section {
    fn id(&self) -> i64 {
        self.section_id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn count(&self) -> u32 {
        self.count
    }
}

impl CatalogEntry for Topic {
    fn id(&self) -> i64 {
        self.topic_id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn count(&self) -> u32 {
        self.count
    }
}

/// Searchable multi-select list of sections or topics.
#[derive(Debug)]
pub struct Picker<T: CatalogEntry> {
    pub entries: Vec<T>,
    pub chosen: Vec<T>,
    pub search: TextField,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub open: bool,
}

impl<T: CatalogEntry> Default for Picker<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            chosen: Vec::new(),
            search: TextField::default(),
            cursor: 0,
            scroll_offset: 0,
            open: false,
        }
    }
}

impl<T: CatalogEntry> Picker<T> {
    /// Apply a catalog reply. Replies for an outdated search term are dropped.
    pub fn set_entries(&mut self, search: &str, entries: Vec<T>) -> bool {
        if search != self.search.text {
            return false;
        }
        self.entries = entries;
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
        self.scroll_offset = 0;
        true
    }

    pub fn is_chosen(&self, entry: &T) -> bool {
        self.chosen.iter().any(|c| c.id() == entry.id())
    }

    /// Toggle the entry under the cursor in or out of the selection.
    pub fn toggle_current(&mut self) {
        let Some(entry) = self.entries.get(self.cursor).cloned() else {
            return;
        };
        if self.is_chosen(&entry) {
            self.chosen.retain(|c| c.id() != entry.id());
        } else {
            self.chosen.push(entry);
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn ensure_visible(&mut self, visible_rows: usize) {
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if visible_rows > 0 && self.cursor >= self.scroll_offset + visible_rows {
            self.scroll_offset = self.cursor + 1 - visible_rows;
        }
    }

    pub fn summary(&self) -> String {
        if self.chosen.is_empty() {
            return "Select".to_string();
        }
        self.chosen
            .iter()
            .map(CatalogEntry::label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn chosen_ids(&self) -> Vec<i64> {
        self.chosen.iter().map(CatalogEntry::id).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionPolicy {
    #[default]
    All,
    Incorrect,
    Manual,
}

impl QuestionPolicy {
    pub fn label(self) -> &'static str {
        match self {
            QuestionPolicy::All => "All Questions",
            QuestionPolicy::Incorrect => "Questions answered incorrectly",
            QuestionPolicy::Manual => "Choose manually",
        }
    }

    fn cycle(self, forward: bool) -> Self {
        use QuestionPolicy::*;
        match (self, forward) {
            (All, true) | (Manual, false) => Incorrect,
            (Incorrect, true) | (All, false) => Manual,
            (Manual, true) | (Incorrect, false) => All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationPolicy {
    #[default]
    Unlimited,
    Manual,
}

impl DurationPolicy {
    pub fn label(self) -> &'static str {
        match self {
            DurationPolicy::Unlimited => "Unlimited",
            DurationPolicy::Manual => "Set manually",
        }
    }
}

/// Focusable rows of the create-session form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
    #[default]
    Sections,
    Topics,
    Questions,
    QuestionCount,
    Duration,
    Hours,
    Minutes,
    Start,
}

#[derive(Debug)]
pub struct CreateSessionForm {
    pub sections: Picker<Section>,
    pub topics: Picker<Topic>,
    pub question_policy: QuestionPolicy,
    pub question_count: u32,
    pub duration_policy: DurationPolicy,
    pub hours: u32,
    pub minutes: u32,
    pub focus: CreateField,
    pub submitting: bool,
}

impl Default for CreateSessionForm {
    fn default() -> Self {
        Self {
            sections: Picker::default(),
            topics: Picker::default(),
            question_policy: QuestionPolicy::All,
            question_count: 1,
            duration_policy: DurationPolicy::Unlimited,
            hours: 1,
            minutes: 0,
            focus: CreateField::Sections,
            submitting: false,
        }
    }
}

impl CreateSessionForm {
    /// Rows currently on screen; the count and time rows only show for
    /// manual policies.
    pub fn visible_fields(&self) -> Vec<CreateField> {
        let mut fields = vec![CreateField::Sections, CreateField::Topics, CreateField::Questions];
        if self.question_policy == QuestionPolicy::Manual {
            fields.push(CreateField::QuestionCount);
        }
        fields.push(CreateField::Duration);
        if self.duration_policy == DurationPolicy::Manual {
            fields.push(CreateField::Hours);
            fields.push(CreateField::Minutes);
        }
        fields.push(CreateField::Start);
        fields
    }

    pub fn focus_next(&mut self) {
        let fields = self.visible_fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1).min(fields.len() - 1)];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.visible_fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[idx.saturating_sub(1)];
    }

    /// Left/right on the focused row: cycle a policy or step a number.
    pub fn adjust(&mut self, forward: bool) {
        match self.focus {
            CreateField::Questions => self.question_policy = self.question_policy.cycle(forward),
            CreateField::QuestionCount => {
                self.question_count = step(self.question_count, forward).max(1);
            }
            CreateField::Duration => {
                self.duration_policy = match self.duration_policy {
                    DurationPolicy::Unlimited => DurationPolicy::Manual,
                    DurationPolicy::Manual => DurationPolicy::Unlimited,
                };
            }
            CreateField::Hours => self.hours = step(self.hours, forward),
            CreateField::Minutes => self.minutes = step(self.minutes, forward).min(59),
            CreateField::Sections | CreateField::Topics | CreateField::Start => {}
        }
    }

    /// Type a digit into the focused number row.
    pub fn push_digit(&mut self, digit: u32) {
        let append = |v: u32| v.saturating_mul(10).saturating_add(digit);
        match self.focus {
            CreateField::QuestionCount => self.question_count = append(self.question_count).min(9999),
            CreateField::Hours => self.hours = append(self.hours).min(99),
            CreateField::Minutes => {
                let v = append(self.minutes);
                self.minutes = if v > 59 { digit } else { v };
            }
            _ => {}
        }
    }

    pub fn pop_digit(&mut self) {
        match self.focus {
            CreateField::QuestionCount => self.question_count /= 10,
            CreateField::Hours => self.hours /= 10,
            CreateField::Minutes => self.minutes /= 10,
            _ => {}
        }
    }

    /// Body of the `POST /session` request.
    pub fn request(&self) -> NewSession {
        NewSession {
            topic_ids: self.topics.chosen_ids(),
            section_ids: self.sections.chosen_ids(),
            number_of_questions: (self.question_policy == QuestionPolicy::Manual)
                .then_some(self.question_count.max(1)),
            duration_seconds: (self.duration_policy == DurationPolicy::Manual)
                .then(|| self.hours as u64 * 3600 + self.minutes as u64 * 60),
        }
    }
}

fn step(value: u32, forward: bool) -> u32 {
    if forward {
        value.saturating_add(1)
    } else {
        value.saturating_sub(1)
    }
}

/// First/last name and phone form shown to users without a profile.
#[derive(Debug, Default)]
pub struct ProfileForm {
    pub fields: [TextField; 3],
    /// 0..=2 are the text fields, 3 is the submit button.
    pub focus: usize,
    pub submitting: bool,
}

impl ProfileForm {
    pub const LABELS: [&'static str; 3] = ["First Name", "Last Name", "Phone Number"];

    pub fn for_user(user: Option<&User>) -> Self {
        let text = |value: Option<&String>| TextField::with_text(value.map_or("", String::as_str));
        Self {
            fields: [
                text(user.and_then(|u| u.firstname.as_ref())),
                text(user.and_then(|u| u.lastname.as_ref())),
                text(user.and_then(|u| u.mobile_number.as_ref())),
            ],
            focus: 0,
            submitting: false,
        }
    }

    pub fn focused_field(&mut self) -> Option<&mut TextField> {
        self.fields.get_mut(self.focus)
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % 4;
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + 3) % 4;
    }

    pub fn is_complete(&self) -> bool {
        !self.fields[0].value().is_empty()
    }

    pub fn request(&self) -> ProfileUpdate {
        ProfileUpdate {
            firstname: self.fields[0].value().to_string(),
            lastname: self.fields[1].value().to_string(),
            mobile_number: self.fields[2].value().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: i64, title: &str, count: u32) -> Section {
        Section {
            section_id: id,
            title: title.into(),
            count,
        }
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(None), "Untimed");
        assert_eq!(format_duration(Some(45 * 60)), "45mins");
        assert_eq!(format_duration(Some(3600 + 30 * 60)), "1h 30mins");
        assert_eq!(format_duration(Some(7200)), "2h 0mins");
    }

    #[test]
    fn date_formatting_tolerates_bad_patterns() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(date, "%d/%m/%Y"), "05/03/2024");
        assert_eq!(format_date(date, "%Q"), "-");
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(0, 0), "N/A");
        assert_eq!(format_percent(2, 3), "66.67%");
        assert_eq!(format_percent(5, 5), "100.00%");
    }

    #[test]
    fn picker_toggles_by_id() {
        let mut picker: Picker<Section> = Picker::default();
        assert!(picker.set_entries("", vec![section(1, "Quant", 40), section(2, "Verbal", 35)]));
        assert_eq!(picker.summary(), "Select");

        picker.toggle_current();
        picker.move_down();
        picker.toggle_current();
        assert_eq!(picker.summary(), "Quant (40), Verbal (35)");

        picker.move_up();
        picker.toggle_current();
        assert_eq!(picker.chosen_ids(), vec![2]);
    }

    #[test]
    fn picker_drops_outdated_search_replies() {
        let mut picker: Picker<Section> = Picker::default();
        picker.search.insert_char('q');
        assert!(!picker.set_entries("", vec![section(1, "Quant", 1)]));
        assert!(picker.entries.is_empty());
        assert!(picker.set_entries("q", vec![section(1, "Quant", 1)]));
        assert_eq!(picker.entries.len(), 1);
    }

    #[test]
    fn picker_keeps_choices_across_searches() {
        let mut picker: Picker<Section> = Picker::default();
        picker.set_entries("", vec![section(1, "Quant", 40)]);
        picker.toggle_current();
        picker.search.insert_char('v');
        picker.set_entries("v", vec![section(2, "Verbal", 35)]);
        picker.toggle_current();
        assert_eq!(picker.chosen_ids(), vec![1, 2]);
    }

    #[test]
    fn default_request_is_unbounded() {
        let form = CreateSessionForm::default();
        let req = form.request();
        assert_eq!(req.number_of_questions, None);
        assert_eq!(req.duration_seconds, None);
        assert!(req.section_ids.is_empty());
    }

    #[test]
    fn manual_policies_fill_request() {
        let mut form = CreateSessionForm::default();
        form.sections.set_entries("", vec![section(4, "IR", 12)]);
        form.sections.toggle_current();

        form.focus = CreateField::Questions;
        form.adjust(true);
        assert_eq!(form.question_policy, QuestionPolicy::Incorrect);
        assert_eq!(form.request().number_of_questions, None);
        form.adjust(true);
        assert_eq!(form.question_policy, QuestionPolicy::Manual);

        form.focus = CreateField::QuestionCount;
        form.pop_digit();
        form.push_digit(5);
        form.push_digit(0);
        assert_eq!(form.question_count, 50);

        form.focus = CreateField::Duration;
        form.adjust(true);
        form.focus = CreateField::Hours;
        form.adjust(true);
        form.focus = CreateField::Minutes;
        form.push_digit(3);
        form.push_digit(0);

        let req = form.request();
        assert_eq!(req.section_ids, vec![4]);
        assert_eq!(req.number_of_questions, Some(50));
        assert_eq!(req.duration_seconds, Some(2 * 3600 + 30 * 60));
    }

    #[test]
    fn minutes_stay_below_sixty() {
        let mut form = CreateSessionForm::default();
        form.duration_policy = DurationPolicy::Manual;
        form.focus = CreateField::Minutes;
        form.push_digit(7);
        form.push_digit(5);
        assert_eq!(form.minutes, 5);
        form.minutes = 59;
        form.adjust(true);
        assert_eq!(form.minutes, 59);
    }

    #[test]
    fn focus_skips_hidden_rows() {
        let mut form = CreateSessionForm::default();
        form.focus = CreateField::Questions;
        form.focus_next();
        assert_eq!(form.focus, CreateField::Duration);
        form.focus_next();
        assert_eq!(form.focus, CreateField::Start);
        form.focus_next();
        assert_eq!(form.focus, CreateField::Start);
    }

    #[test]
    fn profile_form_builds_update() {
        let user = User {
            firstname: Some("Ada".into()),
            ..User::default()
        };
        let mut form = ProfileForm::for_user(Some(&user));
        assert!(form.is_complete());
        form.focus_next();
        for c in "Lovelace".chars() {
            form.focused_field().unwrap().insert_char(c);
        }
        let req = form.request();
        assert_eq!(req.firstname, "Ada");
        assert_eq!(req.lastname, "Lovelace");
        assert_eq!(req.mobile_number, "");
        form.focus_prev();
        form.focus_prev();
        assert_eq!(form.focus, 3);
        assert!(form.focused_field().is_none());
    }

    #[test]
    fn text_field_editing() {
        let mut f = TextField::default();
        for c in "héllo".chars() {
            f.insert_char(c);
        }
        f.move_left();
        f.delete_back();
        assert_eq!(f.text, "hélo");
        f.move_home();
        f.move_right();
        f.move_right();
        f.delete_back();
        assert_eq!(f.text, "hlo");
        f.move_end();
        assert_eq!(f.cursor_col(), 3);
    }
}
