//! Quiz session state machine.
//!
//! ```text
//! Loading ──question──▶ AwaitingSelection ──confirm──▶ Submitting ──answer──▶ ShowingResult
//!    ▲                                                                            │
//!    └──────────────────────────────── next question ────────────────────────────┘
//! ```
//!
//! Any fetch or submit failure moves to `Error`, which is terminal for the
//! screen. The machine performs no I/O: transitions that need the network
//! return a [`QuizCommand`] for the caller to execute.

use crate::api::model::{option_label, Question, QuestionPayload, QuestionTarget, QuizResult, RecordId, SessionInfo};

pub const NO_TARGET: &str = "No session ID or question ID provided";
pub const FETCH_FAILED: &str = "Failed to fetch question. Please try again.";
pub const SUBMIT_FAILED: &str = "Failed to submit answer. Please try again.";
pub const SELECT_PROMPT: &str = "Please select an option";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    AwaitingSelection,
    Submitting,
    ShowingResult,
    Error,
}

/// Network work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    Fetch(QuestionTarget),
    Submit { option: char, question_id: RecordId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmError {
    NoSelection,
    NotReady,
}

#[derive(Debug)]
pub struct QuizMachine {
    /// What the screen was opened with; reused for a full reload.
    target: Option<QuestionTarget>,
    /// Target of the fetch currently in flight.
    pending: Option<QuestionTarget>,
    phase: QuizPhase,
    question: Option<Question>,
    session: Option<SessionInfo>,
    selected: Option<char>,
    result: Option<QuizResult>,
    question_secs: u64,
    time_left: Option<u64>,
    generation: u64,
    paused: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl QuizMachine {
    /// Open the quiz screen. Returns the initial fetch, or lands in `Error`
    /// when there is nothing to fetch.
    pub fn open(target: Option<QuestionTarget>) -> (Self, Option<QuizCommand>) {
        let mut machine = Self {
            target: target.clone(),
            pending: None,
            phase: QuizPhase::Loading,
            question: None,
            session: None,
            selected: None,
            result: None,
            question_secs: 0,
            time_left: None,
            generation: 0,
            paused: false,
            error: None,
            notice: None,
        };
        match target {
            Some(target) => {
                let cmd = machine.begin_fetch(target);
                (machine, Some(cmd))
            }
            None => {
                machine.fail(NO_TARGET);
                (machine, None)
            }
        }
    }

    fn begin_fetch(&mut self, target: QuestionTarget) -> QuizCommand {
        self.phase = QuizPhase::Loading;
        self.paused = false;
        self.notice = None;
        self.pending = Some(target.clone());
        QuizCommand::Fetch(target)
    }

    fn fail(&mut self, message: &str) {
        self.phase = QuizPhase::Error;
        self.pending = None;
        self.error = Some(message.to_string());
    }

    /// Apply a fetched question. Replies for anything but the fetch in
    /// flight are ignored.
    pub fn question_loaded(&mut self, target: &QuestionTarget, payload: QuestionPayload) -> bool {
        if self.phase != QuizPhase::Loading || self.pending.as_ref() != Some(target) {
            return false;
        }
        if let Some(info) = payload.session_info {
            self.time_left = info.time_left.map(|t| t.max(0) as u64);
            self.session = Some(info);
        }
        self.question = Some(payload.data);
        self.pending = None;
        self.selected = None;
        self.result = None;
        self.question_secs = 0;
        self.generation += 1;
        self.phase = QuizPhase::AwaitingSelection;
        true
    }

    pub fn question_failed(&mut self, target: &QuestionTarget) -> bool {
        if self.phase != QuizPhase::Loading || self.pending.as_ref() != Some(target) {
            return false;
        }
        self.fail(FETCH_FAILED);
        true
    }

    fn accepts_selection(&self) -> bool {
        self.phase == QuizPhase::AwaitingSelection && !self.paused
    }

    /// Select the option with letter `label` (either case).
    pub fn select(&mut self, label: char) -> bool {
        let label = label.to_ascii_uppercase();
        let count = self.option_count();
        if !self.accepts_selection() || !(0..count).any(|i| option_label(i) == label) {
            return false;
        }
        self.selected = Some(label);
        self.notice = None;
        true
    }

    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.option_count() {
            return false;
        }
        self.select(option_label(index))
    }

    /// Move the selection up (`-1`) or down (`+1`), wrapping around.
    pub fn move_selection(&mut self, delta: i32) -> bool {
        let count = self.option_count();
        if count == 0 {
            return false;
        }
        let next = match self.selected_index() {
            None if delta < 0 => count - 1,
            None => 0,
            Some(i) => (i as i64 + delta as i64).rem_euclid(count as i64) as usize,
        };
        self.select_index(next)
    }

    /// Confirm the current selection. Without one, the machine stays put and
    /// raises [`SELECT_PROMPT`].
    pub fn confirm(&mut self) -> Result<QuizCommand, ConfirmError> {
        if !self.accepts_selection() {
            return Err(ConfirmError::NotReady);
        }
        let (Some(option), Some(question)) = (self.selected, self.question.as_ref()) else {
            self.notice = Some(SELECT_PROMPT.to_string());
            return Err(ConfirmError::NoSelection);
        };
        let question_id = question.id.clone();
        self.phase = QuizPhase::Submitting;
        self.notice = None;
        Ok(QuizCommand::Submit {
            option: option.to_ascii_lowercase(),
            question_id,
        })
    }

    /// Apply an answer reply. Only the first reply for the current question
    /// is accepted.
    pub fn answer_received(&mut self, question_id: &RecordId, result: QuizResult) -> bool {
        if self.phase != QuizPhase::Submitting || !self.is_current(question_id) {
            return false;
        }
        self.result = Some(result);
        self.phase = QuizPhase::ShowingResult;
        true
    }

    pub fn answer_failed(&mut self, question_id: &RecordId) -> bool {
        if self.phase != QuizPhase::Submitting || !self.is_current(question_id) {
            return false;
        }
        self.fail(SUBMIT_FAILED);
        true
    }

    fn is_current(&self, question_id: &RecordId) -> bool {
        self.question.as_ref().map(|q| &q.id) == Some(question_id)
    }

    /// Request the next question: by session when one is known, otherwise
    /// reload whatever the screen was opened with.
    pub fn next_question(&mut self) -> Option<QuizCommand> {
        if self.phase != QuizPhase::ShowingResult {
            return None;
        }
        let target = match &self.session {
            Some(info) => QuestionTarget::Session(info.session_id.clone()),
            None => {
                self.question = None;
                self.target.clone()?
            }
        };
        Some(self.begin_fetch(target))
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.phase != QuizPhase::AwaitingSelection {
            return false;
        }
        self.paused = !self.paused;
        true
    }

    /// Whether the one-second ticker should be running.
    pub fn is_ticking(&self) -> bool {
        matches!(self.phase, QuizPhase::AwaitingSelection | QuizPhase::Submitting) && !self.paused
    }

    /// Advance the display clocks by one second. Ticks from an earlier
    /// question (stale generation) are ignored.
    pub fn tick(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.is_ticking() {
            return false;
        }
        self.question_secs += 1;
        if let Some(left) = self.time_left.as_mut() {
            *left = left.saturating_sub(1);
        }
        true
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    pub fn selected(&self) -> Option<char> {
        self.selected
    }

    fn selected_index(&self) -> Option<usize> {
        let label = self.selected?;
        (0..self.option_count()).find(|&i| option_label(i) == label)
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn question_secs(&self) -> u64 {
        self.question_secs
    }

    pub fn time_left(&self) -> Option<u64> {
        self.time_left
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn option_count(&self) -> usize {
        self.question.as_ref().map_or(0, |q| q.options.len())
    }
}

/// `MM:SS`, minutes unbounded.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
