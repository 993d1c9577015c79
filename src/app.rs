use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::game::{Game, SessionResult};
use crate::leaderboard::{Leaderboard, MAX_NAME_LEN};
use crate::runtime::{FixedTicker, Ticker};
use crate::store::KvStore;
use crate::timer::SessionTimer;

/// Answers are at most four digits on the keypad
pub const MAX_ANSWER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Home,
    Playing,
    NamePrompt,
    Leaderboard,
    ConfirmClear,
}

/// Status line shown under the problem or prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect { expected: u32 },
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Screen state machine tying the game, timer and leaderboard together
#[derive(Debug)]
pub struct App<S: KvStore, T: Ticker = FixedTicker> {
    pub screen: Screen,
    pub game: Game,
    pub timer: SessionTimer<T>,
    pub leaderboard: Leaderboard<S>,
    pub answer_input: String,
    pub name_input: String,
    pub pending_result: Option<SessionResult>,
    pub feedback: Option<Feedback>,
    /// Zero-based rank of the entry added last, if it made the board
    pub last_rank: Option<usize>,
    pub config: Config,
    config_store: Option<FileConfigStore>,
}

impl<S: KvStore, T: Ticker> App<S, T> {
    pub fn new(game: Game, timer: SessionTimer<T>, leaderboard: Leaderboard<S>) -> Self {
        Self {
            screen: Screen::Home,
            game,
            timer,
            leaderboard,
            answer_input: String::new(),
            name_input: String::new(),
            pending_result: None,
            feedback: None,
            last_rank: None,
            config: Config::default(),
            config_store: None,
        }
    }

    /// Load preferences from `store` and write changes back to it
    pub fn with_config_store(mut self, store: FileConfigStore) -> Self {
        self.config = store.load();
        self.config_store = Some(store);
        self
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.timer.stop();
            return Control::Quit;
        }

        let before = self.screen;
        match self.screen {
            Screen::Home => match key.code {
                KeyCode::Enter | KeyCode::Char('s') => self.start_session(),
                KeyCode::Char('l') => self.show_leaderboard(),
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            Screen::Playing => match key.code {
                KeyCode::Enter => self.submit_answer(),
                KeyCode::Backspace => {
                    self.answer_input.pop();
                }
                KeyCode::Esc => self.stop_session(),
                // digits, plus a sign in front
                KeyCode::Char(c)
                    if c.is_ascii_digit() || (c == '-' && self.answer_input.is_empty()) =>
                {
                    if self.answer_input.chars().count() < MAX_ANSWER_LEN {
                        self.answer_input.push(c);
                    }
                }
                _ => {}
            },
            Screen::NamePrompt => match key.code {
                KeyCode::Enter => self.submit_name(),
                KeyCode::Backspace => {
                    self.name_input.pop();
                }
                KeyCode::Esc => self.skip_name(),
                KeyCode::Char(c) => {
                    if self.name_input.chars().count() < MAX_NAME_LEN {
                        self.name_input.push(c);
                    }
                }
                _ => {}
            },
            Screen::Leaderboard => match key.code {
                KeyCode::Char('c') if !self.leaderboard.is_empty() => {
                    self.screen = Screen::ConfirmClear;
                }
                KeyCode::Char('s') => self.start_session(),
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => self.go_home(),
                _ => {}
            },
            Screen::ConfirmClear => {
                if key.code == KeyCode::Char('y') {
                    self.leaderboard.clear();
                    self.last_rank = None;
                    info!("leaderboard cleared by player");
                }
                self.screen = Screen::Leaderboard;
            }
        }

        if self.screen != before {
            debug!("screen {} -> {}", before, self.screen);
        }
        Control::Continue
    }

    pub fn start_session(&mut self) {
        self.game.reset();
        self.game.generate();
        self.timer.reset();
        self.timer.start();
        self.answer_input.clear();
        self.feedback = None;
        self.pending_result = None;
        self.screen = Screen::Playing;
        info!("session started");
    }

    /// Score the typed answer and move on. Empty input is ignored.
    pub fn submit_answer(&mut self) {
        if self.answer_input.trim().is_empty() {
            return;
        }
        let expected = self.game.current_problem().answer;
        match self.game.submit_text(&self.answer_input) {
            Ok(correct) => {
                self.feedback = Some(if correct {
                    Feedback::Correct
                } else {
                    Feedback::Incorrect { expected }
                });
                self.answer_input.clear();
                self.game.generate();
            }
            Err(e) => {
                warn!("rejected answer: {}", e);
                self.feedback = Some(Feedback::Error(e.user_message()));
            }
        }
    }

    /// End the session. With no answers there is nothing to record.
    pub fn stop_session(&mut self) {
        self.timer.stop();
        let elapsed = self.timer.elapsed_seconds();
        match self.game.finish(elapsed) {
            Some(result) => {
                info!(
                    "session finished: {}/{} ({}%) in {}s",
                    result.score, result.total_questions, result.accuracy, result.elapsed_seconds
                );
                self.pending_result = Some(result);
                self.name_input = self.config.last_player_name.clone().unwrap_or_default();
                self.feedback = None;
                self.screen = Screen::NamePrompt;
            }
            None => {
                info!("session abandoned without answers");
                self.go_home();
            }
        }
    }

    pub fn submit_name(&mut self) {
        let Some(result) = self.pending_result else {
            self.go_home();
            return;
        };
        match self.leaderboard.add_entry(&self.name_input, &result) {
            Ok(rank) => {
                self.last_rank = rank;
                self.remember_name();
                self.pending_result = None;
                self.name_input.clear();
                self.feedback = None;
                self.screen = Screen::Leaderboard;
            }
            Err(e) => {
                self.feedback = Some(Feedback::Error(e.user_message()));
            }
        }
    }

    pub fn skip_name(&mut self) {
        self.pending_result = None;
        self.name_input.clear();
        self.go_home();
    }

    /// Show the in-memory board; it already holds every change, even ones the store rejected
    pub fn show_leaderboard(&mut self) {
        self.last_rank = None;
        self.feedback = None;
        self.screen = Screen::Leaderboard;
    }

    fn go_home(&mut self) {
        self.game.reset();
        self.answer_input.clear();
        self.feedback = None;
        self.screen = Screen::Home;
    }

    fn remember_name(&mut self) {
        let name = self.name_input.trim().to_string();
        if self.config.last_player_name.as_deref() == Some(name.as_str()) {
            return;
        }
        self.config.last_player_name = Some(name);
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                warn!("could not save config to {}: {}", store.path().display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemGenerator;
    use crate::error::{Error, Result};
    use crate::store::MemoryKvStore;
    use std::time::Duration;
    use tempfile::tempdir;

    type TestApp = App<MemoryKvStore>;

    fn test_app() -> TestApp {
        App::new(
            Game::with_generator(ProblemGenerator::seeded(3)),
            SessionTimer::with_ticker(FixedTicker::new(Duration::from_secs(3600))),
            Leaderboard::open(MemoryKvStore::new()),
        )
    }

    /// Memory store that can be told to reject writes or removals
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryKvStore,
        fail_set: bool,
        fail_remove: bool,
    }

    fn unavailable<T>() -> Result<T> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "read-only filesystem",
        )))
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_set {
                return unavailable();
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<()> {
            if self.fail_remove {
                return unavailable();
            }
            self.inner.remove(key)
        }
    }

    fn flaky_app(store: FlakyStore) -> App<FlakyStore> {
        App::new(
            Game::with_generator(ProblemGenerator::seeded(5)),
            SessionTimer::with_ticker(FixedTicker::new(Duration::from_secs(3600))),
            Leaderboard::open(store),
        )
    }

    fn press<S: KvStore>(app: &mut App<S>, code: KeyCode) -> Control {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str<S: KvStore>(app: &mut App<S>, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Play one answered session and save it under `name`
    fn play_and_save<S: KvStore>(app: &mut App<S>, name: &str) {
        app.start_session();
        answer(app, true);
        app.stop_session();
        type_str(app, name);
        press(app, KeyCode::Enter);
    }

    fn answer<S: KvStore>(app: &mut App<S>, correct: bool) {
        let p = app.game.current_problem();
        let value = if correct { p.answer } else { p.answer + 1 };
        type_str(app, &value.to_string());
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_starts_on_home() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_quit_from_home() {
        let mut app = test_app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), Control::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_playing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.on_key(ctrl_c), Control::Quit);
        assert!(!app.timer.is_running());
    }

    #[test]
    fn test_start_session() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen, Screen::Playing);
        assert!(app.timer.is_running());
        assert_eq!(app.timer.elapsed_seconds(), 0);
        assert_eq!(app.game.total_count(), 0);
    }

    #[test]
    fn test_correct_and_incorrect_feedback() {
        let mut app = test_app();
        app.start_session();

        answer(&mut app, true);
        assert_eq!(app.feedback, Some(Feedback::Correct));
        assert!(app.answer_input.is_empty());

        let expected = app.game.current_problem().answer;
        answer(&mut app, false);
        assert_eq!(app.feedback, Some(Feedback::Incorrect { expected }));
        assert_eq!(app.game.correct_count(), 1);
        assert_eq!(app.game.total_count(), 2);
    }

    #[test]
    fn test_empty_answer_is_ignored() {
        let mut app = test_app();
        app.start_session();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.game.total_count(), 0);
        assert_eq!(app.feedback, None);
    }

    #[test]
    fn test_invalid_answer_reports_error() {
        let mut app = test_app();
        app.start_session();
        let before = app.game.current_problem();
        type_str(&mut app, "-");
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.feedback,
            Some(Feedback::Error("Please enter a valid number".into()))
        );
        assert_eq!(app.game.total_count(), 0);
        assert_eq!(app.game.current_problem(), before);
    }

    #[test]
    fn test_answer_accepts_digits_and_leading_minus() {
        let mut app = test_app();
        app.start_session();
        type_str(&mut app, "a1-x 2");
        assert_eq!(app.answer_input, "12");
        app.answer_input.clear();
        type_str(&mut app, "-7");
        assert_eq!(app.answer_input, "-7");
    }

    #[test]
    fn test_entry_survives_failed_write_across_navigation() {
        let mut app = flaky_app(FlakyStore {
            fail_set: true,
            ..FlakyStore::default()
        });
        play_and_save(&mut app, "Ann");
        assert_eq!(app.screen, Screen::Leaderboard);
        assert_eq!(app.leaderboard.len(), 1);

        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.screen, Screen::Leaderboard);
        assert_eq!(app.leaderboard.len(), 1);
        assert_eq!(app.leaderboard.entries()[0].player_name, "Ann");
    }

    #[test]
    fn test_clear_survives_failed_remove_across_navigation() {
        let mut app = flaky_app(FlakyStore {
            fail_remove: true,
            ..FlakyStore::default()
        });
        play_and_save(&mut app, "Ann");
        assert_eq!(app.leaderboard.len(), 1);

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.leaderboard.is_empty());

        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.screen, Screen::Leaderboard);
        assert!(app.leaderboard.is_empty());
    }

    #[test]
    fn test_screen_names() {
        assert_eq!(Screen::NamePrompt.to_string(), "NamePrompt");
        assert_eq!(Screen::ConfirmClear.to_string(), "ConfirmClear");
    }

    #[test]
    fn test_answer_length_is_capped() {
        let mut app = test_app();
        app.start_session();
        type_str(&mut app, "123456");
        assert_eq!(app.answer_input, "1234");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.answer_input, "123");
    }

    #[test]
    fn test_stop_without_answers_goes_home() {
        let mut app = test_app();
        app.start_session();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Home);
        assert!(app.pending_result.is_none());
        assert!(!app.timer.is_running());
    }

    #[test]
    fn test_full_session_reaches_leaderboard() {
        let mut app = test_app();
        app.start_session();
        for i in 0..10 {
            answer(&mut app, i < 8);
        }
        for _ in 0..95 {
            app.timer.tick();
        }
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.screen, Screen::NamePrompt);
        let result = app.pending_result.unwrap();
        assert_eq!((result.score, result.accuracy, result.elapsed_seconds), (8, 80, 95));

        type_str(&mut app, "Ann");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Leaderboard);
        assert_eq!(app.last_rank, Some(0));
        let top = &app.leaderboard.entries()[0];
        assert_eq!(top.player_name, "Ann");
        assert_eq!(top.score, 8);
        assert_eq!(top.accuracy, 80);
        assert_eq!(top.time_completed, 95);
    }

    #[test]
    fn test_short_name_is_rejected() {
        let mut app = test_app();
        app.start_session();
        answer(&mut app, true);
        app.stop_session();

        type_str(&mut app, "A");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::NamePrompt);
        assert!(matches!(app.feedback, Some(Feedback::Error(_))));
        assert!(app.leaderboard.is_empty());
    }

    #[test]
    fn test_skip_name() {
        let mut app = test_app();
        app.start_session();
        answer(&mut app, true);
        app.stop_session();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Home);
        assert!(app.leaderboard.is_empty());
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut app = test_app();
        app.start_session();
        answer(&mut app, true);
        app.stop_session();
        type_str(&mut app, "Ann");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.screen, Screen::ConfirmClear);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::Leaderboard);
        assert_eq!(app.leaderboard.len(), 1);

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.screen, Screen::Leaderboard);
        assert!(app.leaderboard.is_empty());
    }

    #[test]
    fn test_name_is_remembered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut app = test_app().with_config_store(FileConfigStore::with_path(&path));

        app.start_session();
        answer(&mut app, true);
        app.stop_session();
        type_str(&mut app, "Bo");
        press(&mut app, KeyCode::Enter);

        let reloaded = FileConfigStore::with_path(&path).load();
        assert_eq!(reloaded.last_player_name.as_deref(), Some("Bo"));

        app.start_session();
        answer(&mut app, true);
        app.stop_session();
        assert_eq!(app.name_input, "Bo");
    }
}
