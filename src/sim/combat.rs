//! Reaction combat mini-game
//!
//! A modal overlay: show a random key from a small alphabet, give the player a
//! fixed window to press exactly that key. Time is simulated from frame deltas
//! (clamped per frame) so a throttled or backgrounded tab can't produce a
//! sudden timeout.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::COMBAT_MAX_STEP;
use crate::error::{ConfigError, non_negative, positive};
use crate::input::Key;

/// Home-row prompt keys
pub const DEFAULT_ALPHABET: [char; 5] = ['A', 'S', 'D', 'F', 'G'];

/// Caller-supplied session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Symbols that may be prompted; also the only keys that count as answers
    pub alphabet: Vec<char>,
    /// Correct answers needed to win
    pub required_rounds: u32,
    /// Seconds per round, measured from round start (grace included)
    pub round_timeout: f32,
    /// Seconds after session start during which key presses are ignored
    pub input_grace: f32,
    /// Seconds the result feedback stays up before completion is delivered
    pub result_display: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.to_vec(),
            required_rounds: 1,
            round_timeout: 1.5,
            input_grace: 0.3,
            result_display: 0.8,
        }
    }
}

impl CombatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.alphabet.len() {
            0 => return Err(ConfigError::EmptyAlphabet),
            1 => return Err(ConfigError::AlphabetTooSmall(1)),
            _ => {}
        }
        for (i, c) in self.alphabet.iter().enumerate() {
            // Letter keys arrive uppercased, other keys carry no symbol
            if !c.is_ascii_uppercase() {
                return Err(ConfigError::UntypableSymbol(*c));
            }
            if self.alphabet[..i].contains(c) {
                return Err(ConfigError::DuplicateSymbol(*c));
            }
        }
        if self.required_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        positive("round_timeout", self.round_timeout)?;
        non_negative("input_grace", self.input_grace)?;
        non_negative("result_display", self.result_display)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Pending,
    Win,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    None,
    WrongKey,
    Timeout,
}

/// Final report handed back to whoever opened the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    pub outcome: Outcome,
    pub failure_reason: FailureReason,
}

impl CombatResult {
    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }
}

/// The round currently being prompted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPrompt {
    pub target: char,
    pub elapsed: f32,
    pub grace_remaining: f32,
    pub round_index: u32,
}

/// Optional UI hooks. Default methods do nothing.
pub trait CombatObserver {
    /// A new target is up (`round` is 0-based)
    fn prompt_changed(&mut self, _target: char, _round: u32, _total: u32) {}
    /// The session resolved; feedback display starts now
    fn resolved(&mut self, _result: CombatResult) {}
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Prompting(RoundPrompt),
    /// Resolved, feedback on screen
    ShowingResult { remaining: f32, shown: f32 },
    /// Completion delivered
    Finished,
    /// Torn down before completion
    Cancelled,
}

/// What one prompting tick decided
enum RoundStep {
    Waiting,
    Correct,
    Wrong,
    TimedOut,
}

/// A running combat session
pub struct CombatSession {
    config: CombatConfig,
    rng: Pcg32,
    rounds_won: u32,
    outcome: Outcome,
    failure_reason: FailureReason,
    phase: Phase,
    observer: Option<Box<dyn CombatObserver>>,
}

impl CombatSession {
    /// Validate `config` and begin the first round
    pub fn start(config: CombatConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::start_observed(config, seed, None)
    }

    /// Like [`CombatSession::start`] with UI hooks attached
    pub fn start_observed(
        config: CombatConfig,
        seed: u64,
        observer: Option<Box<dyn CombatObserver>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut session = Self {
            rng: Pcg32::seed_from_u64(seed),
            rounds_won: 0,
            outcome: Outcome::Pending,
            failure_reason: FailureReason::None,
            phase: Phase::Finished,
            observer,
            config,
        };
        let grace = session.config.input_grace;
        session.begin_round(0, grace);

        log::info!(
            "Combat started: {} round(s), {:.2}s per round",
            session.config.required_rounds,
            session.config.round_timeout
        );
        Ok(session)
    }

    /// Advance simulated time by one frame and consume this frame's key presses.
    ///
    /// Returns the final result exactly once, after the feedback display ends.
    pub fn tick(&mut self, dt: f32, pressed: &[Key]) -> Option<CombatResult> {
        let step = crate::clamp_dt(dt, COMBAT_MAX_STEP);

        match &mut self.phase {
            Phase::Prompting(prompt) => {
                let decision = Self::step_round(&self.config, prompt, step, pressed);
                self.apply(decision)
            }
            Phase::ShowingResult { remaining, shown } => {
                *remaining -= step;
                *shown += step;
                if *remaining <= 0.0 {
                    self.finish()
                } else {
                    None
                }
            }
            Phase::Finished | Phase::Cancelled => None,
        }
    }

    /// Tear down without delivering a result
    pub fn cancel(&mut self) {
        if !matches!(self.phase, Phase::Finished | Phase::Cancelled) {
            log::debug!("Combat cancelled");
            self.phase = Phase::Cancelled;
        }
    }

    fn step_round(config: &CombatConfig, prompt: &mut RoundPrompt, step: f32, pressed: &[Key]) -> RoundStep {
        prompt.elapsed += step;
        prompt.grace_remaining = (prompt.grace_remaining - step).max(0.0);

        // Timeout is checked before input: a late correct press still loses
        if prompt.elapsed > config.round_timeout {
            return RoundStep::TimedOut;
        }
        if prompt.grace_remaining > 0.0 {
            return RoundStep::Waiting;
        }

        let answer = pressed
            .iter()
            .filter_map(Key::symbol)
            .find(|s| config.alphabet.contains(s));

        match answer {
            Some(symbol) if symbol == prompt.target => RoundStep::Correct,
            Some(_) => RoundStep::Wrong,
            None => RoundStep::Waiting,
        }
    }

    fn apply(&mut self, decision: RoundStep) -> Option<CombatResult> {
        match decision {
            RoundStep::Waiting => None,
            RoundStep::TimedOut => self.resolve(Outcome::Lose, FailureReason::Timeout),
            RoundStep::Wrong => self.resolve(Outcome::Lose, FailureReason::WrongKey),
            RoundStep::Correct => {
                self.rounds_won += 1;
                if self.rounds_won >= self.config.required_rounds {
                    self.resolve(Outcome::Win, FailureReason::None)
                } else {
                    self.begin_round(self.rounds_won, 0.0);
                    None
                }
            }
        }
    }

    fn begin_round(&mut self, round_index: u32, grace: f32) {
        let idx = self.rng.random_range(0..self.config.alphabet.len());
        let target = self.config.alphabet[idx];
        log::debug!(
            "Combat round {}/{}: target {}",
            round_index + 1,
            self.config.required_rounds,
            target
        );

        self.phase = Phase::Prompting(RoundPrompt {
            target,
            elapsed: 0.0,
            grace_remaining: grace,
            round_index,
        });
        if let Some(observer) = self.observer.as_mut() {
            observer.prompt_changed(target, round_index, self.config.required_rounds);
        }
    }

    fn resolve(&mut self, outcome: Outcome, reason: FailureReason) -> Option<CombatResult> {
        self.outcome = outcome;
        self.failure_reason = reason;
        log::info!("Combat resolved: {:?} ({:?})", outcome, reason);

        let result = self.result();
        if let Some(observer) = self.observer.as_mut() {
            observer.resolved(result);
        }

        if self.config.result_display > 0.0 {
            self.phase = Phase::ShowingResult {
                remaining: self.config.result_display,
                shown: 0.0,
            };
            None
        } else {
            self.finish()
        }
    }

    fn finish(&mut self) -> Option<CombatResult> {
        self.phase = Phase::Finished;
        Some(self.result())
    }

    fn result(&self) -> CombatResult {
        CombatResult {
            outcome: self.outcome,
            failure_reason: self.failure_reason,
        }
    }

    /// True while rounds are still being played
    pub fn is_active(&self) -> bool {
        self.outcome == Outcome::Pending && matches!(self.phase, Phase::Prompting(_))
    }

    /// True once completion was delivered or the session was cancelled
    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Cancelled)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn failure_reason(&self) -> FailureReason {
        self.failure_reason
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    pub fn required_rounds(&self) -> u32 {
        self.config.required_rounds
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn prompt(&self) -> Option<&RoundPrompt> {
        match &self.phase {
            Phase::Prompting(prompt) => Some(prompt),
            _ => None,
        }
    }

    /// Current target symbol, if a round is running
    pub fn target(&self) -> Option<char> {
        self.prompt().map(|p| p.target)
    }

    /// Seconds left in the current round
    pub fn time_left(&self) -> Option<f32> {
        self.prompt()
            .map(|p| (self.config.round_timeout - p.elapsed).max(0.0))
    }

    /// Prompt line for the overlay
    pub fn prompt_text(&self) -> Option<String> {
        self.prompt().map(|p| {
            format!(
                "Press {}  ({}/{})",
                p.target,
                p.round_index + 1,
                self.config.required_rounds
            )
        })
    }

    /// Feedback line once resolved
    pub fn feedback_text(&self) -> Option<&'static str> {
        match (self.outcome, self.failure_reason) {
            (Outcome::Pending, _) => None,
            (Outcome::Win, _) => Some("WIN!"),
            (Outcome::Lose, FailureReason::Timeout) => Some("Too slow"),
            (Outcome::Lose, _) => Some("Wrong rune"),
        }
    }

    /// Feedback opacity: 1 at resolution, fading to 0
    pub fn feedback_alpha(&self) -> f32 {
        match self.phase {
            Phase::ShowingResult { shown, .. } => {
                let fade = self.config.result_display.max(0.2);
                (1.0 - shown / fade).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
