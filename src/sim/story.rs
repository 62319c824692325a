//! Typewriter narration
//!
//! Reveals text one letter at a time with a short pause between words, holds
//! the finished line, then fades it out.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, non_negative};

/// Timing for the typewriter (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryConfig {
    pub letter_delay: f32,
    pub pause_delay: f32,
    /// Hold before fading once all words are shown
    pub fade_delay: f32,
    pub fade_duration: f32,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            letter_delay: 0.03,
            pause_delay: 0.03,
            fade_delay: 1.0,
            fade_duration: 1.0,
        }
    }
}

impl StoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("letter_delay", self.letter_delay)?;
        non_negative("pause_delay", self.pause_delay)?;
        non_negative("fade_delay", self.fade_delay)?;
        non_negative("fade_duration", self.fade_duration)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryPhase {
    Letter,
    Pause,
    Fade,
}

#[derive(Debug, Clone)]
pub struct StoryTeller {
    config: StoryConfig,
    words: Vec<Vec<char>>,
    displayed: String,
    word_index: usize,
    letter_index: usize,
    timer: f32,
    fade_timer: f32,
    phase: StoryPhase,
    alpha: f32,
}

impl StoryTeller {
    pub fn new(text: &str, config: StoryConfig) -> Self {
        Self {
            config,
            words: text.split(' ').map(|w| w.chars().collect()).collect(),
            displayed: String::new(),
            word_index: 0,
            letter_index: 0,
            timer: 0.0,
            fade_timer: 0.0,
            phase: StoryPhase::Letter,
            alpha: 1.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.timer += dt;

        match self.phase {
            StoryPhase::Letter | StoryPhase::Pause if self.word_index >= self.words.len() => {
                self.phase = StoryPhase::Fade;
                self.fade_timer = 0.0;
                self.alpha = 1.0;
            }
            StoryPhase::Letter => {
                let word = &self.words[self.word_index];
                if self.letter_index < word.len() {
                    if self.timer > self.config.letter_delay {
                        self.displayed.push(word[self.letter_index]);
                        self.letter_index += 1;
                        self.timer = 0.0;
                    }
                } else {
                    self.phase = StoryPhase::Pause;
                    self.timer = 0.0;
                }
            }
            StoryPhase::Pause => {
                if self.timer > self.config.pause_delay {
                    self.word_index += 1;
                    self.letter_index = 0;
                    if self.word_index < self.words.len() {
                        self.displayed.push(' ');
                    }
                    self.phase = StoryPhase::Letter;
                    self.timer = 0.0;
                }
            }
            StoryPhase::Fade => {
                self.fade_timer += dt;
                if self.fade_timer > self.config.fade_delay {
                    let progress = if self.config.fade_duration > 0.0 {
                        ((self.fade_timer - self.config.fade_delay) / self.config.fade_duration).min(1.0)
                    } else {
                        1.0
                    };
                    self.alpha = 1.0 - progress;
                    if self.alpha <= 0.0 {
                        self.alpha = 0.0;
                        self.displayed.clear();
                    }
                }
            }
        }
    }

    /// Text revealed so far
    pub fn text(&self) -> &str {
        &self.displayed
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn phase(&self) -> StoryPhase {
        self.phase
    }

    /// Fully faded out
    pub fn is_finished(&self) -> bool {
        self.phase == StoryPhase::Fade && self.alpha <= 0.0
    }

    pub fn reset(&mut self) {
        self.displayed.clear();
        self.word_index = 0;
        self.letter_index = 0;
        self.timer = 0.0;
        self.phase = StoryPhase::Letter;
        self.fade_timer = 0.0;
        self.alpha = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(teller: &mut StoryTeller, secs: f32, dt: f32) {
        for _ in 0..(secs / dt).round() as u32 {
            teller.update(dt);
        }
    }

    #[test]
    fn test_reveals_letter_by_letter() {
        let mut t = StoryTeller::new("Hi fox", StoryConfig::default());
        assert_eq!(t.text(), "");
        // First letter needs the timer to pass letter_delay
        t.update(0.02);
        assert_eq!(t.text(), "");
        t.update(0.02);
        assert_eq!(t.text(), "H");
        t.update(0.04);
        assert_eq!(t.text(), "Hi");
    }

    #[test]
    fn test_full_text_then_fade() {
        let mut t = StoryTeller::new("The wizard Fox awakens", StoryConfig::default());
        run(&mut t, 2.0, 0.016);
        assert_eq!(t.text(), "The wizard Fox awakens");
        assert_eq!(t.phase(), StoryPhase::Fade);
        assert!(!t.is_finished());

        run(&mut t, 2.5, 0.016);
        assert!(t.is_finished());
        assert_eq!(t.alpha(), 0.0);
        assert_eq!(t.text(), "");
    }

    #[test]
    fn test_alpha_midway_through_fade() {
        let config = StoryConfig {
            fade_delay: 0.0,
            fade_duration: 1.0,
            ..Default::default()
        };
        let mut t = StoryTeller::new("", config);
        // Empty word reveals instantly: pause, then fade
        run(&mut t, 0.2, 0.05);
        assert_eq!(t.phase(), StoryPhase::Fade);
        run(&mut t, 0.5, 0.05);
        assert!(t.alpha() > 0.3 && t.alpha() < 0.7);
    }

    #[test]
    fn test_config_validation() {
        assert!(StoryConfig::default().validate().is_ok());
        let bad = StoryConfig {
            fade_duration: -1.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Negative { name: "fade_duration", .. })));
    }

    #[test]
    fn test_reset() {
        let mut t = StoryTeller::new("abc", StoryConfig::default());
        run(&mut t, 5.0, 0.05);
        assert!(t.is_finished());
        t.reset();
        assert_eq!(t.phase(), StoryPhase::Letter);
        assert_eq!(t.alpha(), 1.0);
        run(&mut t, 0.2, 0.05);
        assert_eq!(t.text(), "abc");
    }
}
