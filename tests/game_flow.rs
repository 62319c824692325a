//! End-to-end runs through the scene stack

use ketunkolo::game::GameConfig;
use ketunkolo::sim::{FailureReason, MaskImage, Outcome, PlatformPose};
use ketunkolo::{FrameInput, Game, Key, SceneId};

const DT: f32 = 1.0 / 60.0;

struct Driver {
    game: Game,
    input: FrameInput,
}

impl Driver {
    fn new(mask: Option<MaskImage>) -> Self {
        Self {
            game: Game::new(GameConfig::default(), mask, 1234).unwrap(),
            input: FrameInput::default(),
        }
    }

    fn step(&mut self) {
        self.game.frame(DT, &self.input);
        self.input.end_frame();
    }

    fn tap(&mut self, key: Key) {
        self.input.press(key);
        self.step();
        self.input.release(key);
    }

    /// Step until `done` holds, failing after `limit` frames
    fn until(&mut self, limit: u32, done: impl Fn(&Game) -> bool) {
        for _ in 0..limit {
            if done(&self.game) {
                return;
            }
            self.step();
        }
        assert!(done(&self.game), "condition not reached in {} frames", limit);
    }

    fn walk_to_fridge(&mut self) {
        self.input.press(Key::Right);
        self.until(600, |g| g.platform().and_then(|p| p.drink_prompt()).is_some());
        self.input.release(Key::Right);
    }

    fn open_combat(&mut self) {
        self.tap(Key::letter('g'));
        assert!(self.game.combat().is_some());
        self.until(60, |g| g.combat().and_then(|c| c.prompt()).is_some_and(|p| p.grace_remaining <= 0.0));
    }
}

#[test]
fn intro_plays_through_to_platform() {
    let mut d = Driver::new(None);
    assert_eq!(d.game.scene(), Some(SceneId::Intro));
    d.until(700, |g| g.scene() == Some(SceneId::Platform));
}

#[test]
fn drink_win_then_leave_the_room() {
    let mut d = Driver::new(None);
    d.tap(Key::Enter);
    assert_eq!(d.game.scene(), Some(SceneId::Platform));

    d.walk_to_fridge();
    d.open_combat();

    let target = d.game.combat().and_then(|c| c.target()).unwrap();
    d.tap(Key::letter(target));
    assert_eq!(d.game.combat().unwrap().outcome(), Outcome::Win);
    assert_eq!(d.game.combat().unwrap().feedback_text(), Some("WIN!"));

    d.until(120, |g| g.combat().is_none());
    let level = d.game.platform().unwrap();
    assert_eq!(level.wins(), 1);
    assert_eq!(level.pose(), PlatformPose::Standing);
    assert_eq!(d.game.meter().get(), 5.0);

    d.input.press(Key::Right);
    d.until(600, |g| g.scene() == Some(SceneId::TopDown));
    assert_eq!(d.game.layers().len(), 1);
}

#[test]
fn wrong_rune_blacks_out_and_restarts_day() {
    let mut d = Driver::new(None);
    d.tap(Key::Enter);
    d.walk_to_fridge();
    d.open_combat();

    let target = d.game.combat().and_then(|c| c.target()).unwrap();
    let wrong = ['A', 'S', 'D', 'F', 'G'].into_iter().find(|c| *c != target).unwrap();
    d.tap(Key::letter(wrong));
    let session = d.game.combat().unwrap();
    assert_eq!(session.outcome(), Outcome::Lose);
    assert_eq!(session.failure_reason(), FailureReason::WrongKey);

    d.until(120, |g| g.combat().is_none());
    assert_eq!(d.game.platform().unwrap().pose(), PlatformPose::Drunk);
    assert_eq!(d.game.meter().get(), 0.0);

    // Frozen during the blackout
    let x = d.game.platform().unwrap().pos().x;
    d.input.press(Key::Left);
    for _ in 0..30 {
        d.step();
    }
    assert_eq!(d.game.platform().unwrap().pos().x, x);
    d.input.release(Key::Left);

    d.until(360, |g| g.scene() == Some(SceneId::Intro));
}

#[test]
fn idle_combat_times_out() {
    let mut d = Driver::new(None);
    d.tap(Key::Enter);
    d.walk_to_fridge();
    d.open_combat();

    d.until(240, |g| g.combat().is_some_and(|c| !c.is_active()));
    assert_eq!(d.game.combat().unwrap().failure_reason(), FailureReason::Timeout);
    assert_eq!(d.game.combat().unwrap().feedback_text(), Some("Too slow"));
}

#[test]
fn long_frame_is_clamped() {
    let mut d = Driver::new(None);
    d.tap(Key::Enter);
    d.walk_to_fridge();
    d.open_combat();

    // A stalled tab reports a huge delta; the 3s round must survive it
    d.game.frame(5.0, &FrameInput::default());
    assert!(d.game.combat().unwrap().is_active());
}

#[test]
fn topdown_respects_mask() {
    // Left third of the background is a wall
    let mask = MaskImage::from_fn(1024, 768, |x, _| if x < 300 { 0 } else { 255 }).unwrap();
    let mut d = Driver::new(Some(mask));
    d.tap(Key::Digit(3));
    assert_eq!(d.game.scene(), Some(SceneId::TopDown));

    let wall_x = 300.0 * 1.7;
    d.input.press(Key::letter('a'));
    for _ in 0..900 {
        d.step();
    }
    let level = d.game.topdown().unwrap();
    assert!(level.pos().x > wall_x);
    assert!(level.pos().x < wall_x + 40.0);

    // Shift walks through it
    d.input.press(Key::Shift);
    for _ in 0..120 {
        d.step();
    }
    assert!(d.game.topdown().unwrap().pos().x < wall_x);
}

#[test]
fn hotkeys_from_anywhere() {
    let mut d = Driver::new(None);
    d.tap(Key::Digit(2));
    assert_eq!(d.game.scene(), Some(SceneId::Platform));
    d.walk_to_fridge();
    d.tap(Key::letter('g'));
    assert!(d.game.combat().is_some());

    d.tap(Key::Digit(1));
    assert_eq!(d.game.scene(), Some(SceneId::Intro));
    assert!(d.game.combat().is_none());
    assert_eq!(d.game.layers().len(), 1);
}
