//! The remark side channel.
//!
//! With `not_boring` enabled (the default), a newly opened pull request always
//! gets a short remark comment; later events get one with probability 1/10.

use rand::Rng;

/// Number of faces on the remark dice.
pub const DICE_SIDES: u32 = 10;

const REMARKS: &[&str] = &[
    "Thanks for the pull request! The checks are on it.",
    "A new pull request, how exciting. Checks are running.",
    "Fresh code! Let's see what the checks make of it.",
    "Another day, another pull request. Checks incoming.",
    "I have read your pull request with great interest. So have the checks.",
];

/// Source of randomness for remarks.
pub trait RemarkDice: Send + Sync {
    /// Returns a value in `0..sides`.
    fn roll(&self, sides: u32) -> u32;
}

/// Dice backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDice;

impl RemarkDice for ThreadRngDice {
    fn roll(&self, sides: u32) -> u32 {
        rand::thread_rng().gen_range(0..sides)
    }
}

/// Dice that always lands on the same face.
#[derive(Debug, Clone, Copy)]
pub struct FixedDice(pub u32);

impl RemarkDice for FixedDice {
    fn roll(&self, sides: u32) -> u32 {
        self.0 % sides
    }
}

/// Decides whether to remark on this event and returns the remark text.
pub fn choose_remark(not_boring: bool, is_new: bool, dice: &dyn RemarkDice) -> Option<String> {
    if !not_boring {
        return None;
    }

    if !is_new && dice.roll(DICE_SIDES) != DICE_SIDES - 1 {
        return None;
    }

    let pick = dice.roll(REMARKS.len() as u32) as usize;
    REMARKS.get(pick).map(|s| s.to_string())
}
