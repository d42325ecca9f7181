//! Value-preserving shuffle.
//!
//! Used everywhere option order is randomized: the marked value is located
//! again by equality after the shuffle, so reordering can never silently
//! invalidate the answer key.

use rand::seq::SliceRandom;

use crate::domain::Question;

/// Shuffle `items` uniformly and return the new index of `marked`.
///
/// `marked` must be present in `items`; if duplicates exist the first
/// occurrence after shuffling is reported, which is equivalent by value.
pub fn shuffle_keeping_marked<T: Clone + PartialEq>(items: &[T], marked: &T) -> (Vec<T>, usize) {
  let mut shuffled = items.to_vec();
  shuffled.shuffle(&mut rand::rng());
  let index = shuffled
    .iter()
    .position(|item| item == marked)
    .unwrap_or(0);
  (shuffled, index)
}

/// Shuffle a question's options in place, relocating `correct_option`
pub fn shuffle_options(question: &mut Question) {
  let Some(correct) = question.options.get(question.correct_option).cloned() else {
    return;
  };
  let (options, index) = shuffle_keeping_marked(&question.options, &correct);
  question.options = options;
  question.correct_option = index;
}
