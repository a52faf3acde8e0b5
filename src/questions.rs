//! Question builders for single-scale and mixed-scale sessions.
//!
//! When a level asks for more questions than there are distinct hidden-position
//! combinations, the shuffled combinations are cycled, so repeated questions are
//! expected for small position pools (e.g. 4 combinations for 8 questions).

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::combinations::shuffled_combinations;
use crate::domain::{LevelConfig, MixedLevelConfig, Question, ScaleDefinition};

/// Build `level.questions_count` questions over one scale.
#[instrument(level = "debug", skip(scale, level, rng), fields(scale = %scale.id, level = level.level))]
pub fn build_questions<R: Rng + ?Sized>(scale: &ScaleDefinition, level: &LevelConfig, rng: &mut R) -> Vec<Question> {
  let combos = shuffled_combinations(&level.allowed_positions, level.missing_notes, rng);
  if combos.is_empty() {
    warn!(target: "session", level = level.level, missing = level.missing_notes, "No hidden-position combinations; level is degenerate");
    return Vec::new();
  }

  let questions: Vec<Question> = (0..level.questions_count)
    .map(|i| Question::new(scale.notes.clone(), combos[i % combos.len()].clone(), None))
    .collect();
  debug!(target: "session", combinations = combos.len(), questions = questions.len(), "Built single-scale questions");
  questions
}

/// Build `level.questions_count` questions spread over up to `level.scale_count`
/// scales picked at random from `scales`. The final order is shuffled.
#[instrument(level = "debug", skip(scales, level, rng), fields(catalog = scales.len(), level = level.base.level))]
pub fn build_mixed_questions<R: Rng + ?Sized>(
  scales: &[ScaleDefinition],
  level: &MixedLevelConfig,
  rng: &mut R,
) -> Vec<Question> {
  let base = &level.base;

  let mut pool: Vec<&ScaleDefinition> = scales.iter().collect();
  pool.shuffle(rng);
  pool.truncate(level.scale_count.min(scales.len()));
  if pool.is_empty() {
    warn!(target: "session", level = base.level, scale_count = level.scale_count, "No scales available for mixed practice");
    return Vec::new();
  }

  let combos = shuffled_combinations(&base.allowed_positions, base.missing_notes, rng);
  if combos.is_empty() {
    warn!(target: "session", level = base.level, missing = base.missing_notes, "No hidden-position combinations; mixed level is degenerate");
    return Vec::new();
  }

  let per_scale = base.questions_count.div_ceil(pool.len());
  let mut questions: Vec<Question> = Vec::with_capacity(base.questions_count);

  for (scale_index, scale) in pool.iter().enumerate() {
    let remaining = base.questions_count - questions.len();
    let take = per_scale.min(remaining);
    for i in 0..take {
      let combo = &combos[(scale_index * per_scale + i) % combos.len()];
      questions.push(Question::new(scale.notes.clone(), combo.clone(), Some(scale.tag())));
    }
  }

  questions.shuffle(rng);
  debug!(
    target: "session",
    scales = pool.len(),
    per_scale,
    combinations = combos.len(),
    questions = questions.len(),
    "Built mixed questions"
  );
  questions
}
