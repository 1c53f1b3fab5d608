use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::Question;

/// Category id the quiz client sends for "all categories".
pub const ALL_CATEGORIES: i64 = 0;

/// Random source shared by quiz requests. Seed it to get a reproducible sequence of picks.
#[derive(Clone)]
pub struct QuizRng(Arc<Mutex<StdRng>>);

impl QuizRng {
    pub fn new(rng: StdRng) -> Self {
        Self(Arc::new(Mutex::new(rng)))
    }

    /// Picks with the shared source. The lock is held only for the pick itself.
    pub fn next_question(&self, candidates: Vec<Question>, seen: &[i64]) -> Option<Question> {
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        next_question(candidates, seen, &mut *rng)
    }
}

/// Chooses uniformly among the candidates whose id is not in `seen`.
///
/// `None` means the quiz is over for this pool, every candidate has been asked.
pub fn next_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    seen: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let seen: HashSet<i64> = seen.iter().copied().collect();
    let unseen: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !seen.contains(&q.id))
        .collect();
    unseen.choose(rng).cloned()
}
