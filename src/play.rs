//! Play mode: ask every quiz once, in random order, until a miss or
//! completion.
//!
//! The catalog is snapshotted once at game start; quizzes added mid-game are
//! never incorporated and `total` stays frozen. A quiz deleted by another
//! session between the snapshot and its turn is dropped from the game
//! without counting a round.

use crate::normalize::answers_match;
use crate::session::{Conn, HandlerError};
use crate::store::{QuizStore, StoreError};
use crate::text;
use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

/// One game's state, owned by a single `play` invocation.
///
/// `remaining` shrinks by one per correct answer (and per concurrently
/// deleted quiz) and never regrows; `score <= total` always holds.
pub struct PlayState {
    remaining: Vec<i64>,
    total: usize,
    score: usize,
}

impl PlayState {
    pub fn new(ids: Vec<i64>) -> Self {
        let total = ids.len();
        Self {
            remaining: ids,
            total,
            score: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_done(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Pick a uniformly random index into the current remaining set, so
    /// every not-yet-answered quiz is equally likely regardless of prior
    /// removals.
    pub fn pick(&self) -> usize {
        rand::thread_rng().gen_range(0..self.remaining.len())
    }

    pub fn id_at(&self, index: usize) -> i64 {
        self.remaining[index]
    }

    /// Drop a quiz that vanished from the catalog; does not count a round
    pub fn discard(&mut self, index: usize) {
        self.remaining.swap_remove(index);
    }

    /// Record a correct answer and retire the quiz
    pub fn mark_correct(&mut self, index: usize) {
        self.remaining.swap_remove(index);
        self.score += 1;
    }
}

/// Run one game over the given connection.
pub async fn run<R, W>(store: &dyn QuizStore, conn: &mut Conn<R, W>) -> Result<(), HandlerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ids: Vec<i64> = store.list().await?.into_iter().map(|q| q.id).collect();
    let mut state = PlayState::new(ids);

    if state.total() == 0 {
        conn.send(&text::play_empty()).await?;
        return Ok(());
    }
    debug!(total = state.total(), "Game started");

    loop {
        let index = state.pick();
        let quiz = match store.get(state.id_at(index)).await {
            Ok(quiz) => quiz,
            Err(StoreError::NotFound(id)) => {
                // Deleted by another session since the snapshot; re-pick
                debug!(id, "Quiz vanished mid-game, dropping it");
                state.discard(index);
                if state.is_done() {
                    conn.send(&text::play_tally(state.score(), state.total())).await?;
                    conn.send(&text::play_over()).await?;
                    return Ok(());
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        conn.send(&text::play_question(&quiz)).await?;
        let answer = conn.ask(&text::answer_prompt(), None).await?;

        if answers_match(&answer, &quiz.answer) {
            state.mark_correct(index);
            conn.send(&text::correct()).await?;
            if state.is_done() {
                debug!(score = state.score(), "Game won");
                conn.send(&text::play_win()).await?;
                return Ok(());
            }
        } else {
            debug!(score = state.score(), total = state.total(), "Game lost");
            conn.send(&text::incorrect()).await?;
            conn.send(&text::play_tally(state.score(), state.total())).await?;
            conn.send(&text::play_over()).await?;
            return Ok(());
        }
    }
}
