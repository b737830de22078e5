//! Individual retrieval strategies. Each produces a ranked list of record ids
//! with scores in `[0, 1]`.

pub mod graph;
pub mod structural;
pub mod vector;

/// A record id scored by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub id: String,
    pub score: f32,
}

impl Scored {
    #[must_use]
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Sort strongest first (ties by id) and keep the top `keep`.
pub(crate) fn rank(mut scored: Vec<Scored>, keep: usize) -> Vec<Scored> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    scored.truncate(keep);
    scored
}
