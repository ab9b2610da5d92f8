// src/models/task.rs

//! Search task: one keyword searched on one board.

/// A (keyword, board) unit of fetch + parse work.
///
/// The task holds the board itself, so running it never looks the board up
/// again by name.
#[derive(Debug, PartialEq, Eq)]
pub struct SearchTask<'a, B> {
    pub keyword: &'a str,
    pub board: &'a B,
}

impl<B> Clone for SearchTask<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for SearchTask<'_, B> {}

impl<'a, B> SearchTask<'a, B> {
    /// Every keyword paired with every board: keywords outer, boards inner,
    /// both in configured order.
    pub fn cartesian<K>(keywords: &'a [K], boards: &'a [B]) -> Vec<Self>
    where
        K: AsRef<str>,
    {
        keywords
            .iter()
            .flat_map(|keyword| {
                boards.iter().map(move |board| SearchTask {
                    keyword: keyword.as_ref(),
                    board,
                })
            })
            .collect()
    }
}
