//! Lazy, single-pass stream of episodes.
//!
//! Every combinator only wraps the underlying iterator; no episode is read or
//! transformed until the stream is pulled. Steps are materialised one episode at a
//! time while that episode passes through a step transform.

use crate::{Episode, RldsResult, Step};

/// Boxed episode iterator backing a [`Dataset`].
pub type EpisodeStream<'a> = Box<dyn Iterator<Item = RldsResult<Episode>> + Send + 'a>;

pub struct Dataset<'a> {
    episodes: EpisodeStream<'a>,
}

impl<'a> Dataset<'a> {
    pub fn from_iter<I>(episodes: I) -> Dataset<'a>
    where
        I: IntoIterator<Item = RldsResult<Episode>>,
        I::IntoIter: Send + 'a,
    {
        Dataset {
            episodes: Box::new(episodes.into_iter()),
        }
    }

    pub fn from_episodes<I>(episodes: I) -> Dataset<'a>
    where
        I: IntoIterator<Item = Episode>,
        I::IntoIter: Send + 'a,
    {
        Dataset::from_iter(episodes.into_iter().map(Ok))
    }

    pub fn empty() -> Dataset<'a> {
        Dataset::from_iter(std::iter::empty())
    }

    /// Lazily applies `f` to every episode. Upstream errors pass through untouched.
    pub fn map<F>(self, f: F) -> Dataset<'a>
    where
        F: Fn(Episode) -> RldsResult<Episode> + Send + 'a,
    {
        Dataset {
            episodes: Box::new(self.episodes.map(move |episode| episode.and_then(&f))),
        }
    }

    /// Lazily applies `f` to every step of every episode, in order.
    pub fn map_steps<F>(self, f: F) -> Dataset<'a>
    where
        F: Fn(Step) -> RldsResult<Step> + Send + 'a,
    {
        self.map(move |mut episode| {
            episode.steps = episode
                .steps
                .into_iter()
                .map(&f)
                .collect::<RldsResult<Vec<Step>>>()?;
            Ok(episode)
        })
    }

    /// Lazily keeps the episodes `predicate` accepts, preserving their order.
    pub fn filter<P>(self, predicate: P) -> Dataset<'a>
    where
        P: Fn(&Episode) -> RldsResult<bool> + Send + 'a,
    {
        Dataset {
            episodes: Box::new(self.episodes.filter_map(move |episode| match episode {
                Ok(episode) => match predicate(&episode) {
                    Ok(true) => Some(Ok(episode)),
                    Ok(false) => None,
                    Err(error) => Some(Err(error)),
                },
                Err(error) => Some(Err(error)),
            })),
        }
    }

    /// Drains the stream, stopping at the first error.
    pub fn collect_episodes(self) -> RldsResult<Vec<Episode>> {
        self.episodes.collect()
    }
}

impl Iterator for Dataset<'_> {
    type Item = RldsResult<Episode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.episodes.next()
    }
}

impl std::fmt::Debug for Dataset<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset").finish_non_exhaustive()
    }
}
