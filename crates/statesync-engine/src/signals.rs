//! Syncing-signal streams derived from the pending-name set.
//!
//! All signals are level-triggered views over one watch channel: the set
//! of property names with a live fetch. Streams replay the current level
//! on subscription and then report only transitions.

use std::collections::BTreeSet;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tokio::sync::watch;

type PendingNames = watch::Receiver<BTreeSet<String>>;

/// A distinct-until-changed boolean stream over the pending set.
///
/// Yields the predicate's current value immediately, then once per
/// transition. Ends when the owning selector is dropped.
pub(crate) fn bool_signal(
    rx: PendingNames,
    predicate: impl Fn(&BTreeSet<String>) -> bool + Send + 'static,
) -> BoxStream<'static, bool> {
    stream::unfold(
        (rx, predicate, None::<bool>),
        |(mut rx, predicate, mut last)| async move {
            loop {
                if last.is_some() && rx.changed().await.is_err() {
                    return None;
                }
                let level = predicate(&rx.borrow_and_update());
                if last == Some(level) {
                    continue;
                }
                last = Some(level);
                return Some((level, (rx, predicate, last)));
            }
        },
    )
    .boxed()
}

/// A stream of the subset of `names` currently matching `matches`,
/// distinct-until-changed, skipping empty subsets.
///
/// Backs the "some" signal variants: the first non-empty subset is the
/// first property to reach the target state.
pub(crate) fn subset_signal(
    rx: PendingNames,
    names: Vec<String>,
    matches: impl Fn(&BTreeSet<String>, &str) -> bool + Send + 'static,
) -> BoxStream<'static, Vec<String>> {
    stream::unfold(
        (rx, names, matches, None::<Vec<String>>, false),
        |(mut rx, names, matches, mut last, mut started)| async move {
            loop {
                if started && rx.changed().await.is_err() {
                    return None;
                }
                started = true;
                let subset: Vec<String> = {
                    let pending = rx.borrow_and_update();
                    names
                        .iter()
                        .filter(|name| matches(&pending, name))
                        .cloned()
                        .collect()
                };
                if last.as_ref() == Some(&subset) {
                    continue;
                }
                last = Some(subset.clone());
                if subset.is_empty() {
                    continue;
                }
                return Some((subset, (rx, names, matches, last, started)));
            }
        },
    )
    .boxed()
}
