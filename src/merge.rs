//! Lazy k-way merge across the four concurrent price streams (limit, floating-limit, market,
//! vAMM-synthetic) into a single monotone best-ask or best-bid stream.

use std::iter::Peekable;

use crate::error::DlobResult;
use crate::node::{DlobNode, Node};
use crate::order::OraclePriceData;

/// Iterates `Node`s in non-decreasing (ask) or non-increasing (bid) price order across however
/// many underlying sources were given it, evaluating price live against `(oracle, slot)` on
/// every peek rather than trusting each source's own static sort key.
///
/// Source order matters: on an exact price tie, the earliest-listed source wins (the scan below
/// only replaces the current best on a strict improvement, which makes it stable left-to-right).
/// Callers should list sources as `[limit, floatingLimit, market, vAMM]` to get the priority the
/// matching engine relies on (user orders beat vAMM at equal price).
pub struct MergeIter<'a> {
    sources: Vec<Peekable<Box<dyn Iterator<Item = Node> + 'a>>>,
    ascending: bool,
    oracle: Option<OraclePriceData>,
    slot: u64,
}

impl<'a> MergeIter<'a> {
    pub fn new(
        sources: Vec<Box<dyn Iterator<Item = Node> + 'a>>,
        ascending: bool,
        oracle: Option<OraclePriceData>,
        slot: u64,
    ) -> Self {
        Self {
            sources: sources.into_iter().map(Iterator::peekable).collect(),
            ascending,
            oracle,
            slot,
        }
    }

    /// Returns the next node in priority order, or `None` once every source is exhausted.
    /// Fails with `MissingOracle` as soon as any source's head can't be priced, even if that
    /// head wouldn't end up being the best candidate.
    pub fn next(&mut self) -> Option<DlobResult<Node>> {
        let mut best: Option<(usize, i128)> = None;

        for (i, source) in self.sources.iter_mut().enumerate() {
            let Some(node) = source.peek() else {
                continue;
            };
            let price = match node.get_price(self.oracle.as_ref(), self.slot) {
                Ok(p) => p,
                Err(e) => return Some(Err(e)),
            };
            let is_better = match best {
                None => true,
                Some((_, best_price)) => {
                    if self.ascending {
                        price < best_price
                    } else {
                        price > best_price
                    }
                }
            };
            if is_better {
                best = Some((i, price));
            }
        }

        let (idx, _) = best?;
        self.sources[idx].next()
    }

    /// Peeks the next node's price without consuming it. Used by `getBestAsk`/`getBestBid`.
    pub fn peek_price(&mut self) -> Option<DlobResult<i128>> {
        let mut best: Option<i128> = None;
        let mut err = None;

        for source in self.sources.iter_mut() {
            let Some(node) = source.peek() else {
                continue;
            };
            match node.get_price(self.oracle.as_ref(), self.slot) {
                Ok(price) => {
                    let is_better = match best {
                        None => true,
                        Some(best_price) => {
                            if self.ascending {
                                price < best_price
                            } else {
                                price > best_price
                            }
                        }
                    };
                    if is_better {
                        best = Some(price);
                    }
                }
                Err(e) => err = Some(e),
            }
        }

        best.map(Ok).or(err.map(Err))
    }

    /// Collects the whole stream eagerly. Convenient for tests and for the public
    /// `getAsks`/`getBids` readers, which return a materialized `Vec` rather than a borrowed
    /// generator so callers aren't tied to the `DLOB`'s borrow for the iterator's lifetime.
    pub fn collect_all(mut self) -> DlobResult<Vec<Node>> {
        let mut out = Vec::new();
        while let Some(node) = self.next() {
            out.push(node?);
        }
        Ok(out)
    }
}
