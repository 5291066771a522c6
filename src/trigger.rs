//! Scanning the trigger lists for orders whose trigger condition the current oracle price
//! satisfies.

use crate::auction::is_auction_complete;
use crate::node::{DlobNode, Node};

/// One order whose trigger condition has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggeredNode {
    pub node: Node,
}

/// Walks the ascending `above` trigger list: a node fires once `oracle_price > trigger_price`.
/// A node whose auction hasn't completed yet is skipped but the scan continues past it (it may
/// still fire later once its auction completes, and later nodes in the list can still have
/// qualifying trigger prices); the scan halts entirely the first time it meets a node that
/// doesn't satisfy the price condition, since the list is sorted ascending by trigger price and
/// no later node can satisfy it either.
pub fn find_triggered_above<'a>(
    above: impl Iterator<Item = &'a Node>,
    oracle_price: i128,
    slot: u64,
) -> Vec<TriggeredNode> {
    let mut out = Vec::new();
    for node in above {
        let Some(order) = node.order() else { continue };
        if oracle_price <= order.trigger_price {
            break;
        }
        if !is_auction_complete(order, slot) {
            continue;
        }
        out.push(TriggeredNode { node: *node });
    }
    out
}

/// Walks the descending `below` trigger list: a node fires once `oracle_price < trigger_price`.
/// Symmetric to [`find_triggered_above`].
pub fn find_triggered_below<'a>(
    below: impl Iterator<Item = &'a Node>,
    oracle_price: i128,
    slot: u64,
) -> Vec<TriggeredNode> {
    let mut out = Vec::new();
    for node in below {
        let Some(order) = node.order() else { continue };
        if oracle_price >= order.trigger_price {
            break;
        }
        if !is_auction_complete(order, slot) {
            continue;
        }
        out.push(TriggeredNode { node: *node });
    }
    out
}
