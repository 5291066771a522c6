//! The matching engine: pairs crossing ask/bid nodes and assigns maker/taker.
//!
//! This matcher is a pure read over book state: it never mutates an order's fill amount or calls
//! `Dlob::update`/`Dlob::remove` itself. It only returns fill pairs; applying them to the book is
//! the caller's job.

use crate::auction::is_auction_complete;
use crate::error::DlobResult;
use crate::merge::MergeIter;
use crate::node::{DlobNode, Node};
use crate::order::OraclePriceData;

/// Hard cap on crossings returned by one `find_crossing_nodes_to_fill` call: downstream is
/// expected to batch fills within a single on-chain transaction.
pub const MAX_FILLS_PER_CALL: usize = 10;

/// One fill instruction: a taker node to execute, and the maker node it crossed against (`None`
/// when the taker is to be filled against the vAMM instead of a peer order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub taker: Node,
    pub maker: Option<Node>,
}

enum Advance {
    Bid,
    Ask,
}

struct CrossStep {
    fill: Option<(Node, Node)>,
    advance: Advance,
}

/// Decides whether one ask and one bid node cross, and if so who's maker and who's taker.
/// Returns `Ok(None)` when the pair doesn't cross. Returns `Ok(Some(step))` describing which
/// side to advance and, if any, the fill to emit.
fn find_crossing_orders(
    ask: Node,
    bid: Node,
    oracle: Option<&OraclePriceData>,
    slot: u64,
) -> DlobResult<Option<CrossStep>> {
    let ask_price = ask.get_price(oracle, slot)?;
    let bid_price = bid.get_price(oracle, slot)?;

    if bid_price < ask_price {
        return Ok(None);
    }

    if ask.is_vamm_node() {
        return Ok(Some(CrossStep {
            fill: None,
            advance: Advance::Bid,
        }));
    }
    if bid.is_vamm_node() {
        return Ok(Some(CrossStep {
            fill: None,
            advance: Advance::Ask,
        }));
    }

    let ask_order = ask.order().expect("non-vAMM ask node always carries an order");
    let bid_order = bid.order().expect("non-vAMM bid node always carries an order");
    let same_user = ask.user_account() == bid.user_account();

    let (fill, advance) = if bid_order.post_only && ask_order.post_only {
        // Neither can be the taker; advance whichever side is older, by slot.
        let advance = if bid_order.slot < ask_order.slot {
            Advance::Bid
        } else {
            Advance::Ask
        };
        (None, advance)
    } else if bid_order.post_only {
        // bid is maker-only; ask is the taker.
        (Some((ask, bid)), Advance::Ask)
    } else if ask_order.post_only {
        (Some((bid, ask)), Advance::Bid)
    } else if ask_order.slot <= bid_order.slot {
        // ask is older (or tied, and ties break to the ask being maker) -> ask maker, bid taker.
        (Some((bid, ask)), Advance::Bid)
    } else {
        // bid is strictly older -> bid maker, ask taker.
        (Some((ask, bid)), Advance::Ask)
    };

    // A user can't be its own counterparty: suppress the fill but still advance past whichever
    // side the verdict picked, so the walk keeps making progress instead of stalling.
    let fill = if same_user { None } else { fill };

    Ok(Some(CrossStep { fill, advance }))
}

/// Walks the ask and bid merge streams in lockstep, pairing crossings via `find_crossing_orders`,
/// until either stream is exhausted, a pair doesn't cross, or `MAX_FILLS_PER_CALL` fills have
/// been emitted.
pub fn find_crossing_nodes_to_fill(
    mut asks: MergeIter<'_>,
    mut bids: MergeIter<'_>,
    oracle: Option<&OraclePriceData>,
    slot: u64,
) -> DlobResult<Vec<Fill>> {
    let mut fills = Vec::new();
    let mut current_ask = asks.next().transpose()?;
    let mut current_bid = bids.next().transpose()?;

    while let (Some(ask), Some(bid)) = (current_ask, current_bid) {
        if fills.len() >= MAX_FILLS_PER_CALL {
            break;
        }

        let Some(step) = find_crossing_orders(ask, bid, oracle, slot)? else {
            break;
        };

        if let Some((taker, maker)) = step.fill {
            fills.push(Fill {
                taker,
                maker: Some(maker),
            });
        }

        match step.advance {
            Advance::Bid => current_bid = bids.next().transpose()?,
            Advance::Ask => current_ask = asks.next().transpose()?,
        }
    }

    Ok(fills)
}

/// Every node in a market (bid or ask) list whose auction has completed is emitted as a
/// takers-only fill, to be matched against the vAMM by the caller.
pub fn find_market_nodes_to_fill<'a>(
    market_nodes: impl Iterator<Item = &'a Node>,
    slot: u64,
) -> Vec<Fill> {
    market_nodes
        .filter_map(|node| {
            let order = node.order()?;
            is_auction_complete(order, slot).then_some(Fill {
                taker: *node,
                maker: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::OrderNode;
    use crate::order::Order;
    use solana_sdk::pubkey::Pubkey;

    fn limit(order_id: u32, slot: u64, price: i128, post_only: bool, user: Pubkey) -> Node {
        Node::Limit(OrderNode::new(
            Order {
                order_id,
                slot,
                price,
                post_only,
                ..Order::default()
            },
            user,
        ))
    }

    fn asks(nodes: Vec<Node>) -> MergeIter<'static> {
        let iter: Box<dyn Iterator<Item = Node>> = Box::new(nodes.into_iter());
        MergeIter::new(vec![iter], true, None, 0)
    }

    fn bids(nodes: Vec<Node>) -> MergeIter<'static> {
        let iter: Box<dyn Iterator<Item = Node>> = Box::new(nodes.into_iter());
        MergeIter::new(vec![iter], false, None, 0)
    }

    #[test]
    fn simple_cross_older_is_maker() {
        let maker = Pubkey::new_unique();
        let taker = Pubkey::new_unique();
        let bid = limit(1, 1, 100, false, maker);
        let ask = limit(2, 2, 100, false, taker);

        let fills = find_crossing_nodes_to_fill(asks(vec![ask]), bids(vec![bid]), None, 10)
            .unwrap();

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].taker.order().unwrap().order_id, 2);
        assert_eq!(fills[0].maker.unwrap().order().unwrap().order_id, 1);
    }

    #[test]
    fn post_only_maker_wins_even_if_younger() {
        let bid_user = Pubkey::new_unique();
        let ask_user = Pubkey::new_unique();
        let bid = limit(1, 5, 100, true, bid_user);
        let ask = limit(2, 1, 99, false, ask_user);

        let fills = find_crossing_nodes_to_fill(asks(vec![ask]), bids(vec![bid]), None, 10)
            .unwrap();

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].taker.order().unwrap().order_id, 2);
        assert_eq!(fills[0].maker.unwrap().order().unwrap().order_id, 1);
    }

    #[test]
    fn both_post_only_deadlocks_with_no_fill() {
        let bid_user = Pubkey::new_unique();
        let ask_user = Pubkey::new_unique();
        let bid = limit(1, 1, 100, true, bid_user);
        let ask = limit(2, 2, 99, true, ask_user);

        let fills = find_crossing_nodes_to_fill(asks(vec![ask]), bids(vec![bid]), None, 10)
            .unwrap();

        assert!(fills.is_empty());
    }

    #[test]
    fn no_cross_yields_no_fills() {
        let user = Pubkey::new_unique();
        let bid = limit(1, 1, 90, false, user);
        let ask = limit(2, 2, 100, false, Pubkey::new_unique());

        let fills = find_crossing_nodes_to_fill(asks(vec![ask]), bids(vec![bid]), None, 10)
            .unwrap();

        assert!(fills.is_empty());
    }

    #[test]
    fn same_user_cross_is_skipped() {
        let user = Pubkey::new_unique();
        let bid = limit(1, 1, 100, false, user);
        let ask = limit(2, 2, 100, false, user);

        let fills = find_crossing_nodes_to_fill(asks(vec![ask]), bids(vec![bid]), None, 10)
            .unwrap();

        assert!(fills.is_empty());
    }

    #[test]
    fn vamm_cross_emits_no_peer_fill() {
        let user = Pubkey::new_unique();
        let bid = limit(1, 1, 105, false, user);

        let ask_src: Box<dyn Iterator<Item = Node>> =
            Box::new(std::iter::once(Node::Vamm(100)));
        let ask_iter = MergeIter::new(vec![ask_src], true, None, 0);

        let fills = find_crossing_nodes_to_fill(ask_iter, bids(vec![bid]), None, 10).unwrap();
        assert!(fills.is_empty());
    }

    #[test]
    fn respects_fill_cap() {
        let mut ask_nodes = Vec::new();
        let mut bid_nodes = Vec::new();
        for i in 0..20u32 {
            let user_a = Pubkey::new_unique();
            let user_b = Pubkey::new_unique();
            ask_nodes.push(limit(i * 2, i as u64 * 2, 100, false, user_a));
            bid_nodes.push(limit(i * 2 + 1, i as u64 * 2 + 1, 100, false, user_b));
        }

        let fills =
            find_crossing_nodes_to_fill(asks(ask_nodes), bids(bid_nodes), None, 1000).unwrap();
        assert!(fills.len() <= MAX_FILLS_PER_CALL);
    }
}
