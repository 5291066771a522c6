//! `DLOB`: the per-market registry of node lists and the mutator/reader surface callers drive.

use std::collections::{HashMap, HashSet};

use solana_sdk::pubkey::Pubkey;

use crate::error::{DlobError, DlobResult};
use crate::matching::{find_crossing_nodes_to_fill, find_market_nodes_to_fill, Fill};
use crate::node::{DlobNode, Node, OrderNode};
use crate::node_list::{NodeList, SortDirection};
use crate::order::{order_signature, OraclePriceData, Order, OrderStatus, OrderTriggerCondition};
use crate::trigger::{find_triggered_above, find_triggered_below, TriggeredNode};

/// The eight node lists one market needs: four classes, each split bid/ask (trigger is split
/// above/below instead). Bid lists are descending, ask lists ascending, except market lists
/// (always ascending by `ts`, because market orders carry no single quote price to sort by).
#[derive(Debug, Clone)]
struct MarketNodeLists {
    limit_bid: NodeList,
    limit_ask: NodeList,
    floating_limit_bid: NodeList,
    floating_limit_ask: NodeList,
    market_bid: NodeList,
    market_ask: NodeList,
    trigger_above: NodeList,
    trigger_below: NodeList,
}

impl MarketNodeLists {
    fn new() -> Self {
        Self {
            limit_bid: NodeList::new(SortDirection::Descending),
            limit_ask: NodeList::new(SortDirection::Ascending),
            floating_limit_bid: NodeList::new(SortDirection::Descending),
            floating_limit_ask: NodeList::new(SortDirection::Ascending),
            market_bid: NodeList::new(SortDirection::Ascending),
            market_ask: NodeList::new(SortDirection::Ascending),
            trigger_above: NodeList::new(SortDirection::Ascending),
            trigger_below: NodeList::new(SortDirection::Descending),
        }
    }
}

/// Which class+side an order belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    LimitBid,
    LimitAsk,
    FloatingLimitBid,
    FloatingLimitAsk,
    MarketBid,
    MarketAsk,
    TriggerAbove,
    TriggerBelow,
}

fn destination_for(order: &Order) -> Destination {
    use crate::order::PositionDirection;

    if order.order_type.is_trigger_order() && !order.trigger_condition.is_triggered() {
        return match order.trigger_condition {
            OrderTriggerCondition::Above | OrderTriggerCondition::TriggeredAbove => {
                Destination::TriggerAbove
            }
            OrderTriggerCondition::Below | OrderTriggerCondition::TriggeredBelow => {
                Destination::TriggerBelow
            }
        };
    }

    let is_bid = order.direction == PositionDirection::Long;

    if order.order_type.is_market_order() {
        return if is_bid {
            Destination::MarketBid
        } else {
            Destination::MarketAsk
        };
    }
    if order.oracle_price_offset != 0 {
        return if is_bid {
            Destination::FloatingLimitBid
        } else {
            Destination::FloatingLimitAsk
        };
    }
    if is_bid {
        Destination::LimitBid
    } else {
        Destination::LimitAsk
    }
}

fn wrap(order: Order, user_account: Pubkey, destination: Destination) -> Node {
    let node = OrderNode::new(order, user_account);
    match destination {
        Destination::LimitBid | Destination::LimitAsk => Node::Limit(node),
        Destination::FloatingLimitBid | Destination::FloatingLimitAsk => Node::FloatingLimit(node),
        Destination::MarketBid | Destination::MarketAsk => Node::Market(node),
        Destination::TriggerAbove | Destination::TriggerBelow => Node::Trigger(node),
    }
}

impl MarketNodeLists {
    fn list_mut(&mut self, destination: Destination) -> &mut NodeList {
        match destination {
            Destination::LimitBid => &mut self.limit_bid,
            Destination::LimitAsk => &mut self.limit_ask,
            Destination::FloatingLimitBid => &mut self.floating_limit_bid,
            Destination::FloatingLimitAsk => &mut self.floating_limit_ask,
            Destination::MarketBid => &mut self.market_bid,
            Destination::MarketAsk => &mut self.market_ask,
            Destination::TriggerAbove => &mut self.trigger_above,
            Destination::TriggerBelow => &mut self.trigger_below,
        }
    }
}

/// Observer fired after a mutation commits.
pub type OnDone<'a> = Option<Box<dyn FnOnce(&Order, &Pubkey) + 'a>>;

/// The decentralized limit order book: a fixed set of markets, each with eight priority lists,
/// plus the dedup set that prevents the same order signature from ever appearing twice.
pub struct Dlob {
    markets: HashMap<i64, MarketNodeLists>,
    open_orders: HashSet<String>,
}

impl Dlob {
    /// Establishes the lists for each given market index. Markets cannot be added later.
    pub fn new(market_indexes: &[i64]) -> Self {
        let markets = market_indexes
            .iter()
            .map(|&idx| (idx, MarketNodeLists::new()))
            .collect();
        Self {
            markets,
            open_orders: HashSet::new(),
        }
    }

    fn market(&self, market_index: i64) -> DlobResult<&MarketNodeLists> {
        self.markets
            .get(&market_index)
            .ok_or(DlobError::UnknownMarket(market_index))
    }

    fn market_mut(&mut self, market_index: i64) -> DlobResult<&mut MarketNodeLists> {
        self.markets
            .get_mut(&market_index)
            .ok_or(DlobError::UnknownMarket(market_index))
    }

    /// Inserts `order` into whichever list `destination_for` routes it to. A `status == init`
    /// order is silently rejected; only `status == open` joins the dedup set.
    pub fn insert(
        &mut self,
        order: Order,
        user_account: Pubkey,
        on_done: OnDone<'_>,
    ) -> DlobResult<()> {
        if order.status == OrderStatus::Init {
            log::trace!("rejecting insert of init-status order {}", order.order_id);
            return Ok(());
        }

        let destination = destination_for(&order);
        let market = self.market_mut(order.market_index)?;
        let node = wrap(order, user_account, destination);
        market.list_mut(destination).insert(node, &user_account);

        if order.status == OrderStatus::Open {
            self.open_orders
                .insert(order_signature(order.order_id, &user_account));
        }

        if let Some(cb) = on_done {
            cb(&order, &user_account);
        }
        Ok(())
    }

    /// Removes `(order_id, user_account)` from its routed list and from the dedup set.
    /// Tolerates replayed removes of an order already absent.
    pub fn remove(
        &mut self,
        order: Order,
        user_account: Pubkey,
        on_done: OnDone<'_>,
    ) -> DlobResult<()> {
        let destination = destination_for(&order);
        let market = self.market_mut(order.market_index)?;
        market
            .list_mut(destination)
            .remove(order.order_id, &user_account);
        self.open_orders
            .remove(&order_signature(order.order_id, &user_account));

        if let Some(cb) = on_done {
            cb(&order, &user_account);
        }
        Ok(())
    }

    /// Forwards to the routed list's `update`, which replaces the order payload without
    /// repositioning the node (see `NodeList::update`'s docs).
    pub fn update(
        &mut self,
        order: Order,
        user_account: Pubkey,
        on_done: OnDone<'_>,
    ) -> DlobResult<()> {
        let destination = destination_for(&order);
        let market = self.market_mut(order.market_index)?;
        let node = wrap(order, user_account, destination);
        market.list_mut(destination).update(node, &user_account);

        if let Some(cb) = on_done {
            cb(&order, &user_account);
        }
        Ok(())
    }

    /// Migrates a trigger order that has just fired: removes it from the trigger list keyed by
    /// its *original* `trigger_condition`, then inserts it into the market/limit list its
    /// (already-flipped) `triggered` state now routes it to. The caller is responsible for
    /// flipping `order.trigger_condition` to `TriggeredAbove`/`TriggeredBelow` before calling
    /// this.
    pub fn trigger(
        &mut self,
        original_condition: OrderTriggerCondition,
        order: Order,
        user_account: Pubkey,
        on_done: OnDone<'_>,
    ) -> DlobResult<()> {
        let trigger_destination = match original_condition {
            OrderTriggerCondition::Above | OrderTriggerCondition::TriggeredAbove => {
                Destination::TriggerAbove
            }
            OrderTriggerCondition::Below | OrderTriggerCondition::TriggeredBelow => {
                Destination::TriggerBelow
            }
        };

        let market = self.market_mut(order.market_index)?;
        market
            .list_mut(trigger_destination)
            .remove(order.order_id, &user_account);

        let new_destination = destination_for(&order);
        let node = wrap(order, user_account, new_destination);
        market.list_mut(new_destination).insert(node, &user_account);

        if order.status == OrderStatus::Open {
            self.open_orders
                .insert(order_signature(order.order_id, &user_account));
        }

        if let Some(cb) = on_done {
            cb(&order, &user_account);
        }
        Ok(())
    }

    pub fn contains_open_order(&self, order_id: u32, user_account: &Pubkey) -> bool {
        self.open_orders
            .contains(&order_signature(order_id, user_account))
    }

    pub fn open_order_count(&self) -> usize {
        self.open_orders.len()
    }

    fn ask_sources<'a>(
        &'a self,
        market: &'a MarketNodeLists,
        v_ask: i128,
    ) -> Vec<Box<dyn Iterator<Item = Node> + 'a>> {
        vec![
            Box::new(market.limit_ask.iter().copied()),
            Box::new(market.floating_limit_ask.iter().copied()),
            Box::new(market.market_ask.iter().copied()),
            Box::new(std::iter::once(Node::Vamm(v_ask))),
        ]
    }

    fn bid_sources<'a>(
        &'a self,
        market: &'a MarketNodeLists,
        v_bid: i128,
    ) -> Vec<Box<dyn Iterator<Item = Node> + 'a>> {
        vec![
            Box::new(market.limit_bid.iter().copied()),
            Box::new(market.floating_limit_bid.iter().copied()),
            Box::new(market.market_bid.iter().copied()),
            Box::new(std::iter::once(Node::Vamm(v_bid))),
        ]
    }

    /// Lazy best-ask-first stream across limit, floating-limit, market, and vAMM asks.
    /// Materialized into a `Vec` so callers aren't tied to `self`'s borrow lifetime.
    pub fn get_asks(
        &self,
        market_index: i64,
        v_ask: i128,
        oracle: Option<OraclePriceData>,
        slot: u64,
    ) -> DlobResult<Vec<Node>> {
        let market = self.market(market_index)?;
        let sources = self.ask_sources(market, v_ask);
        crate::merge::MergeIter::new(sources, true, oracle, slot).collect_all()
    }

    /// Lazy best-bid-first stream, symmetric to [`Dlob::get_asks`].
    pub fn get_bids(
        &self,
        market_index: i64,
        v_bid: i128,
        oracle: Option<OraclePriceData>,
        slot: u64,
    ) -> DlobResult<Vec<Node>> {
        let market = self.market(market_index)?;
        let sources = self.bid_sources(market, v_bid);
        crate::merge::MergeIter::new(sources, false, oracle, slot).collect_all()
    }

    /// The price of the best ask, or an error only if a priced non-vAMM node needed oracle data
    /// that wasn't supplied. The vAMM source guarantees non-emptiness.
    pub fn get_best_ask(
        &self,
        market_index: i64,
        v_ask: i128,
        oracle: Option<OraclePriceData>,
        slot: u64,
    ) -> DlobResult<i128> {
        let market = self.market(market_index)?;
        let sources = self.ask_sources(market, v_ask);
        let mut iter = crate::merge::MergeIter::new(sources, true, oracle, slot);
        iter.peek_price()
            .expect("vAMM source guarantees a non-empty ask stream")
    }

    /// The price of the best bid, symmetric to [`Dlob::get_best_ask`].
    pub fn get_best_bid(
        &self,
        market_index: i64,
        v_bid: i128,
        oracle: Option<OraclePriceData>,
        slot: u64,
    ) -> DlobResult<i128> {
        let market = self.market(market_index)?;
        let sources = self.bid_sources(market, v_bid);
        let mut iter = crate::merge::MergeIter::new(sources, false, oracle, slot);
        iter.peek_price()
            .expect("vAMM source guarantees a non-empty bid stream")
    }

    pub fn get_market_bids(&self, market_index: i64) -> DlobResult<impl Iterator<Item = &Node> + '_> {
        Ok(self.market(market_index)?.market_bid.iter())
    }

    pub fn get_market_asks(&self, market_index: i64) -> DlobResult<impl Iterator<Item = &Node> + '_> {
        Ok(self.market(market_index)?.market_ask.iter())
    }

    /// Only the peer-to-peer crossings.
    pub fn find_crossing_nodes_to_fill(
        &self,
        market_index: i64,
        v_bid: i128,
        v_ask: i128,
        slot: u64,
        oracle: Option<OraclePriceData>,
    ) -> DlobResult<Vec<Fill>> {
        let market = self.market(market_index)?;
        let asks = crate::merge::MergeIter::new(self.ask_sources(market, v_ask), true, oracle, slot);
        let bids = crate::merge::MergeIter::new(self.bid_sources(market, v_bid), false, oracle, slot);
        find_crossing_nodes_to_fill(asks, bids, oracle.as_ref(), slot)
    }

    /// Only the market-orders-ready-for-the-vAMM fills.
    pub fn find_market_nodes_to_fill(&self, market_index: i64, slot: u64) -> DlobResult<Vec<Fill>> {
        let market = self.market(market_index)?;
        let mut fills = find_market_nodes_to_fill(market.market_bid.iter(), slot);
        fills.extend(find_market_nodes_to_fill(market.market_ask.iter(), slot));
        Ok(fills)
    }

    /// All fillable nodes: peer-to-peer crossings plus market orders ready against the vAMM.
    pub fn find_nodes_to_fill(
        &self,
        market_index: i64,
        v_bid: i128,
        v_ask: i128,
        slot: u64,
        oracle: Option<OraclePriceData>,
    ) -> DlobResult<Vec<Fill>> {
        let mut fills =
            self.find_crossing_nodes_to_fill(market_index, v_bid, v_ask, slot, oracle)?;
        fills.extend(self.find_market_nodes_to_fill(market_index, slot)?);
        Ok(fills)
    }

    /// Walks both trigger lists for `market_index` at the given oracle price.
    pub fn find_nodes_to_trigger(
        &self,
        market_index: i64,
        slot: u64,
        oracle_price: i128,
    ) -> DlobResult<Vec<TriggeredNode>> {
        let market = self.market(market_index)?;
        let mut triggered = find_triggered_above(market.trigger_above.iter(), oracle_price, slot);
        triggered.extend(find_triggered_below(
            market.trigger_below.iter(),
            oracle_price,
            slot,
        ));
        Ok(triggered)
    }
}
