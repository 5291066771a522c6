//! `NodeList`: an ordered sequence of nodes for one `(market, class, side)`.
//!
//! Backed by a `BTreeMap` keyed on a class-specific sort key plus a signature index for
//! dedup and O(log n) removal by identity.

use std::collections::{BTreeMap, HashMap};

use solana_sdk::pubkey::Pubkey;

use crate::node::Node;
use crate::order::order_signature;

/// Fixed at construction: ascending lists yield lowest-key-first (asks, and always market
/// lists); descending lists yield highest-key-first (bids, and trigger-below lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// `(rank, ts, seq)`. `rank` is the node's class-specific sort key, sign-flipped at insertion
/// time for descending lists so a plain `BTreeMap` ascending traversal does the right thing for
/// both sides. `ts` and `seq` are never flipped: earlier `ts` always wins a tie, and within
/// equal `ts` insertion order always wins, regardless of which side of the book this is.
type Key = (i128, u64, u64);

/// An ordered, deduplicated sequence of nodes for one `(market, class, side)` slot.
#[derive(Debug, Clone)]
pub struct NodeList {
    direction: SortDirection,
    entries: BTreeMap<Key, Node>,
    index: HashMap<String, Key>,
    next_seq: u64,
}

impl NodeList {
    pub fn new(direction: SortDirection) -> Self {
        Self {
            direction,
            entries: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }

    fn rank(&self, sort_key: i128) -> i128 {
        match self.direction {
            SortDirection::Ascending => sort_key,
            SortDirection::Descending => -sort_key,
        }
    }

    /// Inserts `node` under `user_account`'s identity, preserving sort order.
    ///
    /// A repeat insert of an already-present `(user, orderId)` signature is a silent no-op rather
    /// than a double-insert or a panic.
    pub fn insert(&mut self, node: Node, user_account: &Pubkey) {
        let Some(order) = node.order() else {
            return;
        };
        let sig = order_signature(order.order_id, user_account);
        if self.index.contains_key(&sig) {
            log::warn!("duplicate insert for order signature {sig}, ignoring");
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let key = (self.rank(node.sort_key()), node.slot(), seq);

        self.index.insert(sig, key);
        self.entries.insert(key, node);
    }

    /// Removes the node for `(order_id, user_account)`. Silently no-ops if absent, which makes
    /// replayed remove events safe.
    pub fn remove(&mut self, order_id: u32, user_account: &Pubkey) {
        let sig = order_signature(order_id, user_account);
        if let Some(key) = self.index.remove(&sig) {
            self.entries.remove(&key);
        } else {
            log::trace!("remove of absent order signature {sig}, ignoring");
        }
    }

    /// Replaces the order payload for `(order_id, user_account)` without repositioning it, even
    /// if a sort-key-bearing field like `order.price` changed. Callers that need a position
    /// change should `remove` then `insert` instead. No-ops if the signature isn't present.
    pub fn update(&mut self, node: Node, user_account: &Pubkey) {
        let Some(order) = node.order() else {
            return;
        };
        let sig = order_signature(order.order_id, user_account);
        if let Some(key) = self.index.get(&sig).copied() {
            self.entries.insert(key, node);
        }
    }

    pub fn contains(&self, order_id: u32, user_account: &Pubkey) -> bool {
        self.index.contains_key(&order_signature(order_id, user_account))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// A fresh, forward, priority-ordered iterator (best node first). Not restartable; callers
    /// obtain a new one on every call.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.entries.values()
    }

    /// The first node in priority order, if any. O(log n) via `BTreeMap`, but effectively O(1)
    /// in practice for the shallow trees a live order book produces.
    pub fn head(&self) -> Option<&Node> {
        self.entries.values().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::OrderNode;
    use crate::order::Order;

    fn limit(order_id: u32, slot: u64, price: i128) -> Node {
        Node::Limit(OrderNode::new(
            Order {
                order_id,
                slot,
                price,
                ..Order::default()
            },
            Pubkey::new_unique(),
        ))
    }

    #[test]
    fn ascending_list_yields_lowest_price_first() {
        let mut list = NodeList::new(SortDirection::Ascending);
        let user = Pubkey::new_unique();
        list.insert(
            Node::Limit(OrderNode::new(
                Order {
                    order_id: 1,
                    price: 110,
                    ..Order::default()
                },
                user,
            )),
            &user,
        );
        list.insert(
            Node::Limit(OrderNode::new(
                Order {
                    order_id: 2,
                    price: 90,
                    ..Order::default()
                },
                user,
            )),
            &user,
        );

        let prices: Vec<i128> = list.iter().map(|n| n.sort_key()).collect();
        assert_eq!(prices, vec![90, 110]);
    }

    #[test]
    fn descending_list_yields_highest_price_first() {
        let mut list = NodeList::new(SortDirection::Descending);
        let user = Pubkey::new_unique();
        list.insert(
            Node::Limit(OrderNode::new(
                Order {
                    order_id: 1,
                    price: 110,
                    ..Order::default()
                },
                user,
            )),
            &user,
        );
        list.insert(
            Node::Limit(OrderNode::new(
                Order {
                    order_id: 2,
                    price: 90,
                    ..Order::default()
                },
                user,
            )),
            &user,
        );

        let prices: Vec<i128> = list.iter().map(|n| n.sort_key()).collect();
        assert_eq!(prices, vec![110, 90]);
    }

    #[test]
    fn tie_break_is_earlier_slot_then_insertion_order() {
        let mut list = NodeList::new(SortDirection::Ascending);
        let user = Pubkey::new_unique();
        list.insert(limit(1, 5, 100), &user);
        list.insert(limit(2, 3, 100), &user);
        list.insert(limit(3, 3, 100), &user);

        let ids: Vec<u32> = list
            .iter()
            .map(|n| n.order().unwrap().order_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut list = NodeList::new(SortDirection::Ascending);
        let user = Pubkey::new_unique();
        list.insert(limit(1, 1, 100), &user);
        list.insert(limit(1, 1, 200), &user);
        assert_eq!(list.len(), 1);
        assert_eq!(list.head().unwrap().sort_key(), 100);
    }

    #[test]
    fn remove_of_absent_is_a_no_op() {
        let mut list = NodeList::new(SortDirection::Ascending);
        let user = Pubkey::new_unique();
        list.remove(42, &user);
        assert!(list.is_empty());
    }

    #[test]
    fn update_does_not_reposition() {
        let mut list = NodeList::new(SortDirection::Ascending);
        let user = Pubkey::new_unique();
        list.insert(limit(1, 1, 100), &user);
        list.update(limit(1, 1, 999), &user);

        assert_eq!(list.len(), 1);
        // the key (and thus position) still reflects the original price, not 999
        let key = *list.index.get(&order_signature(1, &user)).unwrap();
        assert_eq!(key.0, 100);
        // but the stored payload reflects the update
        assert_eq!(list.head().unwrap().order().unwrap().price, 999);
    }
}
