//! `DlobNode` variants: the book's unit of priced liquidity.
//!
//! The node set is closed into a single `enum` rather than `Arc<dyn DlobNode>`: there are
//! exactly five kinds and nothing downstream ever needs to add a sixth.

use solana_sdk::pubkey::Pubkey;

use crate::auction::auction_price;
use crate::error::{DlobError, DlobResult};
use crate::order::{Order, OraclePriceData};

/// A resting user order, paired with the account that placed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderNode {
    pub order: Order,
    pub user_account: Pubkey,
}

impl OrderNode {
    pub fn new(order: Order, user_account: Pubkey) -> Self {
        Self {
            order,
            user_account,
        }
    }
}

/// The five node kinds the book ever holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Limit(OrderNode),
    FloatingLimit(OrderNode),
    Market(OrderNode),
    Trigger(OrderNode),
    /// A synthetic single-element stream at the caller-supplied vAMM quote. Carries no order
    /// and no user account.
    Vamm(i128),
}

/// Shared behavior across all five node kinds.
pub trait DlobNode {
    /// The node's price at `(oracle, slot)`. Fails with `MissingOracle` for a floating-limit
    /// node when `oracle` is `None`.
    fn get_price(&self, oracle: Option<&OraclePriceData>, slot: u64) -> DlobResult<i128>;
    fn is_vamm_node(&self) -> bool;
    fn order(&self) -> Option<&Order>;
    fn user_account(&self) -> Option<&Pubkey>;
}

impl DlobNode for Node {
    fn get_price(&self, oracle: Option<&OraclePriceData>, slot: u64) -> DlobResult<i128> {
        match self {
            Node::Limit(n) => Ok(n.order.price),
            Node::FloatingLimit(n) => {
                let oracle = oracle.ok_or(DlobError::MissingOracle)?;
                Ok(oracle.price + n.order.oracle_price_offset)
            }
            Node::Market(n) => Ok(auction_price(&n.order, slot)),
            Node::Trigger(n) => Ok(n.order.trigger_price),
            Node::Vamm(price) => Ok(*price),
        }
    }

    fn is_vamm_node(&self) -> bool {
        matches!(self, Node::Vamm(_))
    }

    fn order(&self) -> Option<&Order> {
        match self {
            Node::Limit(n) | Node::FloatingLimit(n) | Node::Market(n) | Node::Trigger(n) => {
                Some(&n.order)
            }
            Node::Vamm(_) => None,
        }
    }

    fn user_account(&self) -> Option<&Pubkey> {
        match self {
            Node::Limit(n) | Node::FloatingLimit(n) | Node::Market(n) | Node::Trigger(n) => {
                Some(&n.user_account)
            }
            Node::Vamm(_) => None,
        }
    }
}

impl Node {
    /// The order-signature-stable sort key used by `NodeList` to position this node: `order.price`
    /// for limit nodes, `oracle_price_offset` for floating-limit nodes, `slot` for market nodes,
    /// and `trigger_price` for trigger nodes. Never evaluated for a vAMM node (which never lives
    /// in a `NodeList`).
    pub(crate) fn sort_key(&self) -> i128 {
        match self {
            Node::Limit(n) => n.order.price,
            Node::FloatingLimit(n) => n.order.oracle_price_offset,
            Node::Market(n) => n.order.slot as i128,
            Node::Trigger(n) => n.order.trigger_price,
            Node::Vamm(price) => *price,
        }
    }

    pub(crate) fn slot(&self) -> u64 {
        self.order().map(|o| o.slot).unwrap_or(0)
    }
}
