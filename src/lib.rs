//! In-memory decentralized limit order book (DLOB) matching core for a perpetual-futures order
//! filler agent.
//!
//! This crate owns the book itself: merging fixed-price limit, oracle-offset floating-limit,
//! auction-priced market, and synthetic vAMM liquidity into deterministic best-ask/best-bid
//! streams, assigning maker/taker on crossings, and scanning trigger orders. It does not talk to
//! a chain: RPC, signing, transaction construction, account decoding, and configuration loading
//! are the calling agent's job.

pub mod auction;
pub mod dlob;
pub mod error;
pub mod matching;
pub mod merge;
pub mod node;
pub mod node_list;
pub mod order;
pub mod trigger;

pub use dlob::{Dlob, OnDone};
pub use error::{DlobError, DlobResult};
pub use matching::{Fill, MAX_FILLS_PER_CALL};
pub use merge::MergeIter;
pub use node::{DlobNode, Node, OrderNode};
pub use node_list::{NodeList, SortDirection};
pub use order::{
    order_signature, OraclePriceData, Order, OrderStatus, OrderTriggerCondition, OrderType,
    PositionDirection,
};
pub use trigger::TriggeredNode;
