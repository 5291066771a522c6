//! The `Order` record and its companion enums.
//!
//! Shaped after the on-chain `Order` account a perpetual-futures program emits, but owned
//! locally: decoding the real wire format into this struct is the filler agent's job, not the
//! core's (see the crate-level docs).

use solana_sdk::pubkey::Pubkey;

/// Whether an order is still live, or how it left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Not yet placed; never inserted into the book.
    Init,
    Open,
    Filled,
    Cancelled,
}

/// The four order flavors the book understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Market,
    Limit,
    TriggerMarket,
    TriggerLimit,
}

impl OrderType {
    pub fn is_market_order(self) -> bool {
        matches!(self, OrderType::Market | OrderType::TriggerMarket)
    }

    pub fn is_trigger_order(self) -> bool {
        matches!(self, OrderType::TriggerMarket | OrderType::TriggerLimit)
    }
}

/// Long orders sit in the bid book, short orders sit in the ask book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionDirection {
    Long,
    Short,
}

/// Encodes both which way a trigger order fires, and whether it already has.
///
/// `Above`/`Below` are the pending states (the order still lives in a trigger list);
/// `TriggeredAbove`/`TriggeredBelow` mean the oracle has already crossed the threshold and the
/// order has migrated into the market/limit book. This mirrors the upstream encoding directly
/// rather than carrying a separate `triggered: bool` alongside a two-valued condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderTriggerCondition {
    Above,
    Below,
    TriggeredAbove,
    TriggeredBelow,
}

impl OrderTriggerCondition {
    pub fn is_triggered(self) -> bool {
        matches!(
            self,
            OrderTriggerCondition::TriggeredAbove | OrderTriggerCondition::TriggeredBelow
        )
    }
}

/// A user order as consumed (read-only, except via `DLOB::update`) by the matching core.
///
/// Price-bearing fields (`price`, `oracle_price_offset`, `trigger_price`, `auction_start_price`,
/// `auction_end_price`) are scaled 128-bit integers, per the core's external-interface contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub order_id: u32,
    pub market_index: i64,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub direction: PositionDirection,
    pub trigger_condition: OrderTriggerCondition,
    pub price: i128,
    pub oracle_price_offset: i128,
    pub trigger_price: i128,
    /// The slot the order was placed at. Doubles as the auction-curve origin and as the
    /// time-priority tiebreak key (`ts`).
    pub slot: u64,
    pub post_only: bool,
    pub auction_duration: u64,
    pub auction_start_price: i128,
    pub auction_end_price: i128,
    /// Carried for fidelity with the upstream record; the matching core never reads these.
    pub base_asset_amount: u64,
    pub base_asset_amount_filled: u64,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_id: 0,
            market_index: 0,
            order_type: OrderType::Limit,
            status: OrderStatus::Init,
            direction: PositionDirection::Long,
            trigger_condition: OrderTriggerCondition::Above,
            price: 0,
            oracle_price_offset: 0,
            trigger_price: 0,
            slot: 0,
            post_only: false,
            auction_duration: 0,
            auction_start_price: 0,
            auction_end_price: 0,
            base_asset_amount: 0,
            base_asset_amount_filled: 0,
        }
    }
}

impl Order {
    pub fn is_limit_order(&self) -> bool {
        matches!(self.order_type, OrderType::Limit | OrderType::TriggerLimit)
    }
}

/// A deterministic fingerprint of `(userAccount, order.orderId)`, unique across the whole book.
pub fn order_signature(order_id: u32, user_account: &Pubkey) -> String {
    format!("{user_account}-{order_id}")
}

/// The oracle price feed supplied by the caller on every read. `price` is the scaled reference
/// price; the rest mirror the upstream oracle account shape for fidelity but are unused by the
/// matching core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePriceData {
    pub price: i128,
    pub confidence: u128,
    pub delay: i64,
    pub has_sufficient_number_of_data_points: bool,
}

impl OraclePriceData {
    pub fn new(price: i128) -> Self {
        Self {
            price,
            confidence: 0,
            delay: 0,
            has_sufficient_number_of_data_points: true,
        }
    }
}
