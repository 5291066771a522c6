//! Linear auction-price interpolation for market orders.

use crate::order::Order;

/// True once `slot` has advanced past the order's full auction window.
pub fn is_auction_complete(order: &Order, slot: u64) -> bool {
    slot >= order.slot.saturating_add(order.auction_duration)
}

/// The order's current auction price at `slot`: a linear interpolation from
/// `auction_start_price` to `auction_end_price` over `[order.slot, order.slot +
/// auction_duration]`, clamped to the endpoints. Once the auction is complete this is just
/// `auction_end_price`.
pub fn auction_price(order: &Order, slot: u64) -> i128 {
    if is_auction_complete(order, slot) || order.auction_duration == 0 {
        return order.auction_end_price;
    }

    let elapsed = slot.saturating_sub(order.slot) as i128;
    let duration = order.auction_duration as i128;
    let delta = order.auction_end_price - order.auction_start_price;

    let interpolated = order.auction_start_price + (delta * elapsed) / duration;

    clamp(
        interpolated,
        order.auction_start_price.min(order.auction_end_price),
        order.auction_start_price.max(order.auction_end_price),
    )
}

fn clamp(value: i128, min: i128, max: i128) -> i128 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderType;

    fn auction_order(slot: u64, duration: u64, start: i128, end: i128) -> Order {
        Order {
            slot,
            auction_duration: duration,
            auction_start_price: start,
            auction_end_price: end,
            order_type: OrderType::Market,
            ..Order::default()
        }
    }

    #[test]
    fn interpolates_halfway() {
        let order = auction_order(100, 10, 0, 100);
        assert_eq!(auction_price(&order, 105), 50);
    }

    #[test]
    fn clamps_before_start() {
        let order = auction_order(100, 10, 0, 100);
        assert_eq!(auction_price(&order, 100), 0);
    }

    #[test]
    fn returns_end_price_once_complete() {
        let order = auction_order(100, 10, 0, 100);
        assert!(is_auction_complete(&order, 110));
        assert_eq!(auction_price(&order, 500), 100);
    }

    #[test]
    fn zero_duration_is_immediately_complete() {
        let order = auction_order(100, 0, 0, 100);
        assert!(is_auction_complete(&order, 100));
        assert_eq!(auction_price(&order, 100), 100);
    }
}
