//! Property tests for pricing and lifecycle invariants.
//!
//! Uses proptest to verify:
//! 1. Target and stop-loss formulas bracket the buy price
//! 2. Profit percent is antisymmetric in buy and sell
//! 3. Price extremes only widen
//! 4. A signal without a stop-loss is never stop-sold
//! 5. Terminal statuses accept no events

use chrono::Utc;
use proptest::prelude::*;
use signalbot_core::domain::{
    Execution, OrderId, Signal, SignalEvent, SignalId, SignalStatus,
};
use signalbot_core::pricing::{
    adjusted_sell_price, profit_percent, profit_quote, stop_loss_price, target_price, PriceLevels,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (0.000_001..100_000.0_f64).prop_map(|p| (p * 1e8).round() / 1e8 + 1e-8)
}

fn arb_pct() -> impl Strategy<Value = f64> {
    (0.1..99.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_status() -> impl Strategy<Value = SignalStatus> {
    prop_oneof![
        Just(SignalStatus::PendingBuy),
        Just(SignalStatus::BuyOrderOpen),
        Just(SignalStatus::Held),
        Just(SignalStatus::SellOrderOpen),
        Just(SignalStatus::Closed),
        Just(SignalStatus::Cancelled),
    ]
}

fn arb_event() -> impl Strategy<Value = SignalEvent> {
    prop_oneof![
        Just(SignalEvent::BuyPlaced),
        Just(SignalEvent::BuyFilled),
        Just(SignalEvent::SellPlaced),
        Just(SignalEvent::SellFilled),
        Just(SignalEvent::OrderCancelled),
    ]
}

fn held(buy_price: f64, quantity: f64) -> Signal {
    let mut s = Signal::new(SignalId(1), "BTC-ETH", "ETH", buy_price * quantity, 1);
    s.status = SignalStatus::Held;
    s.quantity = quantity;
    s.buy = Some(Execution {
        price: buy_price,
        order_id: OrderId::demo(),
        commission: 0.0,
        executed_at: Utc::now(),
    });
    s
}

// ── 1. Level formulas ────────────────────────────────────────────────

proptest! {
    #[test]
    fn percent_target_sits_above_buy(buy in arb_price(), pct in arb_pct()) {
        let mut s = held(buy, 1.0);
        s.win_percent = Some(pct);
        let target = target_price(&s).unwrap();
        prop_assert!(target > buy);
        prop_assert!((target - buy * (1.0 + pct / 100.0)).abs() <= buy * 1e-12);
    }

    #[test]
    fn percent_stop_sits_below_buy(buy in arb_price(), pct in arb_pct(), current in arb_price()) {
        let mut s = held(buy, 1.0);
        s.stop_loss_percent = Some(pct);
        let stop = stop_loss_price(&s, current);
        prop_assert!(stop < buy);
        prop_assert!(stop > 0.0);
    }

    #[test]
    fn adjusted_sell_never_exceeds_current(current in arb_price(), pct in 0.0..10.0_f64) {
        prop_assert!(adjusted_sell_price(current, pct) <= current);
    }
}

// ── 2. Profit symmetry ───────────────────────────────────────────────

proptest! {
    #[test]
    fn profit_percent_is_antisymmetric(a in arb_price(), b in arb_price()) {
        let forward = profit_percent(a, b);
        let backward = profit_percent(b, a);
        prop_assert!((forward + backward).abs() <= 1e-9 * forward.abs().max(1.0));
    }

    #[test]
    fn profit_signs_agree(buy in arb_price(), sell in arb_price(), qty in 0.001..1000.0_f64) {
        let quote = profit_quote(buy, sell, qty);
        let pct = profit_percent(buy, sell);
        if sell > buy {
            prop_assert!(quote > 0.0 && pct > 0.0);
        } else if sell < buy {
            prop_assert!(quote < 0.0 && pct < 0.0);
        }
        prop_assert!(pct.abs() <= 200.0);
    }
}

// ── 3. Extremes ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn extremes_only_widen(prices in prop::collection::vec(arb_price(), 1..40)) {
        let mut s = held(1.0, 1.0);
        let mut previous: Option<(f64, f64)> = None;
        for price in &prices {
            s.observe_price(*price);
            let high = s.highest_price.unwrap();
            let low = s.lowest_price.unwrap();
            prop_assert!(low <= *price && *price <= high);
            if let Some((prev_high, prev_low)) = previous {
                prop_assert!(high >= prev_high);
                prop_assert!(low <= prev_low);
            }
            previous = Some((high, low));
        }
        let max = prices.iter().cloned().fold(f64::MIN, f64::max);
        let min = prices.iter().cloned().fold(f64::MAX, f64::min);
        prop_assert_eq!(s.highest_price, Some(max));
        prop_assert_eq!(s.lowest_price, Some(min));
        prop_assert_eq!(s.current_price, prices.last().copied());
    }
}

// ── 4. Disabled stop-loss ────────────────────────────────────────────

proptest! {
    #[test]
    fn no_stop_loss_never_triggers(buy in arb_price(), current in arb_price()) {
        let s = held(buy, 1.0);
        let levels = PriceLevels::compute(&s, current);
        prop_assert_eq!(levels.stop_loss, 0.0);
        prop_assert!(!levels.stop_loss_reached());
    }
}

// ── 5. Transition table ──────────────────────────────────────────────

proptest! {
    #[test]
    fn terminal_statuses_reject_everything(status in arb_status(), event in arb_event()) {
        let result = status.apply(event);
        if status.is_terminal() {
            prop_assert!(result.is_err());
        }
        if let Ok(next) = result {
            prop_assert_ne!(next, status);
            prop_assert!(next.code() > status.code() || next == SignalStatus::Cancelled);
        }
    }
}
