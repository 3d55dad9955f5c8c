//! One worked exchange adapter (spec.md §6): a `demo_exchange` with a
//! trivial JSON wire format, proving that the capability set
//! (`subscribe_orderbook`/`subscribe_balance`/`subscribe_position`/
//! `subscribe_orders`/`limit_order`/`market_order`/`cancel_order`) is
//! satisfiable against `engine`'s `register`/`send`. Not a production
//! exchange integration — see SPEC_FULL.md's non-goals.

use std::rc::Rc;

use engine::{Extractor, StrategyCtx, TransportError};
use host::{Method, Request};
use rust_decimal::Decimal;
use types::{Order, OrderSet};

pub const DEFAULT_POLL_MS: u64 = 1000;

fn base_url(base: &str, path: &str) -> String { format!("{}/{}", base.trim_end_matches('/'), path) }

/// Registers an order-book poll for `market` (spec.md §6's market grammar
/// via [`crate::market::MarketId`]).
pub async fn subscribe_orderbook(
    ctx: &Rc<StrategyCtx>,
    base: &str,
    market: &crate::market::MarketId,
) -> host::Result<Extractor<types::OrderBook>> {
    let url = base_url(base, &format!("orderbook/{}", market.symbol()));
    ctx.register(Request::get(url), DEFAULT_POLL_MS, |body: &str| {
        serde_json::from_str::<types::OrderBook>(body).map_err(Into::into)
    })
    .await
}

/// Registers an account-balance poll.
pub async fn subscribe_balance(ctx: &Rc<StrategyCtx>, base: &str) -> host::Result<Extractor<types::Balance>> {
    let url = base_url(base, "balance");
    ctx.register(Request::get(url), DEFAULT_POLL_MS, |body: &str| {
        serde_json::from_str::<types::Balance>(body).map_err(Into::into)
    })
    .await
}

/// Registers a position poll. Optional at the platform level (spec.md §6
/// marks `subscribe_position` with a `?`) — spot-only strategies have no
/// use for it, so callers simply don't call this function rather than the
/// engine tracking "enabled capabilities" anywhere.
pub async fn subscribe_position(ctx: &Rc<StrategyCtx>, base: &str) -> host::Result<Extractor<types::Position>> {
    let url = base_url(base, "position");
    ctx.register(Request::get(url), DEFAULT_POLL_MS, |body: &str| {
        serde_json::from_str::<types::Position>(body).map_err(Into::into)
    })
    .await
}

/// Registers an open-orders poll.
pub async fn subscribe_orders(ctx: &Rc<StrategyCtx>, base: &str) -> host::Result<Extractor<OrderSet>> {
    let url = base_url(base, "orders");
    ctx.register(Request::get(url), DEFAULT_POLL_MS, |body: &str| {
        let orders: Vec<Order> = serde_json::from_str(body)?;
        Ok(OrderSet::new(orders))
    })
    .await
}

/// Places a limit order. `amount`'s sign is the canonical buy/sell
/// indicator (spec.md §6 open-question resolution: side is read from the
/// amount, never assigned independently beforehand).
pub async fn limit_order(
    ctx: &Rc<StrategyCtx>,
    base: &str,
    market: &crate::market::MarketId,
    price: Decimal,
    amount: Decimal,
) -> Result<Order, TransportError> {
    let body = serde_json::json!({
        "symbol": market.symbol(),
        "price": price,
        "amount": amount,
        "kind": "limit",
    });
    place_order(ctx, base, body).await
}

/// Places a market order (no `price`).
pub async fn market_order(
    ctx: &Rc<StrategyCtx>,
    base: &str,
    market: &crate::market::MarketId,
    amount: Decimal,
) -> Result<Order, TransportError> {
    let body = serde_json::json!({
        "symbol": market.symbol(),
        "amount": amount,
        "kind": "market",
    });
    place_order(ctx, base, body).await
}

async fn place_order(ctx: &Rc<StrategyCtx>, base: &str, body: serde_json::Value) -> Result<Order, TransportError> {
    let request = Request {
        url: base_url(base, "orders"),
        method: Method::Post,
        body: Some(body.to_string()),
        headers: Default::default(),
        sign: Some(host::SignRequest::Default(true)),
        env_suffix: None,
        primary_only: false,
    };
    let content = ctx.send(request).await?;
    serde_json::from_str(&content).map_err(|err| TransportError {
        url: base_url(base, "orders"),
        status: 200,
        content: err.to_string(),
        kind: engine::TransportErrorKind::Other,
    })
}

/// Cancels an open order by id.
pub async fn cancel_order(ctx: &Rc<StrategyCtx>, base: &str, id: &str) -> Result<(), TransportError> {
    let request = Request {
        url: base_url(base, &format!("orders/{id}")),
        method: Method::Delete,
        body: None,
        headers: Default::default(),
        sign: Some(host::SignRequest::Default(true)),
        env_suffix: None,
        primary_only: false,
    };
    ctx.send(request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use host::event::SendResponse;
    use host::{Event, MockHost};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::market::MarketId;

    fn ctx(host: Arc<MockHost>) -> Rc<StrategyCtx> { Rc::new(StrategyCtx::new("demo", host)) }

    #[tokio::test]
    async fn subscribe_orderbook_registers_and_subscribes() {
        let host = Arc::new(MockHost::new(["demo"]));
        let c = ctx(host.clone());
        let market: MarketId = "spot:BTC/USDT".parse().unwrap();
        let extractor = subscribe_orderbook(&c, "https://x", &market).await.unwrap();
        assert_eq!(host.subscriptions().len(), 1);
        assert_eq!(host.subscriptions()[0].0.url, "https://x/orderbook/BTCUSDT");
        assert_eq!(extractor.id(), 1);
    }

    #[tokio::test]
    async fn limit_order_round_trips_through_send() {
        let host = Arc::new(MockHost::new(["demo"]));
        let c = ctx(host.clone());
        let market: MarketId = "spot:BTC/USDT".parse().unwrap();

        let local = tokio::task::LocalSet::new();
        let c2 = c.clone();
        let order_fut =
            local.spawn_local(async move { limit_order(&c2, "https://x", &market, dec!(100), dec!(1)).await });

        local
            .run_until(async {
                tokio::task::yield_now().await;
                let (token, req) = host.sent_requests().into_iter().next().unwrap();
                assert_eq!(req.url, "https://x/orders");
                c.try_resume(&Event::SendResponse(SendResponse {
                    token,
                    content: r#"{"id":"42","price":"100","amount":"1","kind":"limit"}"#.to_string(),
                    status: 200,
                    error: false,
                }));
                let order = order_fut.await.unwrap().unwrap();
                assert_eq!(order.id, "42");
                assert_eq!(order.side(), types::order::Side::Buy);
            })
            .await;
    }
}
