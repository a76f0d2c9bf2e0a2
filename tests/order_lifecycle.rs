// Drives OrderLifecycleManager directly over the in-memory store.
mod common;

use common::*;
use std::sync::Arc;
use tokio::sync::Barrier;
use uuid::Uuid;

use artmarket_orders::domain::order::{OrderError, OrderStatus};
use artmarket_orders::identity::{Caller, Role};

#[tokio::test]
async fn cancellable_orders_are_cancelled_by_their_buyer() {
    let market = Marketplace::new();

    for status in OrderStatus::CANCELLABLE {
        let order = market.seed(status).await;
        let cancelled = market.manager.cancel_order(order.id, &market.buyer).await.unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        let cancelled_at = cancelled.cancelled_at.expect("cancelledAt set");
        assert_eq!(cancelled.updated_at, cancelled_at);
        assert!(cancelled_at >= order.created_at);

        // Nothing but status and timestamps changed.
        assert_eq!(cancelled.created_at, order.created_at);
        assert_eq!(cancelled.buyer_id, order.buyer_id);
        assert_eq!(cancelled.seller_id, order.seller_id);
        assert_eq!(cancelled.artwork_id, order.artwork_id);
        assert_eq!(cancelled.total, order.total);
        assert_eq!(market.stored(order.id).await, cancelled);
    }
}

#[tokio::test]
async fn non_cancellable_orders_are_refused_and_unchanged() {
    let market = Marketplace::new();

    for status in [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let order = market.seed(status).await;
        let result = market.manager.cancel_order(order.id, &market.buyer).await;

        match result {
            Err(OrderError::InvalidState(current)) => assert_eq!(current, status),
            other => panic!("status {status}: expected InvalidState, got {other:?}"),
        }
        assert_eq!(market.stored(order.id).await, order);
    }
}

#[tokio::test]
async fn only_the_buyer_may_cancel() {
    let market = Marketplace::new();
    let order = market.seed(OrderStatus::Confirmed).await;

    for caller in [market.other_buyer, market.seller, market.admin] {
        let result = market.manager.cancel_order(order.id, &caller).await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))), "caller {caller:?}");
    }
    assert_eq!(market.stored(order.id).await, order);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let market = Marketplace::new();
    let missing = Uuid::new_v4();

    assert!(matches!(
        market.manager.get_order(missing, &market.buyer).await,
        Err(OrderError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        market.manager.cancel_order(missing, &market.buyer).await,
        Err(OrderError::NotFound(id)) if id == missing
    ));
}

#[tokio::test]
async fn cancelling_twice_succeeds_once() {
    let market = Marketplace::new();
    let order = market.seed(OrderStatus::Processing).await;

    let first = market.manager.cancel_order(order.id, &market.buyer).await.unwrap();
    let second = market.manager.cancel_order(order.id, &market.buyer).await;

    assert!(matches!(second, Err(OrderError::InvalidState(OrderStatus::Cancelled))));
    assert_eq!(market.stored(order.id).await.cancelled_at, first.cancelled_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancellations_apply_exactly_once() {
    const TASKS: usize = 16;
    let market = Marketplace::new();
    let order_id = market.seed(OrderStatus::Confirmed).await.id;
    let start = Arc::new(Barrier::new(TASKS));

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let manager = Arc::clone(&market.manager);
        let start = Arc::clone(&start);
        let buyer = market.buyer;
        handles.push(tokio::spawn(async move {
            start.wait().await;
            manager.cancel_order(order_id, &buyer).await
        }));
    }

    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                assert_eq!(order.status, OrderStatus::Cancelled);
                applied += 1;
            }
            Err(OrderError::InvalidState(OrderStatus::Cancelled)) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn order_is_visible_to_buyer_and_seller_only() {
    let market = Marketplace::new();
    let order = market.seed(OrderStatus::Shipped).await;

    assert_eq!(market.manager.get_order(order.id, &market.buyer).await.unwrap(), order);
    assert_eq!(market.manager.get_order(order.id, &market.seller).await.unwrap(), order);

    for caller in [market.other_buyer, market.admin] {
        assert!(matches!(
            market.manager.get_order(order.id, &caller).await,
            Err(OrderError::Forbidden(_))
        ));
    }
}

#[tokio::test]
async fn stranger_is_refused_then_buyer_cancels_and_delivered_stays() {
    let market = Marketplace::new();

    let confirmed = market.seed(OrderStatus::Confirmed).await;
    assert!(matches!(
        market.manager.cancel_order(confirmed.id, &market.other_buyer).await,
        Err(OrderError::Forbidden(_))
    ));
    let cancelled = market.manager.cancel_order(confirmed.id, &market.buyer).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    let delivered = market.seed(OrderStatus::Delivered).await;
    let refused = market.manager.cancel_order(delivered.id, &market.buyer).await;
    assert!(matches!(refused, Err(OrderError::InvalidState(OrderStatus::Delivered))));
}

#[tokio::test]
async fn full_fulfilment_path_then_terminal() {
    let market = Marketplace::new();
    let mut request = market.checkout();
    request.payment_captured = false;

    let order = market.manager.place_order(&market.buyer, &request).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    for to in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let advanced = market.manager.advance_order(order.id, &market.seller, to).await.unwrap();
        assert_eq!(advanced.status, to);
        assert!(advanced.cancelled_at.is_none());
    }

    for to in OrderStatus::ALL {
        assert!(matches!(
            market.manager.advance_order(order.id, &market.admin, to).await,
            Err(OrderError::InvalidTransition { from: OrderStatus::Delivered, .. })
        ));
    }
    assert!(matches!(
        market.manager.cancel_order(order.id, &market.buyer).await,
        Err(OrderError::InvalidState(OrderStatus::Delivered))
    ));
}

#[tokio::test]
async fn admin_may_advance_but_buyer_may_not() {
    let market = Marketplace::new();
    let order = market.seed(OrderStatus::Confirmed).await;

    assert!(matches!(
        market.manager.advance_order(order.id, &market.buyer, OrderStatus::Processing).await,
        Err(OrderError::Forbidden(_))
    ));
    let advanced = market
        .manager
        .advance_order(order.id, &market.admin, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(advanced.status, OrderStatus::Processing);
}

#[tokio::test]
async fn placement_validates_totals_and_participants() {
    let market = Marketplace::new();

    let order = market.manager.place_order(&market.buyer, &market.checkout()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.buyer_id, market.buyer.user_id);
    assert_eq!(market.stored(order.id).await, order);

    let mut wrong_total = market.checkout();
    wrong_total.shipping = wrong_total.tax;
    assert!(matches!(
        market.manager.place_order(&market.buyer, &wrong_total).await,
        Err(OrderError::InvalidTotals { .. })
    ));

    let own_work = Caller::new(market.seller.user_id, Role::Buyer);
    assert!(matches!(
        market.manager.place_order(&own_work, &market.checkout()).await,
        Err(OrderError::SelfPurchase)
    ));
}

#[tokio::test]
async fn authentication_failures_are_unauthorized() {
    let market = Marketplace::new();

    assert_eq!(market.manager.authenticate(Some(BUYER_TOKEN)).unwrap(), market.buyer);
    assert!(matches!(market.manager.authenticate(None), Err(OrderError::Unauthorized(_))));
    assert!(matches!(
        market.manager.authenticate(Some("stolen")),
        Err(OrderError::Unauthorized(_))
    ));
}
