mod common;

use bils::application::engine::{ActionOutcome, IncomingRequest};
use bils::application::state::{Mutation, StoreEvent};
use bils::domain::money::{Amount, Money};
use bils::domain::notification::{CategoryTag, NotificationActionKind, NotificationEvent};
use bils::domain::payment::{Payment, PaymentCategory, SplitStatus};
use bils::domain::split_request::{HistoryFilter, SplitDirection, SplitRequestStatus};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_writers_are_serialized() {
    let (engine, _) = common::engine();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _sub = engine.subscribe(move |e| sink.lock().push(e.clone()));

    let mut handles = Vec::new();
    for task in 0..10 {
        let sender = engine.queue_sender();
        handles.push(tokio::spawn(async move {
            for i in 0..20 {
                let amount = Amount::new(Decimal::from(task * 100 + i + 1)).unwrap();
                let payment = Payment::new(format!("Shop {task}-{i}"), amount, PaymentCategory::Other);
                sender.commit(Mutation::AddPayment(payment)).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let payments = engine.payments().await.unwrap();
    assert_eq!(payments.len(), 200);
    assert_eq!(events.lock().len(), 200);

    // The store is newest first, so it mirrors the event order reversed.
    let added: Vec<_> = events
        .lock()
        .iter()
        .filter_map(|e| match e {
            StoreEvent::PaymentAdded(id) => Some(*id),
            _ => None,
        })
        .collect();
    let stored: Vec<_> = payments.iter().rev().map(|p| p.id).collect();
    assert_eq!(added, stored);

    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_payment_to_resolved_history() {
    let (engine, scheduler) = common::engine();
    let presets = engine.presets().await.unwrap();
    assert_eq!(presets.len(), 2);

    let payment = engine
        .log_payment("Mojo East", dec!(61.70), PaymentCategory::Restaurant)
        .await
        .unwrap();
    let preview = engine.preview_even_split(payment.id, 2).await.unwrap();
    assert_eq!(preview.your_share, Money::new(dec!(20.56)));
    assert_eq!(preview.other_share, Money::new(dec!(20.57)));

    let ids: Vec<_> = presets.iter().map(|p| p.id).collect();
    let request = engine.split_evenly(payment.id, &ids, "dinner").await.unwrap();
    assert_eq!(request.title(), "To 2 people");
    assert_eq!(engine.history(HistoryFilter::Unresolved).await.unwrap().len(), 1);

    engine.mark_resolved(request.id).await.unwrap();
    let resolved = engine.history(HistoryFilter::Resolved).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].status, SplitRequestStatus::Resolved);
    assert_eq!(
        engine.payment(payment.id).await.unwrap().split_status,
        SplitStatus::SplitEvenly
    );

    let titles: Vec<_> = scheduler.scheduled().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Split this bill?"]);
}

#[tokio::test]
async fn test_incoming_and_outgoing_share_history() {
    let (engine, _) = common::engine();
    let sam = engine.presets().await.unwrap().remove(1);

    let incoming = engine
        .receive_incoming_request(IncomingRequest {
            from: sam.id,
            merchant: "Groceries Co".to_string(),
            total: dec!(25.00),
            amount_owed: dec!(12.50),
            note: String::new(),
        })
        .await
        .unwrap();
    let payment = engine
        .log_payment("Blue Bottle Coffee", dec!(8.44), PaymentCategory::Restaurant)
        .await
        .unwrap();
    let outcome = engine
        .handle_action(NotificationEvent::new(
            CategoryTag::PaymentSplit,
            payment.id.as_uuid(),
            NotificationActionKind::PresetQuickSplit(0),
        ))
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::QuickSplitSent { .. }));

    let open = engine.history(HistoryFilter::Unresolved).await.unwrap();
    let directions: Vec<_> = open.iter().map(|r| r.direction).collect();
    assert_eq!(directions, vec![SplitDirection::Outgoing, SplitDirection::Incoming]);
    assert_eq!(open[1].id, incoming.id);
    assert_eq!(open[1].title(), "From Sam");
}
