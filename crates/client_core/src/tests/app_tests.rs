use std::sync::Arc;

use super::*;
use crate::{
    fakes::{create_result, services, FakeReader, FakeSigner, FakeWaiter, COUNTER_ID, PACKAGE_ID},
    ActionOutcome,
};

fn app_with(
    location: &str,
    account: Option<&str>,
    waiter: FakeWaiter,
    reader: FakeReader,
) -> (CounterApp, Arc<FakeSigner>) {
    let signer = Arc::new(FakeSigner::ok());
    let services = services(signer.clone(), Arc::new(waiter), Arc::new(reader), account);
    (CounterApp::new(services, PACKAGE_ID, location), signer)
}

#[tokio::test]
async fn no_account_shows_connect_screen() {
    let (mut app, _signer) = app_with(
        &format!("#{COUNTER_ID}"),
        None,
        FakeWaiter::confirmed(),
        FakeReader::counter(5, "0xAAA"),
    );

    assert_eq!(app.refresh_account().await, None);
    assert_eq!(app.screen(), Screen::ConnectWallet);
    assert!(app.render().contains("connect your wallet"));
}

#[tokio::test]
async fn valid_fragment_goes_straight_to_counter() {
    let (mut app, signer) = app_with(
        &format!("#{COUNTER_ID}"),
        Some("0xAAA"),
        FakeWaiter::confirmed(),
        FakeReader::counter(5, "0xAAA"),
    );
    app.refresh_account().await;

    assert_eq!(app.screen(), Screen::Counter(ObjectId::new(COUNTER_ID)));
    assert_eq!(signer.call_count().await, 0);
}

#[tokio::test]
async fn invalid_fragment_offers_create_then_adopts_created_counter() {
    let waiter = FakeWaiter::returning(create_result(None, Some("0xOBJ1"), None));
    let (mut app, signer) = app_with(
        "#0xINVALID",
        Some("0xAAA"),
        waiter,
        FakeReader::counter(0, "0xAAA"),
    );
    app.refresh_account().await;

    assert_eq!(app.screen(), Screen::CreateCounter);
    assert!(app.dispatcher().is_none());

    let created = app.create_counter().await.expect("create");

    assert_eq!(created, ObjectId::new("0xOBJ1"));
    assert_eq!(app.counter_id(), Some(&ObjectId::new("0xOBJ1")));
    assert_eq!(app.location(), "#0xOBJ1");
    assert_eq!(app.screen(), Screen::Counter(ObjectId::new("0xOBJ1")));
    assert_eq!(signer.call_count().await, 1);
}

#[tokio::test]
async fn failed_create_keeps_create_screen() {
    let (mut app, _signer) = app_with(
        "",
        Some("0xAAA"),
        FakeWaiter::returning(create_result(None, None, None)),
        FakeReader::counter(0, "0xAAA"),
    );
    app.refresh_account().await;

    let err = app.create_counter().await.expect_err("must fail");

    assert_eq!(err, CounterError::Extraction);
    assert_eq!(app.screen(), Screen::CreateCounter);
    assert_eq!(app.location(), "");
}

#[tokio::test]
async fn owner_sees_reset_and_others_do_not() {
    for (account, reset_visible) in [("0xAAA", true), ("0xBBB", false)] {
        let (mut app, _signer) = app_with(
            &format!("#{COUNTER_ID}"),
            Some(account),
            FakeWaiter::confirmed(),
            FakeReader::counter(5, "0xAAA"),
        );
        app.refresh_account().await;
        let dispatcher = app.dispatcher().expect("dispatcher").clone();
        dispatcher.snapshot().refetch().await;

        let rendered = app.render();
        assert!(rendered.contains(&format!("Counter {COUNTER_ID}")));
        assert!(rendered.contains("Count: 5"));
        assert!(rendered.contains("[Increment] [Decrement]"));
        assert_eq!(rendered.contains("[Reset]"), reset_visible, "{account}");
        assert_eq!(dispatcher.reset_visible(app.account()), reset_visible);
    }
}

#[tokio::test]
async fn render_reflects_fetch_states() {
    let (mut app, _signer) = app_with(
        &format!("#{COUNTER_ID}"),
        Some("0xAAA"),
        FakeWaiter::confirmed(),
        FakeReader::failing("fullnode unavailable"),
    );
    app.refresh_account().await;
    assert_eq!(app.render(), "Loading...\n");

    app.dispatcher()
        .expect("dispatcher")
        .snapshot()
        .refetch()
        .await;
    assert!(app.render().starts_with("Error: "));
}

#[tokio::test]
async fn increment_through_app_refreshes_count() {
    let reader = Arc::new(FakeReader::counter(5, "0xAAA"));
    let signer = Arc::new(FakeSigner::ok());
    let services = services(
        signer,
        Arc::new(FakeWaiter::confirmed()),
        reader.clone(),
        Some("0xAAA"),
    );
    let mut app = CounterApp::new(services, PACKAGE_ID, format!("#{COUNTER_ID}"));
    app.refresh_account().await;
    let dispatcher = app.dispatcher().expect("dispatcher").clone();
    dispatcher.snapshot().refetch().await;

    reader.set_counter(6, "0xAAA").await;
    let outcome = dispatcher.increment().await;

    assert!(matches!(outcome, ActionOutcome::Completed { .. }));
    assert!(app.render().contains("Count: 6"));
}
