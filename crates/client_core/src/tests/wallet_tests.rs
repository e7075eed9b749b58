use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::protocol::CallArg;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::fakes::{COUNTER_ID, PACKAGE_ID};

#[derive(Clone)]
struct BridgeState {
    account: Option<Address>,
    reply: (StatusCode, SignAndExecuteResponse),
    received: Arc<Mutex<Vec<SignAndExecuteRequest>>>,
}

async fn handle_account(State(state): State<BridgeState>) -> Json<AccountResponse> {
    Json(AccountResponse {
        address: state.account.clone(),
    })
}

async fn handle_sign(
    State(state): State<BridgeState>,
    Json(request): Json<SignAndExecuteRequest>,
) -> (StatusCode, Json<SignAndExecuteResponse>) {
    state.received.lock().await.push(request);
    let (status, body) = state.reply.clone();
    (status, Json(body))
}

async fn spawn_bridge(
    account: Option<&str>,
    reply: (StatusCode, SignAndExecuteResponse),
) -> Result<(String, BridgeState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BridgeState {
        account: account.map(Address::new),
        reply,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/wallet/account", get(handle_account))
        .route("/wallet/sign_and_execute", post(handle_sign))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/wallet"), state))
}

fn increment_call() -> MoveCall {
    MoveCall::counter(
        &shared::domain::PackageId::new(PACKAGE_ID),
        "increment",
        vec![CallArg::Object(shared::domain::ObjectId::new(COUNTER_ID))],
    )
}

fn digest_reply(digest: &str) -> (StatusCode, SignAndExecuteResponse) {
    (
        StatusCode::OK,
        SignAndExecuteResponse {
            digest: Some(TransactionDigest::new(digest)),
            error: None,
        },
    )
}

#[tokio::test]
async fn reports_connected_account() {
    let (url, _state) = spawn_bridge(Some("0xAAA"), digest_reply("tx"))
        .await
        .expect("spawn bridge");
    let wallet = WalletBridge::new(&url, Network::Testnet).expect("wallet");

    let account = wallet.current_account().await.expect("account");

    assert_eq!(account, Some(Address::new("0xAAA")));
}

#[tokio::test]
async fn reports_no_account_when_disconnected() {
    let (url, _state) = spawn_bridge(None, digest_reply("tx"))
        .await
        .expect("spawn bridge");
    let wallet = WalletBridge::new(&url, Network::Testnet).expect("wallet");

    assert_eq!(wallet.current_account().await.expect("account"), None);
}

#[tokio::test]
async fn forwards_call_and_returns_digest() {
    let (url, state) = spawn_bridge(Some("0xAAA"), digest_reply("tx-42"))
        .await
        .expect("spawn bridge");
    let wallet = WalletBridge::new(&url, Network::Devnet).expect("wallet");

    let digest = wallet
        .sign_and_execute(increment_call())
        .await
        .expect("signed");

    assert_eq!(digest, TransactionDigest::new("tx-42"));
    let received = state.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].network, Network::Devnet);
    assert_eq!(received[0].calls, vec![increment_call()]);
}

#[tokio::test]
async fn rejection_message_is_passed_through() {
    let reply = (
        StatusCode::FORBIDDEN,
        SignAndExecuteResponse {
            digest: None,
            error: Some("User rejected the request".to_string()),
        },
    );
    let (url, _state) = spawn_bridge(Some("0xAAA"), reply)
        .await
        .expect("spawn bridge");
    let wallet = WalletBridge::new(&url, Network::Testnet).expect("wallet");

    let err = wallet
        .sign_and_execute(increment_call())
        .await
        .expect_err("must fail");

    assert_eq!(err.to_string(), "User rejected the request");
}

#[tokio::test]
async fn success_without_digest_is_an_error() {
    let (url, _state) = spawn_bridge(Some("0xAAA"), (StatusCode::OK, SignAndExecuteResponse::default()))
        .await
        .expect("spawn bridge");
    let wallet = WalletBridge::new(&url, Network::Testnet).expect("wallet");

    let err = wallet
        .sign_and_execute(increment_call())
        .await
        .expect_err("must fail");

    assert!(err.to_string().contains("no transaction digest"));
}

#[test]
fn rejects_malformed_wallet_url() {
    assert!(WalletBridge::new("::nope", Network::Testnet).is_err());
}
