//! Integration tests for the Jupiter HTTP client against a local mock server

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use mockito::Matcher;
use solana_sdk::{
    hash::Hash,
    message::Message,
    pubkey::Pubkey,
    transaction::{Transaction, VersionedTransaction},
};
use solx::types::find_token;
use solx::{JupiterClient, LaunchpadError, QuoteRequest, SwapAggregator, SwapSettings};
use std::time::Duration;

const SOL: &str = "So11111111111111111111111111111111111111112";
const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

fn quote_body() -> serde_json::Value {
    serde_json::json!({
        "inputMint": SOL,
        "inAmount": "1500000000",
        "outputMint": USDC,
        "outAmount": "210450000",
        "otherAmountThreshold": "209397750",
        "swapMode": "ExactIn",
        "slippageBps": 50,
        "priceImpactPct": "0.0001",
        "routePlan": [{"swapInfo": {"ammKey": "x", "label": "Whirlpool"}, "percent": 100}]
    })
}

fn request() -> QuoteRequest {
    QuoteRequest::from_ui(
        &find_token("SOL").unwrap(),
        &find_token("USDC").unwrap(),
        "1.5",
        &SwapSettings::from_percent(0.5).unwrap(),
    )
    .unwrap()
}

fn client(server: &mockito::Server) -> JupiterClient {
    JupiterClient::new(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_quote_sends_expected_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/quote")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("inputMint".into(), SOL.into()),
            Matcher::UrlEncoded("outputMint".into(), USDC.into()),
            Matcher::UrlEncoded("amount".into(), "1500000000".into()),
            Matcher::UrlEncoded("slippageBps".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(quote_body().to_string())
        .create_async()
        .await;

    let quote = client(&server).quote(&request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(quote.out_amount, 210_450_000);
    assert_eq!(quote.raw(), &quote_body());
}

#[tokio::test]
async fn test_quote_http_error_is_quote_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":"Could not find any route"}"#)
        .create_async()
        .await;

    let err = client(&server).quote(&request()).await.unwrap_err();
    match err {
        LaunchpadError::Quote(msg) => assert!(msg.contains("400")),
        other => panic!("expected Quote, got {:?}", other),
    }
}

#[tokio::test]
async fn test_quote_malformed_body_is_quote_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = client(&server).quote(&request()).await.unwrap_err();
    assert!(matches!(err, LaunchpadError::Quote(_)));
}

#[tokio::test]
async fn test_build_swap_posts_quote_verbatim_and_decodes() {
    let user = Pubkey::new_unique();
    #[allow(deprecated)]
    let ix = solana_sdk::system_instruction::transfer(&user, &Pubkey::new_unique(), 42);
    let message = Message::new_with_blockhash(&[ix], Some(&user), &Hash::new_unique());
    let expected = VersionedTransaction::from(Transaction::new_unsigned(message));
    let encoded = BASE64_STANDARD.encode(bincode::serialize(&expected).unwrap());

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(quote_body().to_string())
        .create_async()
        .await;
    let swap_mock = server
        .mock("POST", "/swap")
        .match_body(Matcher::Json(serde_json::json!({
            "quoteResponse": quote_body(),
            "userPublicKey": user.to_string(),
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "swapTransaction": encoded }).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let quote = client.quote(&request()).await.unwrap();
    let tx = client.build_swap(&quote, &user).await.unwrap();

    swap_mock.assert_async().await;
    assert_eq!(tx, expected);
}

#[tokio::test]
async fn test_build_swap_server_error_is_swap_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(quote_body().to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/swap")
        .with_status(500)
        .create_async()
        .await;

    let client = client(&server);
    let quote = client.quote(&request()).await.unwrap();
    let err = client
        .build_swap(&quote, &Pubkey::new_unique())
        .await
        .unwrap_err();
    assert!(matches!(err, LaunchpadError::Swap(_)));
}

#[tokio::test]
async fn test_build_swap_undecodable_transaction_is_swap_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(quote_body().to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/swap")
        .with_status(200)
        .with_body(r#"{"swapTransaction":"AAAA"}"#)
        .create_async()
        .await;

    let client = client(&server);
    let quote = client.quote(&request()).await.unwrap();
    let err = client
        .build_swap(&quote, &Pubkey::new_unique())
        .await
        .unwrap_err();
    assert!(matches!(err, LaunchpadError::Swap(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_quote_error() {
    let client = JupiterClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = client.quote(&request()).await.unwrap_err();
    assert!(matches!(err, LaunchpadError::Quote(_)));
}
