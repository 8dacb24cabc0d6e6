use httpmock::prelude::*;
use serde_json::json;

use web3_wallet_core::blockchain::{EvmRpcClient, SolanaRpcClient};
use web3_wallet_core::{ChainId, RpcClient, RpcError, TransactionParams};

const SOL_ADDRESS: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";
const EVM_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";

#[tokio::test]
async fn test_solana_get_balance() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("\"getBalance\"")
                .body_contains(SOL_ADDRESS)
                .body_contains("confirmed");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 42 }, "value": 1_500_000_000u64 }
            }));
        })
        .await;

    let client = SolanaRpcClient::new(&server.url("/")).unwrap();
    let result = client.get_balance(SOL_ADDRESS).await.unwrap();
    assert_eq!(result["value"], json!(1_500_000_000u64));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_solana_latest_blockhash() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("getLatestBlockhash");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 42 },
                    "value": {
                        "blockhash": "EETubP5AKHgjPAhzPAFcb8BAY1hMH639CWCFTqi3hq1k",
                        "lastValidBlockHeight": 3090
                    }
                }
            }));
        })
        .await;

    let client = SolanaRpcClient::new(&server.url("/")).unwrap();
    let params = client.get_transaction_params(SOL_ADDRESS).await.unwrap();
    assert_eq!(
        params,
        TransactionParams::Solana {
            recent_blockhash: "EETubP5AKHgjPAhzPAFcb8BAY1hMH639CWCFTqi3hq1k".into()
        }
    );
}

#[tokio::test]
async fn test_solana_send_transaction_base64() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("sendTransaction")
                // base64 of [1, 2, 3]
                .body_contains("AQID")
                .body_contains("\"encoding\":\"base64\"");
            then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "5sig" }));
        })
        .await;

    let client = SolanaRpcClient::new(&server.url("/")).unwrap();
    assert_eq!(client.submit(&[1, 2, 3]).await.unwrap(), "5sig");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_solana_error_object_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32002, "message": "Transaction simulation failed" }
            }));
        })
        .await;

    let client = SolanaRpcClient::new(&server.url("/")).unwrap();
    match client.submit(&[1, 2, 3]).await {
        Err(RpcError::Rejected(msg)) => {
            assert!(msg.contains("simulation failed"));
            assert!(msg.contains("-32002"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_solana_http_failure_is_transport() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(503).body("overloaded");
        })
        .await;

    let client = SolanaRpcClient::new(&server.url("/")).unwrap();
    let err = client.get_balance(SOL_ADDRESS).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_evm_get_balance() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("eth_getBalance")
                .body_contains("latest");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0xde0b6b3a7640000" }));
        })
        .await;

    let client = EvmRpcClient::new(ChainId::Ethereum, &server.url("/")).unwrap();
    let result = client.get_balance(EVM_ADDRESS).await.unwrap();
    assert_eq!(result, json!("0xde0b6b3a7640000"));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_evm_rejected_submission() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("eth_sendRawTransaction");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "nonce too low" }
            }));
        })
        .await;

    let client = EvmRpcClient::new(ChainId::Polygon, &server.url("/")).unwrap();
    match client.submit(&[0xf8, 0x6c]).await {
        Err(RpcError::Rejected(msg)) => assert!(msg.contains("nonce too low"), "{}", msg),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_node_is_transport() {
    // nothing listens on the discard port
    let client = SolanaRpcClient::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(client.get_balance(SOL_ADDRESS).await, Err(RpcError::Transport(_))));
}
