use roomlink_client::SocketEvent;
use roomlink_core::{SignalingMessage, SocketState};

use crate::integration::{TestSession, create_test_session_with, init_tracing};
use crate::utils::{connection, join_response, remote_offer, wait_for};

/// Receiver whose answer is stuck in the outgoing queue behind a pending registration.
async fn receiver_with_queued_answer() -> TestSession {
    let body = join_response(false, vec![SignalingMessage::Offer(remote_offer())]);
    let t = create_test_session_with(body, |socket| socket.manual_registration()).await;
    t.join(connection()).await;

    let handle = &t.handle;
    assert!(
        wait_for(2000, || async move {
            handle.snapshot().await.is_ok_and(|s| s.outgoing_len == 1)
        })
        .await
    );
    assert!(t.wait_for_socket(SocketState::Connected).await);
    t
}

#[tokio::test]
async fn test_socket_error_before_registration_drops_backlog() {
    init_tracing();
    let t = receiver_with_queued_answer().await;

    t.socket
        .emit(SocketEvent::Error("connection reset".to_owned()))
        .await;

    assert!(t.wait_for_socket(SocketState::Error).await);
    let snapshot = t.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.outgoing_len, 0);

    t.socket.emit(SocketEvent::Closed).await;
    assert!(t.wait_for_socket(SocketState::Closed).await);
    assert_eq!(t.handle.snapshot().await.unwrap().outgoing_len, 0);
    assert!(t.socket.sent_messages().await.is_empty());
}

#[tokio::test]
async fn test_socket_close_before_registration_drops_backlog() {
    init_tracing();
    let t = receiver_with_queued_answer().await;

    t.socket.emit(SocketEvent::Closed).await;

    assert!(t.wait_for_socket(SocketState::Closed).await);
    assert_eq!(t.handle.snapshot().await.unwrap().outgoing_len, 0);

    // A late acknowledgement has nothing left to flush
    t.socket.acknowledge_registration().await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(t.socket.sent_messages().await.is_empty());
}
