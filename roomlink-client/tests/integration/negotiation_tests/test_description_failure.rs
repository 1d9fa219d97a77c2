use roomlink_core::{RoomState, SdpType, SignalingMessage, SocketState};
use std::time::Duration;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    EngineCall, EngineStep, candidate, connection, join_response, remote_answer, remote_offer,
    socket_frame, wait_for,
};

/// Lets the engine completion that follows a recorded call reach the session.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_offer_creation_failure_sends_nothing() {
    init_tracing();

    let t = create_test_session(join_response(true, vec![])).await;
    t.engine.fail_on(EngineStep::CreateOffer).await;
    t.join(connection()).await;

    let engine = &t.engine;
    assert!(wait_for(2000, || async move { engine.has_call(&EngineCall::CreateOffer).await }).await);
    settle().await;

    assert!(!t.engine.has_call(&EngineCall::SetLocal(SdpType::Offer)).await);
    assert!(t.room.posted_messages().await.is_empty());

    let snapshot = t.handle.snapshot().await.unwrap();
    assert!(!snapshot.local_description_set);
    assert_eq!(snapshot.room_state, RoomState::Connected);
    assert!(t.listener.errors().await.is_empty());
}

#[tokio::test]
async fn test_local_description_failure_blocks_drain() {
    init_tracing();

    let t = create_test_session(join_response(true, vec![])).await;
    t.engine.fail_on(EngineStep::SetLocal).await;
    t.join(connection()).await;
    assert!(t.wait_for_socket(SocketState::Registered).await);

    let engine = &t.engine;
    assert!(
        wait_for(2000, || async move {
            engine.has_call(&EngineCall::SetLocal(SdpType::Offer)).await
        })
        .await
    );

    t.socket
        .push(socket_frame(&SignalingMessage::Candidate(candidate(1))))
        .await;
    t.socket
        .push(socket_frame(&SignalingMessage::Answer(remote_answer())))
        .await;
    assert!(
        wait_for(2000, || async move {
            engine.has_call(&EngineCall::SetRemote(SdpType::Answer)).await
        })
        .await
    );
    settle().await;

    let snapshot = t.handle.snapshot().await.unwrap();
    assert!(!snapshot.local_description_set);
    assert!(snapshot.remote_description_set);
    assert!(!snapshot.candidates_drained);
    assert_eq!(snapshot.queued_candidates, 1);
    assert!(t.engine.added_candidates().await.is_empty());

    // The offer never went out
    assert!(t.room.posted_messages().await.is_empty());
    assert!(t.listener.errors().await.is_empty());
}

#[tokio::test]
async fn test_rejected_remote_offer_is_not_answered() {
    init_tracing();

    let body = join_response(
        false,
        vec![
            SignalingMessage::Offer(remote_offer()),
            SignalingMessage::Candidate(candidate(1)),
        ],
    );
    let t = create_test_session(body).await;
    t.engine.fail_on(EngineStep::SetRemote).await;
    t.join(connection()).await;

    let engine = &t.engine;
    assert!(
        wait_for(2000, || async move {
            engine.has_call(&EngineCall::SetRemote(SdpType::Offer)).await
        })
        .await
    );
    settle().await;

    let calls = t.engine.calls().await;
    assert!(!calls.contains(&EngineCall::CreateAnswer));
    assert!(t.engine.added_candidates().await.is_empty());

    let snapshot = t.handle.snapshot().await.unwrap();
    assert!(!snapshot.remote_description_set);
    assert!(!snapshot.local_description_set);
    assert!(!snapshot.candidates_drained);
    assert_eq!(snapshot.queued_candidates, 1);
    assert_eq!(snapshot.outgoing_len, 0);
    assert!(t.socket.sent_messages().await.is_empty());
}

#[tokio::test]
async fn test_configure_failure_is_a_single_room_error() {
    init_tracing();

    let t = create_test_session(join_response(false, vec![])).await;
    t.engine.fail_on(EngineStep::Configure).await;
    t.join(connection()).await;

    assert!(t.wait_for_room(RoomState::Error).await);
    settle().await;

    assert_eq!(
        t.listener.errors().await,
        vec!["Failed to create peer connection: Configure failed".to_owned()]
    );
}
