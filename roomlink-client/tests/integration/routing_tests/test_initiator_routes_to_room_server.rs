use roomlink_core::{SignalingMessage, SocketState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{EngineCall, candidate, connection, join_response, wait_for, wire};

#[tokio::test]
async fn test_initiator_candidates_use_room_server() {
    init_tracing();

    let t = create_test_session(join_response(true, vec![])).await;
    t.join(connection()).await;
    assert!(t.wait_for_socket(SocketState::Registered).await);

    let engine = &t.engine;
    assert!(
        wait_for(2000, || async move {
            engine
                .calls()
                .await
                .iter()
                .any(|c| matches!(c, EngineCall::Configure(_)))
        })
        .await
    );

    t.engine.discover(candidate(7)).await;

    let room = &t.room;
    let expected = wire(&SignalingMessage::Candidate(candidate(7)));
    let expected_ref = &expected;
    assert!(wait_for(2000, || async move { room.posted_messages().await.contains(expected_ref) }).await);

    let request = t
        .room
        .requests()
        .await
        .into_iter()
        .find(|r| r.body.as_deref() == Some(expected.as_str()))
        .unwrap();
    assert_eq!(request.url, crate::utils::message_url());
    assert!(!t.socket.sent_messages().await.contains(&expected));
}
