use roomlink_core::{SessionDescription, SignalingMessage, SocketState};

use crate::integration::{create_test_session_with, init_tracing};
use crate::utils::{
    LOCAL_ANSWER, candidate, connection, join_response, remote_offer, wait_for, wire,
};

#[tokio::test]
async fn test_queued_messages_flush_in_order() {
    init_tracing();

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

    for n in 1..=3 {
        t.engine.discover(candidate(n)).await;
    }

    assert!(
        wait_for(2000, || async move {
            handle.snapshot().await.is_ok_and(|s| s.outgoing_len == 4)
        })
        .await
    );
    assert!(t.socket.sent_messages().await.is_empty());

    assert!(t.wait_for_socket(SocketState::Connected).await);
    t.socket.acknowledge_registration().await;

    let mut expected = vec![wire(&SignalingMessage::Answer(SessionDescription::answer(LOCAL_ANSWER)))];
    expected.extend((1..=3).map(|n| wire(&SignalingMessage::Candidate(candidate(n)))));
    let socket = &t.socket;
    let expected_ref = &expected;
    assert!(wait_for(2000, || async move { socket.sent_messages().await == *expected_ref }).await);

    // Later messages go out directly, after the backlog
    t.engine.discover(candidate(4)).await;
    let mut expected = expected;
    expected.push(wire(&SignalingMessage::Candidate(candidate(4))));
    let expected_ref = &expected;
    assert!(wait_for(2000, || async move { socket.sent_messages().await == *expected_ref }).await);
    assert_eq!(t.handle.snapshot().await.unwrap().outgoing_len, 0);
}
