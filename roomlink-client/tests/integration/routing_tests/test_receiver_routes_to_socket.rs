use roomlink_core::{SessionDescription, SignalingMessage, SocketState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    LOCAL_ANSWER, candidate, connection, join_response, remote_offer, socket_frame, wait_for, wire,
};

#[tokio::test]
async fn test_receiver_candidates_use_socket() {
    init_tracing();

    let t = create_test_session(join_response(false, vec![])).await;
    t.join(connection()).await;
    assert!(t.wait_for_socket(SocketState::Registered).await);

    t.socket
        .push(socket_frame(&SignalingMessage::Offer(remote_offer())))
        .await;

    let socket = &t.socket;
    let answer = wire(&SignalingMessage::Answer(SessionDescription::answer(LOCAL_ANSWER)));
    let answer_ref = &answer;
    assert!(wait_for(2000, || async move { socket.sent_messages().await == vec![answer_ref.clone()] }).await);

    t.engine.discover(candidate(4)).await;

    let expected = vec![answer.clone(), wire(&SignalingMessage::Candidate(candidate(4)))];
    let expected_ref = &expected;
    assert!(wait_for(2000, || async move { socket.sent_messages().await == *expected_ref }).await);
    assert!(t.room.posted_messages().await.is_empty());
}
