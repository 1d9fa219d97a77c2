use roomlink_core::{SessionDescription, SignalingMessage, SocketState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    LOCAL_ANSWER, LOCAL_OFFER, candidate, connection, join_response, remote_offer, socket_frame,
    wait_for, wire,
};

#[tokio::test]
async fn test_initiator_posts_offer_before_gathered_candidates() {
    init_tracing();

    // Candidate and completion race on separate channels, so repeat to catch a bad interleaving
    for _ in 0..10 {
        let t = create_test_session(join_response(true, vec![])).await;
        t.engine
            .gather_on_set_local(vec![candidate(1), candidate(2)])
            .await;
        t.join(connection()).await;

        let room = &t.room;
        assert!(wait_for(2000, || async move { room.posted_messages().await.len() == 3 }).await);
        assert_eq!(
            t.room.posted_messages().await,
            vec![
                wire(&SignalingMessage::Offer(SessionDescription::offer(LOCAL_OFFER))),
                wire(&SignalingMessage::Candidate(candidate(1))),
                wire(&SignalingMessage::Candidate(candidate(2))),
            ]
        );
        assert_eq!(t.handle.snapshot().await.unwrap().outgoing_len, 0);
    }
}

#[tokio::test]
async fn test_receiver_sends_answer_before_gathered_candidates() {
    init_tracing();

    for _ in 0..10 {
        let t = create_test_session(join_response(false, vec![])).await;
        t.engine.gather_on_set_local(vec![candidate(5)]).await;
        t.join(connection()).await;
        assert!(t.wait_for_socket(SocketState::Registered).await);

        t.socket
            .push(socket_frame(&SignalingMessage::Offer(remote_offer())))
            .await;

        let socket = &t.socket;
        assert!(wait_for(2000, || async move { socket.sent_messages().await.len() == 2 }).await);
        assert_eq!(
            t.socket.sent_messages().await,
            vec![
                wire(&SignalingMessage::Answer(SessionDescription::answer(LOCAL_ANSWER))),
                wire(&SignalingMessage::Candidate(candidate(5))),
            ]
        );
        assert!(t.room.posted_messages().await.is_empty());
    }
}
