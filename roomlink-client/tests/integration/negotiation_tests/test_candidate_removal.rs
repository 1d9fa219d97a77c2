use roomlink_core::{SdpType, SignalingMessage, SocketState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    EngineCall, ListenerEvent, candidate, connection, join_response, remote_answer, socket_frame,
    wait_for,
};

#[tokio::test]
async fn test_removed_candidates_leave_the_queue_or_reach_the_engine() {
    init_tracing();

    let t = create_test_session(join_response(true, vec![])).await;
    t.join(connection()).await;
    assert!(t.wait_for_socket(SocketState::Registered).await);

    let engine = &t.engine;
    assert!(
        wait_for(2000, || async move {
            engine.has_call(&EngineCall::SetLocal(SdpType::Offer)).await
        })
        .await
    );

    for n in 1..=2 {
        t.socket
            .push(socket_frame(&SignalingMessage::Candidate(candidate(n))))
            .await;
    }
    t.socket
        .push(socket_frame(&SignalingMessage::RemoveCandidates(vec![candidate(1)])))
        .await;

    let listener = &t.listener;
    assert!(
        wait_for(2000, || async move {
            listener
                .count(|e| matches!(e, ListenerEvent::CandidatesRemoved(_)))
                .await
                == 1
        })
        .await
    );
    assert_eq!(t.handle.snapshot().await.unwrap().queued_candidates, 1);

    t.socket
        .push(socket_frame(&SignalingMessage::Answer(remote_answer())))
        .await;
    assert!(wait_for(2000, || async move { engine.added_candidates().await.len() == 1 }).await);
    assert_eq!(t.engine.added_candidates().await, vec![candidate(2)]);

    // After the drain a removal has to go to the engine
    t.socket
        .push(socket_frame(&SignalingMessage::RemoveCandidates(vec![candidate(2)])))
        .await;
    let removal = EngineCall::RemoveCandidates(vec![candidate(2)]);
    let removal_ref = &removal;
    assert!(wait_for(2000, || async move { engine.has_call(removal_ref).await }).await);
    assert!(
        !t.engine
            .has_call(&EngineCall::RemoveCandidates(vec![candidate(1)]))
            .await
    );
}
