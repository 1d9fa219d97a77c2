use roomlink_core::{SdpType, SignalingMessage, SocketState};

use crate::integration::{TestSession, create_test_session, init_tracing};
use crate::utils::{
    EngineCall, candidate, connection, join_response, remote_answer, socket_frame, wait_for,
};

async fn joined_initiator() -> TestSession {
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
    t
}

#[tokio::test]
async fn test_candidates_wait_for_remote_answer() {
    init_tracing();
    let t = joined_initiator().await;

    for n in 1..=2 {
        t.socket
            .push(socket_frame(&SignalingMessage::Candidate(candidate(n))))
            .await;
    }

    let handle = &t.handle;
    assert!(
        wait_for(2000, || async move {
            handle.snapshot().await.is_ok_and(|s| s.queued_candidates == 2)
        })
        .await
    );
    assert!(t.engine.added_candidates().await.is_empty());

    t.socket
        .push(socket_frame(&SignalingMessage::Answer(remote_answer())))
        .await;

    let engine = &t.engine;
    assert!(wait_for(2000, || async move { engine.added_candidates().await.len() == 2 }).await);
    assert_eq!(t.engine.added_candidates().await, vec![candidate(1), candidate(2)]);

    let calls = t.engine.calls().await;
    let remote = calls
        .iter()
        .position(|c| *c == EngineCall::SetRemote(SdpType::Answer))
        .expect("answer was not applied");
    let first = calls
        .iter()
        .position(|c| *c == EngineCall::AddCandidate(candidate(1)))
        .unwrap();
    assert!(remote < first);

    // Past the drain, candidates apply straight away
    t.socket
        .push(socket_frame(&SignalingMessage::Candidate(candidate(3))))
        .await;
    assert!(wait_for(2000, || async move { engine.added_candidates().await.len() == 3 }).await);
    assert_eq!(
        t.engine.added_candidates().await,
        vec![candidate(1), candidate(2), candidate(3)]
    );

    let snapshot = t.handle.snapshot().await.unwrap();
    assert!(snapshot.candidates_drained);
    assert_eq!(snapshot.queued_candidates, 0);
    assert!(snapshot.local_description_set && snapshot.remote_description_set);
}

#[tokio::test]
async fn test_drain_happens_once() {
    init_tracing();
    let t = joined_initiator().await;

    t.socket
        .push(socket_frame(&SignalingMessage::Candidate(candidate(1))))
        .await;
    t.socket
        .push(socket_frame(&SignalingMessage::Answer(remote_answer())))
        .await;

    let engine = &t.engine;
    assert!(wait_for(2000, || async move { engine.added_candidates().await.len() == 1 }).await);

    // A repeated answer sets the remote description again but must not replay the backlog
    t.socket
        .push(socket_frame(&SignalingMessage::Answer(remote_answer())))
        .await;
    assert!(
        wait_for(2000, || async move {
            engine
                .calls()
                .await
                .iter()
                .filter(|c| **c == EngineCall::SetRemote(SdpType::Answer))
                .count()
                == 2
        })
        .await
    );
    assert_eq!(t.engine.added_candidates().await, vec![candidate(1)]);
}
