use roomlink_core::{IceServerConfig, RoomParameters, SdpType, SessionDescription, SignalingMessage, SocketState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{
    EngineCall, LOCAL_OFFER, ListenerEvent, connection, join_response, wait_for, wire,
};

#[tokio::test]
async fn test_initiator_joins_and_offers() {
    init_tracing();

    let t = create_test_session(join_response(true, vec![])).await;
    t.join(connection()).await;

    assert!(t.wait_for_socket(SocketState::Registered).await);

    // The offer travels over the room server, not the socket
    let room = &t.room;
    let offer = wire(&SignalingMessage::Offer(SessionDescription::offer(LOCAL_OFFER)));
    let offer_ref = &offer;
    assert!(wait_for(2000, || async move { room.posted_messages().await.contains(offer_ref) }).await);
    assert!(t.socket.sent_messages().await.is_empty());

    let calls = t.engine.calls().await;
    assert_eq!(
        calls[..3],
        [
            EngineCall::Configure(vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }]),
            EngineCall::CreateOffer,
            EngineCall::SetLocal(SdpType::Offer),
        ]
    );

    let events = t.listener.events().await;
    assert_eq!(
        events.first(),
        Some(&ListenerEvent::RoomJoined(RoomParameters {
            initiator: true,
            ice_servers: Vec::new(),
        }))
    );

    let register = t.log.entries().await.into_iter().find(|e| e.starts_with("WSS register"));
    let register = register.expect("register command was not written");
    assert!(register.contains(r#""cmd":"register""#));
    assert!(register.contains(r#""roomid":"room1""#));
    assert!(register.contains(r#""clientid":"client1""#));

    let snapshot = t.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.initiator, Some(true));
    assert!(snapshot.local_description_set);
    assert!(!snapshot.remote_description_set);
}
