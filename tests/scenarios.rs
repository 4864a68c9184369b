//! End-to-end tests over real TCP connections.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::timeout;

use multiroom_chat::{
    ChatServer, LoginOutcome, RemoteConnection, ServerConfig, ServerMessage, SYSTEM_USER,
};

/// Start a server on an ephemeral port and return its address
async fn start_server() -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    };
    let server = ChatServer::bind(&config).await.expect("bind failed");
    let addr = server.local_addr().expect("no local addr");
    tokio::spawn(server.run());
    addr
}

async fn next(conn: &mut RemoteConnection) -> ServerMessage {
    timeout(Duration::from_secs(2), conn.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("receive failed")
}

async fn expect_silence(conn: &mut RemoteConnection) {
    assert!(timeout(Duration::from_millis(100), conn.recv()).await.is_err());
}

/// Connect and log in, consuming the login reply and the room list
async fn logged_in(addr: SocketAddr, name: &str) -> RemoteConnection {
    let mut conn = RemoteConnection::connect(addr).await.unwrap();
    conn.login(name).await.unwrap();
    assert_eq!(
        next(&mut conn).await,
        ServerMessage::Login {
            text: LoginOutcome::Success
        }
    );
    assert!(matches!(next(&mut conn).await, ServerMessage::AvailableRoms { .. }));
    conn
}

fn msg(user: &str, text: &str) -> ServerMessage {
    ServerMessage::Msg {
        user: user.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_login_then_room_list_then_empty_history() {
    let addr = start_server().await;
    let mut alice = RemoteConnection::connect(addr).await.unwrap();

    alice.login("alice").await.unwrap();
    assert_eq!(
        next(&mut alice).await,
        ServerMessage::Login {
            text: LoginOutcome::Success
        }
    );
    match next(&mut alice).await {
        ServerMessage::AvailableRoms { mut list } => {
            list.sort();
            assert_eq!(list, vec!["kek", "lol", "main"]);
        }
        other => panic!("Wrong variant: {:?}", other),
    }

    alice.request_messages("main").await.unwrap();
    assert_eq!(
        next(&mut alice).await,
        ServerMessage::MessageList { list: vec![] }
    );
}

#[tokio::test]
async fn test_broadcast_reaches_others_without_echo() {
    let addr = start_server().await;
    let mut alice = logged_in(addr, "alice").await;
    let mut bob = logged_in(addr, "bob").await;
    assert_eq!(
        next(&mut alice).await,
        msg(SYSTEM_USER, " user bob has joined the rom")
    );

    alice.say("hi").await.unwrap();

    assert_eq!(next(&mut bob).await, msg("alice", "hi"));
    expect_silence(&mut alice).await;
}

#[tokio::test]
async fn test_change_room_isolates_broadcasts() {
    let addr = start_server().await;
    let mut alice = logged_in(addr, "alice").await;
    let mut bob = logged_in(addr, "bob").await;
    next(&mut alice).await; // bob's join notice

    let mut carol = logged_in(addr, "carol").await;
    next(&mut alice).await; // carol's join notice
    next(&mut bob).await;
    carol.change_room("lol").await.unwrap();
    assert_eq!(next(&mut carol).await, msg(SYSTEM_USER, "welcome to rom lol"));

    alice.change_room("lol").await.unwrap();
    assert_eq!(next(&mut alice).await, msg(SYSTEM_USER, "welcome to rom lol"));
    assert_eq!(
        next(&mut carol).await,
        msg(SYSTEM_USER, " user alice has joined the rom")
    );

    alice.say("hello lol").await.unwrap();
    assert_eq!(next(&mut carol).await, msg("alice", "hello lol"));
    expect_silence(&mut bob).await;

    bob.say("anyone in main?").await.unwrap();
    expect_silence(&mut alice).await;
    expect_silence(&mut carol).await;
}

#[tokio::test]
async fn test_duplicate_login_rejected_first_session_unaffected() {
    let addr = start_server().await;
    let mut first = logged_in(addr, "alice").await;
    let mut bob = logged_in(addr, "bob").await;
    next(&mut first).await; // bob's join notice

    let mut second = RemoteConnection::connect(addr).await.unwrap();
    second.login("alice").await.unwrap();
    assert_eq!(
        next(&mut second).await,
        ServerMessage::Login {
            text: LoginOutcome::Fail
        }
    );

    bob.say("still there?").await.unwrap();
    assert_eq!(next(&mut first).await, msg("bob", "still there?"));
    expect_silence(&mut second).await;
}

#[tokio::test]
async fn test_duplicate_login_rejected_after_original_switched_room() {
    let addr = start_server().await;
    let mut first = logged_in(addr, "alice").await;
    first.change_room("kek").await.unwrap();
    assert_eq!(next(&mut first).await, msg(SYSTEM_USER, "welcome to rom kek"));

    let mut second = RemoteConnection::connect(addr).await.unwrap();
    second.login("alice").await.unwrap();
    assert_eq!(
        next(&mut second).await,
        ServerMessage::Login {
            text: LoginOutcome::Fail
        }
    );
}

#[tokio::test]
async fn test_history_in_insertion_order() {
    let addr = start_server().await;
    let mut bob = logged_in(addr, "bob").await;
    bob.change_room("lol").await.unwrap();
    next(&mut bob).await; // welcome
    bob.say("first").await.unwrap();
    bob.say("second").await.unwrap();
    bob.request_messages("lol").await.unwrap();
    assert!(matches!(
        next(&mut bob).await,
        ServerMessage::MessageList { list } if list.len() == 2
    ));

    let mut alice = logged_in(addr, "alice").await;
    alice.change_room("lol").await.unwrap();
    assert_eq!(next(&mut alice).await, msg(SYSTEM_USER, "welcome to rom lol"));
    alice.request_messages("lol").await.unwrap();

    match next(&mut alice).await {
        ServerMessage::MessageList { list } => {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].username, "bob");
            assert_eq!(list[0].message, "first");
            assert_eq!(list[1].message, "second");
            assert!(list.iter().all(|p| p.time.len() == 5));
        }
        other => panic!("Wrong variant: {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnect_frees_username() {
    let addr = start_server().await;
    let alice = logged_in(addr, "alice").await;
    drop(alice);

    // The server notices the close asynchronously; retry briefly
    let mut accepted = false;
    for _ in 0..20 {
        let mut again = RemoteConnection::connect(addr).await.unwrap();
        again.login("alice").await.unwrap();
        if next(&mut again).await
            == (ServerMessage::Login {
                text: LoginOutcome::Success,
            })
        {
            accepted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(accepted);
}
