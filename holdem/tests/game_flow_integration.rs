/// Integration tests for game flow scenarios
///
/// These tests drive whole hands through the hub the way a transport would:
/// connect, forward action envelopes, and read each player's outbound queue.
use std::{sync::Arc, time::Duration};

use holdem::{
    Connection, GameMessage, HandView, Hub, MessageKind, Round, TableConfig,
    table::MemoryTableStore,
};
use tokio::time::timeout;

const NAMES: [&str; 3] = ["alice", "bob", "carol"];

fn hub() -> (Hub, Arc<MemoryTableStore>) {
    let store = Arc::new(MemoryTableStore::new());
    (Hub::new(store.clone(), TableConfig::default()), store)
}

async fn next_message(conn: &mut Connection) -> Option<GameMessage> {
    timeout(Duration::from_secs(5), conn.outbound.recv())
        .await
        .expect("timed out waiting for a message")
}

async fn next_view(conn: &mut Connection) -> HandView {
    let message = next_message(conn).await.expect("connection closed");
    assert_eq!(message.kind, MessageKind::State, "unexpected {message:?}");
    serde_json::from_str(&message.data).unwrap()
}

/// Connects three players to `table_id` and returns them once everyone has
/// seen the opening state.
async fn seat_three(hub: &Hub, table_id: &str) -> Vec<Connection> {
    let mut conns = Vec::new();
    for name in NAMES {
        conns.push(hub.connect(table_id, name).await.unwrap());
    }
    // Early joiners also got a snapshot while waiting.
    next_view(&mut conns[0]).await;
    next_view(&mut conns[1]).await;
    for conn in &mut conns {
        let view = next_view(conn).await;
        assert!(view.started);
    }
    conns
}

async fn act(conns: &mut [Connection], seat: usize, action: &str) -> Vec<HandView> {
    conns[seat]
        .link
        .forward(GameMessage::action(action))
        .await
        .unwrap();
    let mut views = Vec::new();
    for conn in conns.iter_mut() {
        views.push(next_view(conn).await);
    }
    views
}

#[tokio::test]
async fn test_third_player_starts_hand() {
    let (hub, store) = hub();
    let mut first = hub.connect("t1", "alice").await.unwrap();
    let waiting = next_view(&mut first).await;
    assert!(!waiting.started);
    assert_eq!(waiting.players.len(), 1);

    let _second = hub.connect("t1", "bob").await.unwrap();
    let mut third = hub.connect("t1", "carol").await.unwrap();
    let view = next_view(&mut third).await;
    assert!(view.started);
    assert_eq!(view.pot, 3);
    assert_eq!(view.current_bet, 2);
    assert_eq!(view.players[2].hole_cards.len(), 2);
    assert!(view.players[0].hole_cards.is_empty());
    assert!(view.players[1].hole_cards.is_empty());

    assert!(store.is_in_progress("t1").await);
}

#[tokio::test]
async fn test_full_hand_to_showdown() {
    let (hub, store) = hub();
    let mut conns = seat_three(&hub, "t1").await;

    let mut round = Round::PreFlop;
    let mut current = 0;
    loop {
        let views = act(&mut conns, current, "call").await;
        let view = &views[0];
        assert!(view.round >= round, "round went backwards");
        round = view.round;
        if view.game_over {
            break;
        }
        current = view.current_player;
    }

    assert_eq!(round, Round::River);

    // The table retires as soon as the hand is over.
    for conn in &mut conns {
        assert!(next_message(conn).await.is_none());
    }
    assert_eq!(store.deletions("t1").await, 1);
    assert_eq!(hub.active_table_count().await, 0);
}

#[tokio::test]
async fn test_showdown_reveals_all_hands() {
    let (hub, _) = hub();
    let mut conns = seat_three(&hub, "t1").await;

    let mut current = 0;
    let last = loop {
        let views = act(&mut conns, current, "call").await;
        if views[0].game_over {
            break views;
        }
        current = views[0].current_player;
    };

    for view in last {
        assert_eq!(view.community_cards.len(), 5);
        assert!(view.players.iter().all(|p| p.hole_cards.len() == 2));
        assert!(view.winner.is_some());
        assert_eq!(view.best_hand.len(), 5);
    }
}

#[tokio::test]
async fn test_wrong_turn_gets_error_then_state() {
    let (hub, _) = hub();
    let mut conns = seat_three(&hub, "t1").await;

    conns[2]
        .link
        .forward(GameMessage::action("call"))
        .await
        .unwrap();
    let error = next_message(&mut conns[2]).await.unwrap();
    assert_eq!(error, GameMessage::error("wrong turn"));
    let view = next_view(&mut conns[2]).await;
    assert_eq!(view.current_player, 0);
    assert_eq!(view.pot, 3);

    // Everyone else only gets the fresh state.
    let view = next_view(&mut conns[0]).await;
    assert_eq!(view.pot, 3);
}

#[tokio::test]
async fn test_unknown_action_and_kind() {
    let (hub, _) = hub();
    let mut conns = seat_three(&hub, "t1").await;

    conns[0]
        .link
        .forward(GameMessage::action("allin"))
        .await
        .unwrap();
    let error = next_message(&mut conns[0]).await.unwrap();
    assert_eq!(error.kind, MessageKind::Error);

    let chat: GameMessage = serde_json::from_str(r#"{"type":"chat","data":"hi"}"#).unwrap();
    conns[0].link.forward(chat).await.unwrap();
    let error = next_message(&mut conns[0]).await.unwrap();
    assert_eq!(error, GameMessage::error("incorrect action"));

    // Neither produced a broadcast: the next thing bob sees is alice's call.
    act(&mut conns, 0, "call").await;
}

#[tokio::test]
async fn test_two_folds_end_the_hand() {
    let (hub, store) = hub();
    let mut conns = seat_three(&hub, "t1").await;

    act(&mut conns, 0, "fold").await;
    let views = act(&mut conns, 1, "fold").await;
    for view in &views {
        assert!(view.game_over);
        assert_eq!(view.winner.as_ref().unwrap(), "carol");
        assert_eq!(view.best_rank.as_deref(), Some("Last man standing"));
    }

    for conn in &mut conns {
        assert!(next_message(conn).await.is_none());
    }
    assert_eq!(store.deletions("t1").await, 1);
}

#[tokio::test]
async fn test_own_turn_disconnect_folds_seat() {
    let (hub, _) = hub();
    let mut conns = seat_three(&hub, "t1").await;

    let alice = conns.remove(0);
    alice.link.leave().await;

    for conn in &mut conns {
        let view = next_view(conn).await;
        assert!(!view.players[0].active);
        assert_eq!(view.current_player, 1);
        assert!(!view.game_over);
    }
}

#[tokio::test]
async fn test_late_joiner_is_turned_away() {
    let (hub, _) = hub();
    let _conns = seat_three(&hub, "t1").await;

    let mut dave = hub.connect("t1", "dave").await.unwrap();
    let error = next_message(&mut dave).await.unwrap();
    assert_eq!(error, GameMessage::error("game already in progress"));
    assert!(next_message(&mut dave).await.is_none());

    let view = hub.view("t1", "alice").await.unwrap();
    assert_eq!(view.players.len(), 3);
}

#[tokio::test]
async fn test_reconnect_mid_hand_gets_own_view() {
    let (hub, _) = hub();
    let _conns = seat_three(&hub, "t1").await;

    let mut again = hub.connect("t1", "bob").await.unwrap();
    let view = next_view(&mut again).await;
    assert!(view.started);
    assert_eq!(view.players[1].hole_cards.len(), 2);
    assert!(view.players[0].hole_cards.is_empty());
}

#[tokio::test]
async fn test_tables_run_in_parallel() {
    let (hub, _) = hub();
    let mut tasks = Vec::new();
    for t in 0..8 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            let table_id = format!("table-{t}");
            let mut conns = seat_three(&hub, &table_id).await;
            let views = act(&mut conns, 0, "raise").await;
            assert_eq!(views[0].current_bet, 4);
            conns
        }));
    }

    let mut all = Vec::new();
    for task in tasks {
        all.push(task.await.unwrap());
    }
    assert_eq!(hub.active_table_count().await, 8);
}
