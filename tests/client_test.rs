//! End-to-end tests: two client agents playing through a real relay server.

use connect_four::{
    ClientEvent, ClientSessionAgent, NetError, Outcome, Role, Verdict, WireMove, serve, write_code,
    write_move,
};
use connect_four_engine::PlaceError;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// First mover's columns; with the second mover's they build a rising diagonal.
const FIRST_MOVES: [usize; 6] = [0, 1, 2, 2, 3, 3];
const SECOND_MOVES: [usize; 5] = [1, 2, 3, 3, 6];

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    server: JoinHandle<Result<Vec<connect_four::SessionReport>, NetError>>,
}

async fn start_server() -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, None, async {
        let _ = stopped.await;
    }));
    Running { addr, stop, server }
}

/// Spawns an agent fed with `columns`, returning its verdict and every event it reported.
fn spawn_agent(
    agent: ClientSessionAgent<tokio::net::TcpStream>,
    columns: &[usize],
) -> JoinHandle<(Result<Verdict, NetError>, Vec<ClientEvent>)> {
    let (move_tx, move_rx) = mpsc::channel(16);
    for &column in columns {
        move_tx.try_send(column).unwrap();
    }
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let verdict = agent.run(move_rx, event_tx).await;
        drop(move_tx);
        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        (verdict, events)
    })
}

#[tokio::test]
async fn test_two_clients_play_to_a_verdict() {
    let running = start_server().await;

    let first = ClientSessionAgent::connect(running.addr).await.unwrap();
    assert_eq!(first.role(), Role::FirstMover);
    let second = ClientSessionAgent::connect(running.addr).await.unwrap();
    assert_eq!(second.role(), Role::SecondMover);

    let first = spawn_agent(first, &FIRST_MOVES);
    let second = spawn_agent(second, &SECOND_MOVES);

    let (first_verdict, first_events) = first.await.unwrap();
    let (second_verdict, second_events) = second.await.unwrap();

    assert_eq!(first_verdict.unwrap(), Verdict::Won);
    assert_eq!(second_verdict.unwrap(), Verdict::Lost);

    assert_eq!(first_events[0], ClientEvent::RoleAssigned(Role::FirstMover));
    assert!(first_events.contains(&ClientEvent::OpponentJoined));
    assert_eq!(first_events.last(), Some(&ClientEvent::Finished(Verdict::Won)));

    let opponent_moves: Vec<_> = second_events
        .iter()
        .filter_map(|event| match event {
            ClientEvent::OpponentMoved(placement) => Some(placement.column),
            _ => None,
        })
        .collect();
    assert_eq!(opponent_moves, FIRST_MOVES.to_vec());

    let _ = running.stop.send(());
    let reports = running.server.await.unwrap().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].moves, FIRST_MOVES.len() + SECOND_MOVES.len());
}

#[tokio::test]
async fn test_rejected_column_is_retried() {
    let running = start_server().await;

    let first = ClientSessionAgent::connect(running.addr).await.unwrap();
    let second = ClientSessionAgent::connect(running.addr).await.unwrap();

    let mut first_moves = vec![9];
    first_moves.extend(FIRST_MOVES);
    let first = spawn_agent(first, &first_moves);
    let second = spawn_agent(second, &SECOND_MOVES);

    let (first_verdict, first_events) = first.await.unwrap();
    assert_eq!(first_verdict.unwrap(), Verdict::Won);
    assert!(first_events.contains(&ClientEvent::MoveRejected(PlaceError::ColumnOutOfRange(9))));
    assert_eq!(second.await.unwrap().0.unwrap(), Verdict::Lost);

    let _ = running.stop.send(());
    running.server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_opponent_leaving_aborts_game() {
    let running = start_server().await;

    let first = ClientSessionAgent::connect(running.addr).await.unwrap();
    let second = ClientSessionAgent::connect(running.addr).await.unwrap();
    drop(second);

    // No moves queued: the abort arrives while the first mover holds the turn.
    let (move_tx, move_rx) = mpsc::channel(1);
    let (event_tx, _event_rx) = mpsc::unbounded_channel();
    let verdict = first.run(move_rx, event_tx).await.unwrap();
    drop(move_tx);

    assert_eq!(verdict, Verdict::Aborted);

    let _ = running.stop.send(());
    running.server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_shutdown_aborts_running_game() {
    let running = start_server().await;

    let first = ClientSessionAgent::connect(running.addr).await.unwrap();
    let second = ClientSessionAgent::connect(running.addr).await.unwrap();
    assert_eq!(second.board().occupied(), 0);

    let second = spawn_agent(second, &[]);
    let (move_tx, move_rx) = mpsc::channel(1);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let first = tokio::spawn(first.run(move_rx, event_tx));

    // Wait until the game has started before stopping the server.
    while let Some(event) = event_rx.recv().await {
        if event == ClientEvent::YourTurn {
            break;
        }
    }
    let _ = running.stop.send(());

    assert_eq!(first.await.unwrap().unwrap(), Verdict::Aborted);
    assert_eq!(second.await.unwrap().0.unwrap(), Verdict::Aborted);
    drop(move_tx);

    let reports = running.server.await.unwrap().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].end.to_string(), "aborted (server shutdown)");
}

#[tokio::test]
async fn test_server_vanishing_mid_game_reports_failure() {
    let (client, mut server) = tokio::io::duplex(64);
    write_code(&mut server, Role::SecondMover.code()).await.unwrap();

    let agent = ClientSessionAgent::join(client).await.unwrap();
    let (move_tx, move_rx) = mpsc::channel(1);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let run = tokio::spawn(agent.run(move_rx, event_tx));

    write_code(&mut server, Outcome::Continue.code()).await.unwrap();
    write_move(&mut server, WireMove::new(5, 3)).await.unwrap();
    drop(server);

    let result = run.await.unwrap();
    assert!(matches!(result, Err(NetError::ServerClosed)));
    drop(move_tx);

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    assert!(events.iter().any(|e| matches!(e, ClientEvent::OpponentMoved(_))));
    assert!(matches!(events.last(), Some(ClientEvent::Failed(_))));
    assert!(!events.iter().any(|e| matches!(e, ClientEvent::Finished(_))));
}
