//! End-to-end tests over real TCP connections.
//!
//! Each test binds an ephemeral port, runs the server on a background thread
//! and drives it with scripted clients that mirror the board locally.
//!
//! Run with: cargo test --release server_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dicewars::client::{Client, ClientBoard};
use dicewars::game::{win_probability, AreaId, PlayerId};
use dicewars::protocol::ServerMessage;
use dicewars::{server, GameConfig, GameSummary, ProtocolError, Seeds, ServerConfig, ServerError};

/// What a scripted client saw.
#[derive(Debug)]
struct Seen {
    player: PlayerId,
    winner: Option<PlayerId>,
    battles: u64,
}

fn spawn_server(players: usize, seed: u64) -> (SocketAddr, JoinHandle<Result<GameSummary, ServerError>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let game = GameConfig {
        players,
        seeds: Seeds::from_seed(seed),
        turn_timeout: Duration::from_secs(5),
        ..GameConfig::default()
    };
    let server_config = ServerConfig {
        listen: addr,
        handshake_timeout: Duration::from_secs(2),
        ..ServerConfig::default()
    };
    let handle = thread::spawn(move || server::serve(&listener, &server_config, game));
    (addr, handle)
}

fn best_attack(mirror: &ClientBoard) -> Option<(AreaId, AreaId)> {
    let board = &mirror.board;
    let odds = |(s, t): (AreaId, AreaId)| {
        win_probability(board.get(s).unwrap().dice, board.get(t).unwrap().dice)
    };
    mirror
        .possible_attacks()
        .into_iter()
        .max_by(|&a, &b| odds(a).total_cmp(&odds(b)))
}

/// Play greedily until the server hangs up.
fn play(addr: SocketAddr, nickname: &str) -> Seen {
    let mut client = Client::connect(addr, nickname).unwrap();
    client.set_read_timeout(Some(Duration::from_secs(30))).unwrap();
    let mut battles = 0;

    loop {
        match client.recv() {
            Ok(ServerMessage::TurnPrompt { current_player, .. }) if client.player() == Some(current_player) => {
                match best_attack(client.mirror().unwrap()) {
                    Some((source, target)) => client.attack(source, target).unwrap(),
                    None => client.end_turn().unwrap(),
                }
            }
            Ok(ServerMessage::Battle { .. }) => battles += 1,
            Ok(ServerMessage::Error { reason }) => panic!("{nickname} sent an illegal command: {reason}"),
            Ok(_) => {}
            Err(ProtocolError::Closed) => break,
            Err(e) => panic!("{nickname}: {e}"),
        }
    }

    let mirror = client.mirror().unwrap();
    assert!(mirror.finished, "{nickname} saw no game_end");
    Seen {
        player: mirror.player,
        winner: mirror.winner,
        battles,
    }
}

#[test]
fn test_full_game_over_tcp() {
    let (addr, server) = spawn_server(3, 8);
    let clients: Vec<_> = ["ann", "bob", "cid"]
        .into_iter()
        .map(|name| thread::spawn(move || play(addr, name)))
        .collect();
    let seen: Vec<Seen> = clients.into_iter().map(|c| c.join().unwrap()).collect();
    let summary = server.join().unwrap().unwrap();

    let winner = summary.winner.unwrap();
    let mut players: Vec<PlayerId> = seen.iter().map(|s| s.player).collect();
    players.sort_unstable();
    assert_eq!(players, vec![1, 2, 3]);
    for client in &seen {
        assert_eq!(client.winner, Some(winner));
        assert_eq!(client.battles, summary.battles);
    }
}

#[test]
fn test_malformed_handshake_is_dropped() {
    let (addr, server) = spawn_server(2, 13);
    let mut rogue = TcpStream::connect(addr).unwrap();
    rogue.write_all(b"hello there\n").unwrap();

    let clients: Vec<_> = ["ann", "bob"]
        .into_iter()
        .map(|name| thread::spawn(move || play(addr, name)))
        .collect();
    let seen: Vec<Seen> = clients.into_iter().map(|c| c.join().unwrap()).collect();
    let summary = server.join().unwrap().unwrap();

    assert!(seen.iter().all(|s| s.winner == summary.winner));
    rogue.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut buf = [0u8; 64];
    assert!(matches!(rogue.read(&mut buf), Ok(0) | Err(_)));
}

#[test]
fn test_leaving_before_start_aborts() {
    let (addr, server) = spawn_server(3, 21);

    let quitter = Client::connect(addr, "quitter").unwrap();
    thread::sleep(Duration::from_millis(200));
    drop(quitter);
    thread::sleep(Duration::from_millis(200));
    let _late = Client::connect(addr, "late").unwrap();

    let result = server.join().unwrap();
    assert!(
        matches!(result, Err(ServerError::FormingAborted(lost)) if lost.player == 1),
        "{result:?}"
    );
}
