#![no_main]

use std::io::Cursor;
use std::sync::mpsc;

use dicewars::protocol::{decode, encode, ClientMessage, ServerMessage};
use dicewars::server::{read_loop, InboundKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever a client sends, the reader ends with exactly one disconnect
    let (tx, rx) = mpsc::channel();
    read_loop(1, &mut Cursor::new(data), &tx);
    drop(tx);
    let received: Vec<_> = rx.into_iter().collect();
    let disconnects = received
        .iter()
        .filter(|m| matches!(m.kind, InboundKind::Disconnected(_)))
        .count();
    assert_eq!(disconnects, 1);
    assert!(matches!(received.last().map(|m| m.kind), Some(InboundKind::Disconnected(_))));

    // Anything that decodes must survive a trip through the encoder
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(message) = decode::<ClientMessage>(text) {
            let line = encode(&message).unwrap();
            let again: ClientMessage = decode(std::str::from_utf8(&line).unwrap()).unwrap();
            assert_eq!(again, message);
        }
        if let Ok(message) = decode::<ServerMessage>(text) {
            let line = encode(&message).unwrap();
            let again: ServerMessage = decode(std::str::from_utf8(&line).unwrap()).unwrap();
            assert_eq!(again, message);
        }
    }
});
