//! Console command parsing, supplemented from `original_source/src/World/WorldSession.cpp`'s
//! `HandleConsoleCommand`. Not wired to stdin by CORE — an embedder's own REPL calls this
//! directly with whatever line it read.

use crate::session::Session;

/// Splits `line` on whitespace and acts on the first token. Unrecognised commands are ignored.
pub fn handle_console_command(line: &str, session: &mut Session) {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("quit") | Some("disconnect") | Some("logout") => session.disconnect(),
        _ => {}
    }
}
