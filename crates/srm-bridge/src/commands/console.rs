//! Line-based operator console for `run --console`.
//!
//! `get <path>`, `set <path> <value>`, `dump [pattern]`, `help`, `quit`.
//! `set` writes an unacknowledged value, the same way an external
//! consumer of the state tree would issue a command.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use srm_core::{StateTree, StateValue};

use crate::output::plain_line;

const HELP: &str = "\
commands:
  get <path>           show one value
  set <path> <value>   write a value (true/false, number, or text)
  dump [pattern]       list values (`wifi.*`, exact path, or `*`)
  quit                 stop the bridge";

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Quit,
}

/// Execute one console line against `store`.
pub fn execute(store: &StateTree, line: &str) -> Reply {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Reply::Print(String::new());
    };

    match command {
        "get" => match words.next() {
            Some(path) if store.schema(path).is_some() => {
                Reply::Print(plain_line(path, store.get(path).as_ref()))
            }
            Some(path) => Reply::Print(format!("unknown path: {path}")),
            None => Reply::Print("usage: get <path>".into()),
        },
        "set" => {
            let (Some(path), Some(first)) = (words.next(), words.next()) else {
                return Reply::Print("usage: set <path> <value>".into());
            };
            let rest: Vec<&str> = std::iter::once(first).chain(words).collect();
            let value = StateValue::parse_loose(&rest.join(" "));
            match store.write(path, value, false) {
                Ok(state) => Reply::Print(plain_line(path, Some(&state))),
                Err(e) => Reply::Print(format!("error: {e}")),
            }
        }
        "dump" => {
            let pattern = words.next().unwrap_or("*");
            let lines: Vec<String> = store
                .entries(pattern)
                .iter()
                .filter(|e| e.state.is_some())
                .map(|e| plain_line(&e.path, e.state.as_ref()))
                .collect();
            Reply::Print(lines.join("\n"))
        }
        "help" | "?" => Reply::Print(HELP.into()),
        "quit" | "exit" => Reply::Quit,
        other => Reply::Print(format!("unknown command: {other} (try `help`)")),
    }
}

/// Serve stdin until `quit`. Stays pending after end of input so a closed
/// stdin does not stop the bridge.
pub async fn serve(store: Arc<StateTree>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match execute(&store, &line) {
                Reply::Quit => return,
                Reply::Print(text) if text.is_empty() => {}
                Reply::Print(text) => println!("{text}"),
            },
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "console input failed");
                break;
            }
        }
    }
    debug!("console input closed");
    std::future::pending::<()>().await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use srm_core::catalog;

    fn store() -> StateTree {
        let store = StateTree::new();
        catalog::ensure_static_objects(&store);
        store.write("info.connection", true, true).unwrap();
        store
    }

    #[test]
    fn get_known_and_unknown_paths() {
        let store = store();
        assert_eq!(
            execute(&store, "get info.connection"),
            Reply::Print("info.connection = true".into())
        );
        assert_eq!(
            execute(&store, "get wifi.Nope.enable"),
            Reply::Print("unknown path: wifi.Nope.enable".into())
        );
    }

    #[test]
    fn set_writes_unacked() {
        let store = store();
        catalog::ensure_subtree(&store, "wifi.Home", "Home", catalog::WIFI);

        let reply = execute(&store, "set wifi.Home.enable false");
        assert_eq!(reply, Reply::Print("wifi.Home.enable = false (pending)".into()));
        let state = store.get("wifi.Home.enable").unwrap();
        assert_eq!(state.val, StateValue::Bool(false));
        assert!(!state.ack);
    }

    #[test]
    fn set_rejects_wrong_type() {
        let store = store();
        let Reply::Print(text) = execute(&store, "set info.connection maybe") else {
            panic!("expected output");
        };
        assert!(text.starts_with("error:"), "{text}");
    }

    #[test]
    fn dump_filters_by_pattern() {
        let store = store();
        store.write("router.IPV4_IP", "203.0.113.7", true).unwrap();
        assert_eq!(
            execute(&store, "dump router.*"),
            Reply::Print("router.IPV4_IP = 203.0.113.7".into())
        );
    }

    #[test]
    fn quit_and_unknown() {
        let store = store();
        assert_eq!(execute(&store, "quit"), Reply::Quit);
        assert_eq!(execute(&store, "   "), Reply::Print(String::new()));
        assert!(matches!(execute(&store, "reboot"), Reply::Print(t) if t.contains("unknown command")));
    }
}
