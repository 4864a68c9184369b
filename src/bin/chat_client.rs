//! Line-oriented chat client
//!
//! Asks for a username, then reads commands from stdin:
//! - `/rom <name>` switches room and fetches its history
//! - `/messages` fetches the current room's history
//! - `/quit` exits
//! - anything else is sent as a message
//!
//! Incoming frames are printed one per line.

use std::env;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use multiroom_chat::config::DEFAULT_ROOM;
use multiroom_chat::logging::init_file_logging;
use multiroom_chat::{
    AppError, ClientConfig, LoginOutcome, RemoteConnection, RemoteReceiver, ServerMessage,
};

const LOG_DIRECTIVE: &str = "multiroom_chat=info,chat_client=info";

/// One line of user input
#[derive(Debug, PartialEq)]
enum Input {
    Say(String),
    Room(String),
    History,
    Quit,
    Nothing,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(room) = line.strip_prefix("/rom ") {
        let room = room.trim();
        if room.is_empty() {
            return Input::Nothing;
        }
        return Input::Room(room.to_string());
    }
    match line.trim() {
        "" => Input::Nothing,
        "/messages" => Input::History,
        "/quit" => Input::Quit,
        _ => Input::Say(line.to_string()),
    }
}

fn render(msg: &ServerMessage) -> Option<String> {
    match msg {
        ServerMessage::Login { text } => Some(match text {
            LoginOutcome::Success => "* logged in".to_string(),
            LoginOutcome::Fail => "* login failed, username in use".to_string(),
        }),
        ServerMessage::Msg { user, text } => Some(format!("[{}] {}", user, text.trim_end())),
        ServerMessage::AvailableRoms { list } => Some(format!("* rooms: {}", list.join(", "))),
        ServerMessage::MessageList { list } => {
            let mut out = format!("* {} message(s)", list.len());
            for post in list {
                out.push_str(&format!("\n{} [{}] {}", post.time, post.username, post.message));
            }
            Some(out)
        }
        ServerMessage::Unknown => None,
    }
}

async fn print_incoming(mut rx: RemoteReceiver) {
    loop {
        match rx.recv().await {
            Ok(msg) => {
                if let Some(line) = render(&msg) {
                    println!("{}", line);
                }
            }
            Err(AppError::ConnectionClosed) => {
                info!("Server closed the connection");
                println!("* disconnected");
                break;
            }
            Err(e) => {
                error!("Receive error: {}", e);
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_args(env::args().skip(1))?;
    init_file_logging(&config.log_file, LOG_DIRECTIVE)?;

    info!("Connecting to {}", config.server_addr());
    let mut conn = RemoteConnection::connect(config.server_addr()).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Ask for a username until the server accepts one
    loop {
        print!("username: ");
        std::io::stdout().flush()?;
        let Some(name) = lines.next_line().await? else {
            return Ok(());
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        conn.login(name).await?;
        let outcome = loop {
            let msg = conn.recv().await?;
            if let ServerMessage::Login { text } = msg {
                break text;
            }
            if let Some(line) = render(&msg) {
                println!("{}", line);
            }
        };
        if let Some(line) = render(&ServerMessage::Login { text: outcome }) {
            println!("{}", line);
        }
        if outcome == LoginOutcome::Success {
            info!("Logged in as {}", name);
            break;
        }
    }

    let (mut tx, rx) = conn.split();
    let mut receive = tokio::spawn(print_incoming(rx));

    let mut room = DEFAULT_ROOM.to_string();
    tx.request_messages(&room).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Say(text) => tx.say(&text).await?,
                    Input::Room(name) => {
                        tx.change_room(&name).await?;
                        tx.request_messages(&name).await?;
                        room = name;
                    }
                    Input::History => tx.request_messages(&room).await?,
                    Input::Quit => break,
                    Input::Nothing => {}
                }
            }
            _ = &mut receive => break,
        }
    }

    Ok(())
}
