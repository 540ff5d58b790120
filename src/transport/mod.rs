// IRC transport task
//
// Owns the socket. The TUI never touches the network directly: it hands us a
// sender for inbound events at spawn time and gets back a sender for outbound
// commands. One task per connection, driven by a single select! loop.

pub mod wire;

use crate::config::IrcConfig;
use crate::events::{IrcEvent, OutboundCommand};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::codec::{Framed, LinesCodec};
use wire::Message;

/// Unifies plain TCP and TLS streams behind one framed codec
trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

type Wire = Framed<Box<dyn AsyncStream>, LinesCodec>;

// Server lines are capped at 512 bytes by the protocol; leave headroom for
// servers that tag on metadata.
const MAX_LINE_LENGTH: usize = 2048;

/// Spawn a connection task for the given server. Inbound protocol activity
/// arrives on `events`; the returned sender carries outbound commands. The
/// task exits when the socket closes or a Quit command is processed.
pub fn spawn(config: IrcConfig, events: UnboundedSender<IrcEvent>) -> UnboundedSender<OutboundCommand> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        match connect(&config).await {
            Ok(wire) => {
                if let Err(e) = run(wire, &config, &events, rx).await {
                    tracing::error!("connection error: {:#}", e);
                }
                let _ = events.send(IrcEvent::Disconnected);
            }
            Err(e) => {
                let _ = events.send(IrcEvent::ConnectFailed(format!("{:#}", e)));
            }
        }
    });
    tx
}

async fn connect(config: &IrcConfig) -> Result<Wire> {
    let stream = TcpStream::connect(&config.server)
        .await
        .with_context(|| format!("connecting to {}", config.server))?;

    let stream: Box<dyn AsyncStream> = if config.use_ssl {
        Box::new(tls_handshake(stream, config.host()).await?)
    } else {
        Box::new(stream)
    };

    Ok(Framed::new(
        stream,
        LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
    ))
}

async fn tls_handshake(
    stream: TcpStream,
    hostname: &str,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>> {
    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for cert in native.certs {
        if let Err(e) = roots.add(cert) {
            tracing::warn!("failed to add root cert: {}", e);
        }
    }
    for e in &native.errors {
        tracing::warn!("error loading native certs: {}", e);
    }

    let tls_config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(tls_config));
    let server_name =
        ServerName::try_from(hostname.to_string()).context("invalid TLS server name")?;

    connector
        .connect(server_name, stream)
        .await
        .with_context(|| format!("TLS handshake with {}", hostname))
}

async fn run(
    mut wire: Wire,
    config: &IrcConfig,
    events: &UnboundedSender<IrcEvent>,
    mut commands: UnboundedReceiver<OutboundCommand>,
) -> Result<()> {
    register(&mut wire, config).await?;

    loop {
        tokio::select! {
            line = wire.next() => {
                let Some(line) = line else {
                    tracing::info!("server closed the connection");
                    return Ok(());
                };
                let line = line.context("reading from server")?;
                let Some(msg) = Message::parse(&line) else { continue };

                if msg.command == "PING" {
                    let token = msg.trailing().unwrap_or_default();
                    send_line(&mut wire, &format!("PONG :{}", token)).await?;
                    continue;
                }
                if msg.command == "ERROR" {
                    let detail = msg.trailing().unwrap_or("server error").to_string();
                    let _ = events.send(IrcEvent::Error(detail));
                    return Ok(());
                }
                if let Some(event) = translate(&msg) {
                    if events.send(event).is_err() {
                        // TUI is gone, nothing left to do
                        return Ok(());
                    }
                }
            }

            cmd = commands.recv() => {
                let Some(cmd) = cmd else {
                    // Controller dropped the sender, shut the socket down
                    return Ok(());
                };
                let quitting = matches!(cmd, OutboundCommand::Quit(_));
                for line in encode(cmd) {
                    send_line(&mut wire, &line).await?;
                }
                if quitting {
                    return Ok(());
                }
            }
        }
    }
}

async fn register(wire: &mut Wire, config: &IrcConfig) -> Result<()> {
    if let Some(password) = &config.password {
        send_line(wire, &format!("PASS {}", password)).await?;
    }
    send_line(wire, &format!("NICK {}", config.nick)).await?;
    send_line(
        wire,
        &format!("USER {} 0 * :{}", config.username, config.realname),
    )
    .await?;
    Ok(())
}

/// LinesCodec terminates with `\n`; the explicit `\r` gives the protocol its
/// CRLF.
async fn send_line(wire: &mut Wire, line: &str) -> Result<()> {
    tracing::trace!(">> {}", line);
    wire.send(format!("{}\r", line))
        .await
        .context("writing to server")
}

/// Map a parsed server message onto a session event. Messages with no
/// session-level meaning return None.
fn translate(msg: &Message) -> Option<IrcEvent> {
    let nick = || msg.nick().unwrap_or("?").to_string();

    match msg.command.as_str() {
        // Registration complete
        "001" => Some(IrcEvent::Connected),

        "PRIVMSG" => {
            let target = msg.params.first()?;
            let text = msg.trailing()?.to_string();
            let channel = target.starts_with('#').then(|| target.clone());
            Some(IrcEvent::Chat {
                user: nick(),
                channel,
                text,
            })
        }

        "NOTICE" => Some(IrcEvent::Notice {
            from: nick(),
            text: msg.trailing()?.to_string(),
        }),

        "JOIN" => Some(IrcEvent::Joined {
            user: nick(),
            channel: msg.params.first()?.clone(),
        }),

        "PART" => Some(IrcEvent::Parted {
            user: nick(),
            channel: msg.params.first()?.clone(),
            reason: (msg.params.len() > 1).then(|| msg.trailing().unwrap_or_default().to_string()),
        }),

        "QUIT" => Some(IrcEvent::Quit {
            user: nick(),
            reason: msg.trailing().map(str::to_string),
        }),

        "NICK" => Some(IrcEvent::NickChanged {
            old_nick: nick(),
            new_nick: msg.trailing()?.to_string(),
        }),

        // Nick rejected during registration - surface it, the user can /nick
        "432" | "433" => Some(IrcEvent::Error(format!(
            "Nickname rejected: {}",
            msg.trailing().unwrap_or("in use or invalid")
        ))),

        // Remaining numerics (MOTD, LIST replies, ...) show up as notices.
        // params[0] is our own nick, skip it.
        cmd if cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()) => {
            let text = msg.params.get(1..).unwrap_or_default().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(IrcEvent::Notice {
                from: msg.nick().unwrap_or("server").to_string(),
                text,
            })
        }

        _ => None,
    }
}

/// Render an outbound command as protocol lines
fn encode(cmd: OutboundCommand) -> Vec<String> {
    match cmd {
        OutboundCommand::Join(channel) => vec![format!("JOIN {}", channel)],
        OutboundCommand::Part(channel) => vec![format!("PART {}", channel)],
        OutboundCommand::SendChat { channel, text } => {
            vec![format!("PRIVMSG {} :{}", channel, text)]
        }
        OutboundCommand::SendDirect { target, text } => {
            vec![format!("PRIVMSG {} :{}", target, text)]
        }
        OutboundCommand::ChangeNick(nick) => vec![format!("NICK {}", nick)],
        OutboundCommand::List(Some(pattern)) => vec![format!("LIST {}", pattern)],
        OutboundCommand::List(None) => vec!["LIST".to_string()],
        OutboundCommand::Quit(Some(reason)) => vec![format!("QUIT :{}", reason)],
        OutboundCommand::Quit(None) => vec!["QUIT".to_string()],
        OutboundCommand::Raw(line) => vec![line],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_channel_privmsg() {
        let msg = Message::parse(":bob!b@h PRIVMSG #rust :hello").unwrap();
        assert_eq!(
            translate(&msg),
            Some(IrcEvent::Chat {
                user: "bob".to_string(),
                channel: Some("#rust".to_string()),
                text: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_translate_private_privmsg_has_no_channel() {
        let msg = Message::parse(":bob!b@h PRIVMSG alice :psst").unwrap();
        match translate(&msg) {
            Some(IrcEvent::Chat { channel, .. }) => assert_eq!(channel, None),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_translate_welcome_numeric() {
        let msg = Message::parse(":server 001 alice :Welcome").unwrap();
        assert_eq!(translate(&msg), Some(IrcEvent::Connected));
    }

    #[test]
    fn test_translate_list_numeric_as_notice() {
        let msg = Message::parse(":server 322 alice #rust 42 :Rust talk").unwrap();
        assert_eq!(
            translate(&msg),
            Some(IrcEvent::Notice {
                from: "server".to_string(),
                text: "#rust 42 Rust talk".to_string(),
            })
        );
    }

    #[test]
    fn test_translate_part_without_reason() {
        let msg = Message::parse(":bob!b@h PART #rust").unwrap();
        assert_eq!(
            translate(&msg),
            Some(IrcEvent::Parted {
                user: "bob".to_string(),
                channel: "#rust".to_string(),
                reason: None,
            })
        );
    }

    #[test]
    fn test_translate_nick_change() {
        let msg = Message::parse(":alice!a@h NICK :trillian").unwrap();
        assert_eq!(
            translate(&msg),
            Some(IrcEvent::NickChanged {
                old_nick: "alice".to_string(),
                new_nick: "trillian".to_string(),
            })
        );
    }

    #[test]
    fn test_encode_chat_and_quit() {
        assert_eq!(
            encode(OutboundCommand::SendChat {
                channel: "#a".to_string(),
                text: "hi there".to_string(),
            }),
            vec!["PRIVMSG #a :hi there"]
        );
        assert_eq!(
            encode(OutboundCommand::Quit(Some("bye".to_string()))),
            vec!["QUIT :bye"]
        );
        assert_eq!(encode(OutboundCommand::List(None)), vec!["LIST"]);
    }
}
