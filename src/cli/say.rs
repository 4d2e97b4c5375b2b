//! TUI-less "say" command

use std::error::Error;
use std::path::PathBuf;

use crate::core::session::{ChatSession, SessionOptions, SessionUpdate};
use crate::utils::logging::LoggingState;

/// Send `prompt` once the connection opens and print the single reply.
pub async fn run_say(
    prompt: String,
    endpoint: String,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        eprintln!("Usage: deskchat say <prompt>");
        std::process::exit(1);
    }

    let logging = LoggingState::new(log)?;
    let mut session = ChatSession::open(
        endpoint,
        SessionOptions {
            probe_message: None,
            logging: Some(logging),
        },
    );

    let reply = await_reply(&mut session, &prompt).await;
    session.shutdown().await;

    match reply {
        Ok(content) => {
            println!("{content}");
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(1);
        }
    }
}

async fn await_reply(session: &mut ChatSession, prompt: &str) -> Result<String, String> {
    while let Some(update) = session.next_update().await {
        match update {
            SessionUpdate::Connected { .. } => {
                session.submit(prompt).map_err(|err| err.to_string())?;
            }
            SessionUpdate::Reply(id) => {
                return session
                    .transcript()
                    .get(id)
                    .map(|entry| entry.content().to_string())
                    .ok_or_else(|| format!("reply {id} missing from transcript"));
            }
            SessionUpdate::DroppedFrame(frame) => {
                return Err(format!("unreadable reply from server: {frame}"));
            }
            SessionUpdate::Failed(cause) => return Err(cause.to_string()),
            SessionUpdate::Closed { code, reason } => {
                return Err(if reason.is_empty() {
                    format!("connection closed before a reply arrived (code {code})")
                } else {
                    format!("connection closed before a reply arrived (code {code}: {reason})")
                });
            }
        }
    }

    Err("connection ended before a reply arrived".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{unreachable_endpoint, within, TestServer};

    #[tokio::test]
    async fn reply_is_returned() {
        let mut server = TestServer::spawn().await;
        let mut session = ChatSession::open(server.endpoint.clone(), SessionOptions::default());

        let reply = tokio::spawn(async move {
            let reply = await_reply(&mut session, "Hello").await;
            session.shutdown().await;
            reply
        });
        server.next_observed().await;
        server.reply(r#"{"response":"Hi there"}"#);

        assert_eq!(within(reply).await.unwrap(), Ok("Hi there".to_string()));
    }

    #[tokio::test]
    async fn malformed_reply_is_an_error() {
        let mut server = TestServer::spawn().await;
        let mut session = ChatSession::open(server.endpoint.clone(), SessionOptions::default());

        let reply = tokio::spawn(async move { await_reply(&mut session, "Hello").await });
        server.next_observed().await;
        server.reply("not json");

        let err = within(reply).await.unwrap().unwrap_err();
        assert!(err.starts_with("unreadable reply"), "{err}");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let mut session =
            ChatSession::open(unreachable_endpoint().await, SessionOptions::default());

        let err = within(await_reply(&mut session, "Hello")).await.unwrap_err();

        assert!(err.contains("connection failed"), "{err}");
    }
}
