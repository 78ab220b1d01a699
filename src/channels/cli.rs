//! CLI channel — stdin/stdout REPL for local testing of the dialog flow.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::session::{MessageKind, Sender, SessionEvent, SessionManager};

/// Run a single interactive session against stdin/stdout.
///
/// `/refresh` resets the session, `/quit` exits.
pub async fn run(sessions: Arc<SessionManager>) -> anyhow::Result<()> {
    let (handle, mut events) = sessions.create().await;

    // Printer task: render session events as they arrive.
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::Typing { active: true } => eprintln!("⏳ typing..."),
                SessionEvent::Typing { active: false } => {}
                SessionEvent::Message { message } => {
                    if message.sender == Sender::User {
                        continue; // The user just typed it.
                    }
                    match message.kind {
                        MessageKind::Text { text } => {
                            println!("\n{text}\n");
                            eprint!("> ");
                        }
                        MessageKind::Chart { .. } => {
                            println!("\n🪐 [kundli chart received]\n");
                            eprint!("> ");
                        }
                    }
                }
                SessionEvent::Step { step } => eprintln!("ℹ️  step: {step}"),
                SessionEvent::Cleared => eprintln!("ℹ️  session refreshed"),
            }
        }
    });

    handle.start().await;

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();
    eprint!("> ");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        match line.as_str() {
            "/quit" => break,
            "/refresh" => handle.refresh().await,
            _ => {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move {
                    handle.handle_user_message(&line).await;
                });
            }
        }
    }

    sessions.remove(handle.id).await;
    printer.abort();
    Ok(())
}
