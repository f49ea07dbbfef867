//! Echo bot demo.
//!
//! Builds an [`App`] with three routes — a catch-all logger, a message
//! echo, and a `task/fetch` invoke handler — then feeds it a handful of
//! wire-format payloads and prints what came back, including the replies
//! captured by the in-memory sink.
//!
//! ```text
//! cargo run -p echo-bot -- --log info,braze=debug
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::info;

use braze::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "echo-bot", about = "Braze echo bot demo")]
struct Args {
    /// Log filter directive.
    #[arg(long, default_value = "info,braze=debug")]
    log: String,

    /// Optional configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Catch-all route: log every inbound activity, then fall through.
async fn log_all(ctx: TurnContext) -> HandlerResult {
    info!(
        activity = ctx.activity().type_tag(),
        id = ctx.activity().id().unwrap_or("-"),
        "inbound activity"
    );
    ctx.next().await
}

/// Echo route: reply with the inbound text.
async fn echo(ctx: TurnContext, msg: ActivityContext<MessageActivity>) -> HandlerResult {
    ctx.reply(format!("you said: {}", msg.text)).await?;
    Ok(None)
}

/// Greet members added to the conversation.
async fn welcome(ctx: TurnContext) -> HandlerResult {
    let Activity::ConversationUpdate(update) = ctx.activity() else {
        return Ok(None);
    };
    for member in &update.members_added {
        ctx.reply(format!("welcome, {}!", member.name.as_deref().unwrap_or("friend")))
            .await?;
    }
    Ok(None)
}

/// `task/fetch` route: return a structured task module body.
async fn fetch_task(invoke: ActivityContext<InvokeActivity>) -> serde_json::Value {
    let theme = match invoke.payload() {
        InvokePayload::TaskFetch(request) => request
            .context
            .as_ref()
            .and_then(|c| c.theme.as_deref())
            .unwrap_or("default")
            .to_string(),
        _ => "default".to_string(),
    };
    json!({
        "task": {
            "type": "continue",
            "value": { "title": "Echo settings", "theme": theme }
        }
    })
}

fn sample_payloads() -> Vec<serde_json::Value> {
    vec![
        json!({
            "type": "message",
            "id": "msg-1",
            "text": "hello braze",
            "from": { "id": "user-7", "name": "Kai" },
            "recipient": { "id": "bot-1", "role": "bot" },
            "conversation": { "id": "conv-3" },
            "serviceUrl": "https://smba.example.com/emea"
        }),
        json!({
            "type": "conversationUpdate",
            "id": "upd-1",
            "conversation": { "id": "conv-3" },
            "membersAdded": [{ "id": "user-9", "name": "Ada" }]
        }),
        json!({
            "type": "invoke",
            "id": "inv-1",
            "name": "task/fetch",
            "value": { "context": { "theme": "dark" } }
        }),
        // Unknown top-level tag: decodes generically, only the logger runs.
        json!({ "type": "delivery/receipt", "id": "d-1" }),
        // Unknown invoke name: rejected before dispatch.
        json!({ "type": "invoke", "id": "inv-2", "name": "compose/query" }),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = BrazeConfig::load_from(args.config.as_deref())?;
    let _guard = LoggingBuilder::new().directive(args.log).try_init()?;

    let sink = Arc::new(MemorySink::new());
    let app = App::new()
        .with_sink(Arc::clone(&sink) as BoxedSink)
        .route(on_any().handler(log_all))
        .route(on_message().handler(echo))
        .route(on_conversation_update().handler(welcome))
        .route(on_invoke(InvokeName::TaskFetch).handler(fetch_task));

    info!(
        routes = app.dispatcher().route_count(),
        queue_capacity = config.runtime.queue_capacity,
        "echo bot ready"
    );

    for payload in sample_payloads() {
        let response = app.process_value(&payload).await;
        println!(
            "{} -> status {}{}",
            payload["type"].as_str().unwrap_or("?"),
            response.status,
            response
                .body
                .map(|body| format!(", body {body}"))
                .unwrap_or_default()
        );
    }

    for reply in sink.drain() {
        if let Activity::Message(message) = reply {
            println!(
                "outbound to {}: {}",
                message
                    .recipient
                    .as_ref()
                    .map(|r| r.id.as_str())
                    .unwrap_or("?"),
                message.text
            );
        }
    }

    Ok(())
}
