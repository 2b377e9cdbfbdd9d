//! Discord gateway adapter.
//!
//! Converts serenity events into [`IncomingMessage`]s for the dispatcher and
//! posts the reply back to the originating channel.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    Client, Context, EventHandler, GatewayIntents, Guild, GuildId, Message, Ready, ShardManager,
    UserId,
};

use crate::api::chat::{CommandDispatcher, IncomingMessage};
use crate::infrastructure::ports::{ChatError, ChatSession};
use crate::use_cases::registry::Attachment;

/// Discord rejects messages longer than this.
pub const MAX_MESSAGE_LEN: usize = 2000;

const FENCE: &str = "```";

/// [`ChatSession`] backed by a live serenity context.
struct SerenitySession<'a> {
    ctx: &'a Context,
}

#[async_trait]
impl ChatSession for SerenitySession<'_> {
    fn bot_user_id(&self) -> u64 {
        self.ctx.cache.current_user().id.get()
    }

    async fn member_roles(&self, guild: u64, user: u64) -> Result<Vec<u64>, ChatError> {
        if guild == 0 || user == 0 {
            return Err(ChatError::RoleLookup(format!(
                "invalid member reference {guild}/{user}"
            )));
        }
        let member = GuildId::new(guild)
            .member(self.ctx, UserId::new(user))
            .await
            .map_err(|e| ChatError::RoleLookup(e.to_string()))?;
        Ok(member.roles.iter().map(|role| role.get()).collect())
    }
}

/// Serenity event handler feeding the command dispatcher.
pub struct DiscordHandler {
    dispatcher: Arc<CommandDispatcher>,
}

impl DiscordHandler {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }
}

fn to_incoming(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        guild_id: msg.guild_id.map(|id| id.get()),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment::new(a.filename.clone(), a.url.clone()))
            .collect(),
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        let session = SerenitySession { ctx: &ctx };
        let Some(reply) = self.dispatcher.handle(&session, &to_incoming(&msg)).await else {
            return;
        };

        for chunk in split_reply(&reply, MAX_MESSAGE_LEN) {
            if let Err(e) = msg.channel_id.say(&ctx.http, chunk).await {
                tracing::error!(
                    channel = msg.channel_id.get(),
                    error = %e,
                    "Failed to send reply"
                );
                break;
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Bot connected"
        );
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: Option<bool>) {
        tracing::info!(
            guild_id = guild.id.get(),
            name = %guild.name,
            is_new = ?is_new,
            "Joined guild"
        );
    }
}

/// Build the gateway client. Call `start` on the result to connect.
pub async fn build_client(
    token: &str,
    dispatcher: Arc<CommandDispatcher>,
) -> Result<Client, serenity::Error> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(token, intents)
        .event_handler(DiscordHandler::new(dispatcher))
        .await
}

/// Stop every shard; used on shutdown.
pub async fn shutdown(shard_manager: Arc<ShardManager>) {
    shard_manager.shutdown_all().await;
    tracing::info!("Discord shards stopped");
}

/// Split `text` into pieces of at most `limit` bytes, preferring line
/// breaks. Lines that do not fit are cut on char boundaries. A code block
/// spanning a split is closed at the end of one piece and reopened at the
/// start of the next.
pub fn split_reply(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut splitter = ReplySplitter::new(limit);
    for line in text.split('\n') {
        let mut rest = line;
        while rest.len() > splitter.budget {
            let mut cut = splitter.budget;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            if cut == 0 {
                cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
            }
            let (head, tail) = rest.split_at(cut);
            splitter.flush();
            splitter.push_line(head);
            splitter.flush();
            rest = tail;
        }
        splitter.push_line(rest);
    }
    splitter.finish()
}

struct ReplySplitter {
    /// Body bytes per chunk, leaving room for a reopened and a closing fence.
    budget: usize,
    chunks: Vec<String>,
    current: String,
    lines: usize,
    reopened: bool,
    in_fence: bool,
}

impl ReplySplitter {
    fn new(limit: usize) -> Self {
        Self {
            budget: limit.saturating_sub(2 * (FENCE.len() + 1)).max(1),
            chunks: Vec::new(),
            current: String::new(),
            lines: 0,
            reopened: false,
            in_fence: false,
        }
    }

    fn push_line(&mut self, line: &str) {
        if self.lines > 0 && self.current.len() + 1 + line.len() > self.budget {
            self.flush();
        }
        if self.lines > 0 {
            self.current.push('\n');
        }
        self.current.push_str(line);
        self.lines += 1;
        if line.matches(FENCE).count() % 2 == 1 {
            self.in_fence = !self.in_fence;
        }
    }

    fn flush(&mut self) {
        if self.lines == 0 {
            return;
        }
        let mut chunk = String::with_capacity(self.current.len() + 2 * (FENCE.len() + 1));
        if self.reopened {
            chunk.push_str(FENCE);
            chunk.push('\n');
        }
        chunk.push_str(&self.current);
        if self.in_fence {
            chunk.push('\n');
            chunk.push_str(FENCE);
        }
        self.chunks.push(chunk);
        self.current.clear();
        self.lines = 0;
        self.reopened = self.in_fence;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}
