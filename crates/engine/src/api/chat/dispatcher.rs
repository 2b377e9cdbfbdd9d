//! Command dispatch: parse, authorize, resolve, run, reply.

use std::future::Future;
use std::sync::Arc;

use tf2bdd_domain::SteamId;

use crate::infrastructure::ports::{ChatSession, RepoError};
use crate::use_cases::registry::{CommandError, RegistryCommands, STORE_TIMEOUT};
use crate::use_cases::steam_id::{SteamIdResolver, DEFAULT_RESOLVE_TIMEOUT};

use super::parser::{self, Action, Command, Verb};
use super::IncomingMessage;

/// Turns chat messages into registry commands.
///
/// Holds no per-message state; every call is independent and may run
/// concurrently with others.
pub struct CommandDispatcher {
    commands: Arc<RegistryCommands>,
    resolver: Arc<SteamIdResolver>,
    allowed_roles: Vec<u64>,
}

impl CommandDispatcher {
    pub fn new(
        commands: Arc<RegistryCommands>,
        resolver: Arc<SteamIdResolver>,
        allowed_roles: Vec<u64>,
    ) -> Self {
        Self {
            commands,
            resolver,
            allowed_roles,
        }
    }

    /// The reply for `message`, or `None` when the bot should stay silent
    /// (own messages and anything that is not a command).
    pub async fn handle(
        &self,
        session: &dyn ChatSession,
        message: &IncomingMessage,
    ) -> Option<String> {
        if message.author_id == session.bot_user_id() {
            return None;
        }

        let command = match parser::parse(&message.content)? {
            Ok(command) => command,
            Err(too_few) => return Some(too_few.to_string()),
        };
        let verb = command.verb();

        tracing::debug!(
            verb = %verb,
            author = message.author_id,
            channel = message.channel_id,
            "Handling command"
        );

        let reply = match self.run(session, message, command).await {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_internal() {
                    tracing::error!(verb = %verb, author = message.author_id, error = %e, "Command failed");
                } else {
                    tracing::debug!(verb = %verb, author = message.author_id, error = %e, "Command rejected");
                }
                e.user_message()
            }
        };
        Some(reply)
    }

    async fn run(
        &self,
        session: &dyn ChatSession,
        message: &IncomingMessage,
        command: Command,
    ) -> Result<String, CommandError> {
        let verb = command.verb();
        if verb.requires_role() {
            self.authorize(session, message).await?;
        }

        match command {
            Command::Targeted { target, action } => {
                let steam_id = self.resolve(target).await?;
                with_store_deadline(verb, self.apply(steam_id, action, message)).await
            }
            Command::Count => with_store_deadline(verb, self.commands.stats.execute()).await,
            // Store calls are bounded one by one inside the import.
            Command::Import => {
                self.commands
                    .import
                    .execute(&message.attachments, message.author_id)
                    .await
            }
            Command::Link => Ok(self.commands.link()),
        }
    }

    async fn resolve(&self, token: String) -> Result<SteamId, CommandError> {
        self.resolver
            .resolve(&token, DEFAULT_RESOLVE_TIMEOUT)
            .await
            .map_err(|e| {
                tracing::debug!(token = %token, error = %e, "Resolution failed");
                CommandError::ResolutionFailed(token)
            })
    }

    /// Fail-closed role check. No guild (a direct message) means no roles.
    async fn authorize(
        &self,
        session: &dyn ChatSession,
        message: &IncomingMessage,
    ) -> Result<(), CommandError> {
        let Some(guild_id) = message.guild_id else {
            return Err(CommandError::Unauthorized);
        };

        let roles = session
            .member_roles(guild_id, message.author_id)
            .await
            .map_err(|e| {
                tracing::error!(guild_id, user = message.author_id, error = %e, "Failed to lookup role data");
                CommandError::RoleLookupFailed
            })?;

        if roles.iter().any(|role| self.allowed_roles.contains(role)) {
            Ok(())
        } else {
            Err(CommandError::Unauthorized)
        }
    }

    async fn apply(
        &self,
        steam_id: SteamId,
        action: Action,
        message: &IncomingMessage,
    ) -> Result<String, CommandError> {
        let commands = &self.commands;
        match action {
            Action::Add { attributes } => {
                commands.add.execute(steam_id, &attributes, message.author_id).await
            }
            Action::Delete => commands.delete.execute(steam_id).await,
            Action::Check => commands.check.execute(steam_id).await,
            Action::SteamId => Ok(commands.steam_id(steam_id)),
            Action::AddProof { proof } => commands.add_proof.execute(steam_id, &proof).await,
        }
    }
}

/// Bound a handler by [`STORE_TIMEOUT`]; expiry reads as a store failure.
async fn with_store_deadline(
    verb: Verb,
    handler: impl Future<Output = Result<String, CommandError>>,
) -> Result<String, CommandError> {
    tokio::time::timeout(STORE_TIMEOUT, handler)
        .await
        .map_err(|_| CommandError::StoreUnavailable(RepoError::database(verb.name(), "timed out")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        ChatError, MockChatSession, MockDocumentFetcher, MockVanityResolver, PlayerRepo,
        StalledPlayerRepo,
    };
    use crate::infrastructure::sqlite::SqlitePlayerRepo;
    use crate::use_cases::registry::Attachment;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    const BOT: u64 = 1;
    const MODERATOR: u64 = 500;
    const STRANGER: u64 = 600;
    const GUILD: u64 = 9000;
    const MOD_ROLE: u64 = 42;
    const KNOWN: &str = "76561198003911389";

    fn session() -> MockChatSession {
        let mut session = MockChatSession::new();
        session.expect_bot_user_id().return_const(BOT);
        session
            .expect_member_roles()
            .with(eq(GUILD), eq(MODERATOR))
            .returning(|_, _| Ok(vec![7, MOD_ROLE]));
        session
            .expect_member_roles()
            .with(eq(GUILD), eq(STRANGER))
            .returning(|_, _| Ok(vec![7]));
        session
    }

    fn message(author_id: u64, content: &str) -> IncomingMessage {
        IncomingMessage {
            guild_id: Some(GUILD),
            channel_id: 77,
            author_id,
            content: content.to_string(),
            attachments: Vec::new(),
        }
    }

    async fn dispatcher_with(fetcher: MockDocumentFetcher) -> (CommandDispatcher, Arc<SqlitePlayerRepo>) {
        let repo = Arc::new(SqlitePlayerRepo::in_memory().await.expect("repo"));
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date"),
        ));
        let commands = Arc::new(RegistryCommands::new(
            repo.clone(),
            Arc::new(fetcher),
            clock,
            "http://localhost:8899/v1/steamids",
        ));
        let resolver = Arc::new(SteamIdResolver::new(Arc::new(MockVanityResolver::new())));
        (
            CommandDispatcher::new(commands, resolver, vec![MOD_ROLE]),
            repo,
        )
    }

    async fn dispatcher() -> (CommandDispatcher, Arc<SqlitePlayerRepo>) {
        dispatcher_with(MockDocumentFetcher::new()).await
    }

    async fn send(dispatcher: &CommandDispatcher, author: u64, content: &str) -> Option<String> {
        dispatcher.handle(&session(), &message(author, content)).await
    }

    #[tokio::test]
    async fn ignores_own_messages_and_chatter() {
        let (dispatcher, _) = dispatcher().await;
        assert_eq!(send(&dispatcher, BOT, "!count").await, None);
        assert_eq!(send(&dispatcher, MODERATOR, "good game everyone").await, None);
        assert_eq!(send(&dispatcher, MODERATOR, "!unknown 123").await, None);
    }

    #[tokio::test]
    async fn other_bots_are_answered_like_anyone() {
        const OTHER_BOT: u64 = 2;
        let (dispatcher, _) = dispatcher().await;
        let mut session = MockChatSession::new();
        session.expect_bot_user_id().return_const(BOT);
        session
            .expect_member_roles()
            .with(eq(GUILD), eq(OTHER_BOT))
            .returning(|_, _| Ok(Vec::new()));

        let count = dispatcher.handle(&session, &message(OTHER_BOT, "!count")).await;
        assert_eq!(count.as_deref(), Some("```\ntotal: 0\n```"));
        let add = dispatcher
            .handle(&session, &message(OTHER_BOT, "!add 76561198003911389"))
            .await;
        assert_eq!(add.as_deref(), Some("Unauthorized"));
    }

    #[tokio::test]
    async fn reports_missing_arguments() {
        let (dispatcher, _) = dispatcher().await;
        assert_eq!(
            send(&dispatcher, MODERATOR, "!add").await.as_deref(),
            Some("Command requires at least 2 args")
        );
        assert_eq!(
            send(&dispatcher, STRANGER, "!addproof 123").await.as_deref(),
            Some("Command requires at least 3 args")
        );
    }

    #[tokio::test]
    async fn add_then_check_end_to_end() {
        let (dispatcher, repo) = dispatcher().await;

        let reply = send(&dispatcher, MODERATOR, "!add 76561198003911389 cheater racist")
            .await
            .expect("reply");
        assert!(reply.contains(KNOWN), "{reply}");

        let sid: SteamId = KNOWN.parse().expect("valid id");
        let stored = repo.get(sid).await.expect("get").expect("stored");
        assert_eq!(stored.attributes.join(","), "cheater,racist");
        assert_eq!(stored.author, MODERATOR);

        let report = send(&dispatcher, MODERATOR, "!check STEAM_0:1:21822830")
            .await
            .expect("reply");
        assert!(report.contains("**Attributes:** cheater, racist"), "{report}");
        assert!(report.contains(&format!("<@{MODERATOR}>")));
    }

    #[tokio::test]
    async fn duplicate_add_leaves_count_unchanged() {
        let (dispatcher, repo) = dispatcher().await;
        send(&dispatcher, MODERATOR, "!add 76561198003911389").await;

        let reply = send(&dispatcher, MODERATOR, "!add [U:1:43645661] bot").await;
        assert_eq!(reply.as_deref(), Some("Duplicate steam id: 76561198003911389"));
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn deleting_unknown_player_is_not_found() {
        let (dispatcher, repo) = dispatcher().await;
        let reply = send(&dispatcher, MODERATOR, "!del 76561198003911389").await;
        assert_eq!(
            reply.as_deref(),
            Some("Steam id does not exist in database: 76561198003911389")
        );
        assert_eq!(repo.count().await.expect("count"), 0);

        send(&dispatcher, MODERATOR, "!add 76561198003911389").await;
        assert_eq!(
            send(&dispatcher, MODERATOR, "!del 76561198003911389").await.as_deref(),
            Some("Dropped entry successfully: 76561198003911389")
        );
        assert_eq!(repo.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn proof_lifecycle() {
        let (dispatcher, _) = dispatcher().await;
        send(&dispatcher, MODERATOR, "!add 76561198003911389").await;

        assert_eq!(
            send(&dispatcher, MODERATOR, "!addproof 76561198003911389 https://example.com/one")
                .await
                .as_deref(),
            Some("Added proof entry successfully")
        );
        assert_eq!(
            send(&dispatcher, MODERATOR, "!addproof 76561198003911389 https://example.com/one")
                .await
                .as_deref(),
            Some("Duplicate proof provided")
        );
        send(&dispatcher, MODERATOR, "!addproof 76561198003911389 spun   around in spawn").await;

        let report = send(&dispatcher, MODERATOR, "!check 76561198003911389")
            .await
            .expect("reply");
        let first = report.find("**Proof #0:** <https://example.com/one>").expect("first proof");
        let second = report.find("**Proof #1:** spun around in spawn").expect("second proof");
        assert!(first < second);
    }

    #[tokio::test]
    async fn count_reflects_attributes() {
        let (dispatcher, _) = dispatcher().await;
        assert_eq!(
            send(&dispatcher, STRANGER, "!count").await.as_deref(),
            Some("```\ntotal: 0\n```")
        );

        send(&dispatcher, MODERATOR, "!add 76561198003911389 cheater suspicious").await;
        let reply = send(&dispatcher, STRANGER, "!count").await.expect("reply");
        assert!(reply.contains("total     : 1"), "{reply}");
        assert!(reply.contains("cheater   : 1"), "{reply}");
        assert!(reply.contains("suspicious: 1"), "{reply}");
    }

    #[tokio::test]
    async fn authorization_matrix() {
        let (dispatcher, repo) = dispatcher().await;
        for content in [
            "!add 76561198003911389",
            "!del 76561198003911389",
            "!check 76561198003911389",
            "!import",
            "!addproof 76561198003911389 clip",
            "!link",
        ] {
            assert_eq!(
                send(&dispatcher, STRANGER, content).await.as_deref(),
                Some("Unauthorized"),
                "{content}"
            );
        }
        assert_eq!(repo.count().await.expect("count"), 0);

        let reply = send(&dispatcher, STRANGER, "!steamid 76561198003911389")
            .await
            .expect("reply");
        assert!(reply.contains("STEAM_0:1:21822830"));
        assert!(send(&dispatcher, STRANGER, "!count").await.is_some());
    }

    #[tokio::test]
    async fn exempt_verbs_never_query_roles() {
        let (dispatcher, _) = dispatcher().await;
        let mut session = MockChatSession::new();
        session.expect_bot_user_id().return_const(BOT);
        session.expect_member_roles().never();

        let reply = dispatcher
            .handle(&session, &message(STRANGER, "!steamid 43645661"))
            .await
            .expect("reply");
        assert!(reply.contains("Steam64: 76561198003911389"));
    }

    #[tokio::test]
    async fn role_lookup_failure_is_fail_closed() {
        let (dispatcher, repo) = dispatcher().await;
        let mut session = MockChatSession::new();
        session.expect_bot_user_id().return_const(BOT);
        session
            .expect_member_roles()
            .returning(|_, _| Err(ChatError::RoleLookup("gateway down".into())));

        let reply = dispatcher
            .handle(&session, &message(MODERATOR, "!add 76561198003911389"))
            .await;
        assert_eq!(reply.as_deref(), Some("Failed to lookup role data"));
        assert_eq!(repo.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn direct_messages_are_unauthorized() {
        let (dispatcher, _) = dispatcher().await;
        let mut dm = message(MODERATOR, "!add 76561198003911389");
        dm.guild_id = None;
        assert_eq!(
            dispatcher.handle(&session(), &dm).await.as_deref(),
            Some("Unauthorized")
        );
    }

    #[tokio::test]
    async fn unresolvable_target_echoes_token() {
        let (dispatcher, _) = dispatcher().await;
        assert_eq!(
            send(&dispatcher, MODERATOR, "!check STEAM_0:9:1").await.as_deref(),
            Some("Cannot resolve steam id: STEAM_0:9:1")
        );
    }

    #[tokio::test]
    async fn link_is_wrapped() {
        let (dispatcher, _) = dispatcher().await;
        assert_eq!(
            send(&dispatcher, MODERATOR, "!link").await.as_deref(),
            Some("<http://localhost:8899/v1/steamids>")
        );
    }

    #[tokio::test]
    async fn import_skips_known_players() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch().returning(|_| {
            Ok(br#"{"players": [
                {"steamid": "76561198003911389", "attributes": ["cheater"]},
                {"steamid": "76561197960265729", "attributes": ["bot"]},
                {"steamid": "76561197960265730", "attributes": ["racist"]}
            ]}"#
            .to_vec())
        });
        let (dispatcher, repo) = dispatcher_with(fetcher).await;
        send(&dispatcher, MODERATOR, "!add 76561198003911389").await;

        let mut msg = message(MODERATOR, "!import");
        msg.attachments
            .push(Attachment::new("list.json", "https://cdn.example.com/list.json"));
        let reply = dispatcher.handle(&session(), &msg).await.expect("reply");
        assert_eq!(reply, "Loaded 2 new players");
        assert_eq!(repo.count().await.expect("count"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_still_gets_a_reply() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch().never();
        let commands = Arc::new(RegistryCommands::new(
            Arc::new(StalledPlayerRepo),
            Arc::new(fetcher),
            Arc::new(FixedClock(Utc::now())),
            "http://localhost:8899/v1/steamids",
        ));
        let resolver = Arc::new(SteamIdResolver::new(Arc::new(MockVanityResolver::new())));
        let dispatcher = CommandDispatcher::new(commands, resolver, vec![MOD_ROLE]);

        let mut import = message(MODERATOR, "!import");
        import
            .attachments
            .push(Attachment::new("list.json", "https://cdn.example.com/list.json"));
        assert_eq!(
            dispatcher.handle(&session(), &import).await.as_deref(),
            Some("Database error, please try again")
        );
        for content in ["!count", "!check 76561198003911389"] {
            assert_eq!(
                send(&dispatcher, MODERATOR, content).await.as_deref(),
                Some("Database error, please try again"),
                "{content}"
            );
        }
    }
}
