use crate::{COMMAND_TARGET, CONSOLE_TARGET, CONVERSATION_TARGET, Data, ERROR_TARGET, Error};
use poise::serenity_prelude::Message;
use poise::{Context, FrameworkError};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::{Targets, filter_fn},
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default log directory name
pub const LOG_DIR: &str = "logs";
/// Command log file name
pub const COMMAND_LOG_FILE: &str = "commands";
/// Conversation log file name
pub const CONVERSATION_LOG_FILE: &str = "conversations";

/// Initialize the logging system with console and file outputs
pub fn init(log_dir: &Path) -> Result<(), Error> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    // Set up file appenders with daily rotation
    let command_file = RollingFileAppender::new(Rotation::DAILY, log_dir, COMMAND_LOG_FILE);
    let conversation_file =
        RollingFileAppender::new(Rotation::DAILY, log_dir, CONVERSATION_LOG_FILE);

    // Create a layer for console output (human-readable format), without chat traffic
    let console_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(true)
        .with_filter(filter_fn(is_operational));

    // Everything except chat traffic goes to the command log (JSON format)
    let command_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(command_file)
        .with_filter(filter_fn(is_operational));

    let conversation_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .json()
        .with_writer(conversation_file)
        .with_filter(Targets::new().with_target(CONVERSATION_TARGET, tracing::Level::INFO));

    // Default to INFO level if not specified, but filter out serenity heartbeat logs
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info").add_directive("serenity=error".parse()?),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(command_layer)
        .with(conversation_layer)
        .try_init()?;

    info!("Logging system initialized in {}", log_dir.display());
    Ok(())
}

/// Everything but the conversation log
fn is_operational(meta: &tracing::Metadata<'_>) -> bool {
    meta.target() != CONVERSATION_TARGET
}

fn guild_label(ctx: Context<'_, Data, Error>) -> String {
    ctx.guild_id()
        .map_or_else(|| "DM".to_string(), |id| id.get().to_string())
}

/// Log the start of a command execution (pre-command hook)
pub async fn log_command_start(ctx: Context<'_, Data, Error>) {
    // Picked up again by the post-command hook of the same invocation
    ctx.set_invocation_data(Instant::now()).await;

    let command_name = ctx.command().qualified_name.clone();
    let guild_id = guild_label(ctx);
    let user_id = ctx.author().id.get().to_string();

    let args = if ctx.command().parameters.is_empty() {
        String::new()
    } else {
        format!("{:?}", ctx.invocation_string())
    };

    info!(
        target: COMMAND_TARGET,
        command = %command_name,
        guild_id = %guild_id,
        user_id = %user_id,
        arguments = %args,
        event = "start",
        "Command execution started"
    );
}

/// Log the end of a command execution (post-command hook)
pub async fn log_command_end(ctx: Context<'_, Data, Error>) {
    let duration = ctx
        .invocation_data::<Instant>()
        .await
        .map(|start| start.elapsed());

    let command_name = ctx.command().qualified_name.clone();
    let guild_id = guild_label(ctx);
    let user_id = ctx.author().id.get().to_string();

    let duration_ms = u64::try_from(duration.map_or(0, |d| d.as_millis())).unwrap_or_default();
    info!(
        target: COMMAND_TARGET,
        command = %command_name,
        guild_id = %guild_id,
        user_id = %user_id,
        duration_ms = duration_ms,
        event = "end",
        "Command execution completed"
    );
}

/// Log errors that occur during command execution
pub fn log_command_error(error: &FrameworkError<'_, Data, Error>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            let command_name = ctx.command().qualified_name.clone();
            let user_id = ctx.author().id.get().to_string();

            error!(
                target: ERROR_TARGET,
                command = %command_name,
                guild_id = %guild_label(*ctx),
                user_id = %user_id,
                error = %error,
                "Command error"
            );
        }
        FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let command_name = ctx.command().qualified_name.clone();
            let missing = missing_permissions
                .map_or_else(|| "unknown".to_string(), |p| p.to_string());

            error!(
                target: ERROR_TARGET,
                command = %command_name,
                guild_id = %guild_label(*ctx),
                user_id = %ctx.author().id,
                missing_permissions = %missing,
                "Command rejected, missing permissions"
            );
        }
        FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let command_name = ctx.command().qualified_name.clone();
            let user_id = ctx.author().id.get().to_string();

            let error_msg = error
                .as_ref()
                .map_or_else(|| "Check failed".to_string(), ToString::to_string);

            error!(
                target: ERROR_TARGET,
                command = %command_name,
                guild_id = %guild_label(*ctx),
                user_id = %user_id,
                error = %error_msg,
                "Command check failed"
            );
        }
        err => {
            error!(
                target: ERROR_TARGET,
                error_type = %std::any::type_name::<FrameworkError<'_, Data, Error>>(),
                error = ?err,
                "Other framework error"
            );
        }
    }
}

/// Record a chat message in the conversation log
pub fn log_conversation(message: &Message) {
    let guild_id = message
        .guild_id
        .map_or_else(|| "DM".to_string(), |id| id.get().to_string());

    info!(
        target: CONVERSATION_TARGET,
        timestamp = %message.timestamp,
        guild_id = %guild_id,
        channel_id = %message.channel_id,
        author = %message.author.name,
        author_id = %message.author.id,
        content = %message.content,
        "Message"
    );
}

pub fn log_console(message: String) {
    info!(
        target: CONSOLE_TARGET,
        message = %message,
        event = "console",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{Level, Metadata, callsite::Identifier, field::FieldSet, metadata::Kind};

    struct NoCallsite;
    impl tracing::Callsite for NoCallsite {
        fn set_interest(&self, _: tracing::subscriber::Interest) {}
        fn metadata(&self) -> &Metadata<'_> {
            unimplemented!()
        }
    }
    static CALLSITE: NoCallsite = NoCallsite;

    fn metadata_for(target: &'static str) -> Metadata<'static> {
        Metadata::new(
            "event",
            target,
            Level::INFO,
            None,
            None,
            None,
            FieldSet::new(&[], Identifier(&CALLSITE)),
            Kind::EVENT,
        )
    }

    #[test]
    fn test_chat_traffic_stays_out_of_console_and_command_log() {
        assert!(!is_operational(&metadata_for(CONVERSATION_TARGET)));
        assert!(is_operational(&metadata_for(COMMAND_TARGET)));
        assert!(is_operational(&metadata_for(crate::LEDGER_TARGET)));
    }
}
