use crate::ledger::{LedgerError, WarningRecord};
use crate::{COMMAND_TARGET, Context, ERROR_TARGET, Error};
use poise::serenity_prelude::{self as serenity, Mentionable, UserId};
use poise::{CreateReply, command};
use tracing::{error, info};

/// Discord's cap on the length of a single message, in characters
const MESSAGE_LIMIT: usize = 2000;

/// Give a member a warning
///
/// The warning is stored in the server's infraction history.
#[command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] member: serenity::Member,
    #[description = "Reason for the warning"] reason: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server")?;
    let moderator = ctx.author();
    let member = &member.user;

    let result = ctx
        .data()
        .record_warning(guild_id, member.id, reason.as_str(), moderator.id)
        .await?;

    match result {
        Ok(()) => {
            info!(
                target: COMMAND_TARGET,
                guild_id = %guild_id,
                member = %member.name,
                member_id = %member.id,
                moderator = %moderator.name,
                moderator_id = %moderator.id,
                reason = %reason,
                "Member warned"
            );
            ctx.say(warned_message(member.id, &reason)).await?;
        }
        Err(err) => {
            error!(
                target: ERROR_TARGET,
                guild_id = %guild_id,
                member_id = %member.id,
                error = %err,
                "Failed to record warning"
            );
            reply_ephemeral(ctx, ledger_error_message(&err)).await?;
        }
    }

    Ok(())
}

/// Show a member's warnings
#[command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn infractions(
    ctx: Context<'_>,
    #[description = "Member whose warnings to show"] member: serenity::Member,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server")?;

    let warnings = ctx.data().warnings(guild_id, member.user.id).await?;

    // Long histories go out as follow-up messages
    for chunk in infractions_messages(&member.user, &warnings) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}

fn warned_message(member: UserId, reason: &str) -> String {
    format!("{} has been warned. Reason: {reason}", member.mention())
}

/// Cut `text` down to `max` characters, marking the cut with an ellipsis
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Append a line to the last message, or start a new one when it would overflow
fn push_line(messages: &mut Vec<String>, text: &str) {
    let line = format!("{}\n", truncate_chars(text, MESSAGE_LIMIT - 1));
    let line_len = line.chars().count();

    match messages.last_mut() {
        Some(last) if last.chars().count() + line_len <= MESSAGE_LIMIT => last.push_str(&line),
        _ => messages.push(line),
    }
}

/// Render a member's history as one or more messages within Discord's length limit
fn infractions_messages(member: &serenity::User, warnings: &[WarningRecord]) -> Vec<String> {
    if warnings.is_empty() {
        return vec![format!("{} has no warnings.", member.id.mention())];
    }

    let mut messages = Vec::new();
    push_line(
        &mut messages,
        &format!("**{} has {} warning(s):**", member.name, warnings.len()),
    );
    for (i, warning) in warnings.iter().enumerate() {
        // Moderators that are not snowflakes are shown verbatim
        let moderator = warning.moderator_id.user_id().map_or_else(
            || warning.moderator_id.to_string(),
            |id| id.mention().to_string(),
        );
        push_line(
            &mut messages,
            &format!("{}. Reason: {} (by {moderator})", i + 1, warning.reason),
        );
    }
    messages
}

fn ledger_error_message(err: &LedgerError) -> String {
    match err {
        LedgerError::InvalidInput(detail) => format!("Could not record the warning: {detail}."),
        LedgerError::StorageFailure(_) => {
            "The warning could not be saved, please try again later.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StorageError;
    use poise::serenity_prelude::Permissions;

    fn user(id: u64, name: &str) -> serenity::User {
        let mut user = serenity::User::default();
        user.id = UserId::new(id);
        user.name = name.to_string();
        user
    }

    #[test]
    fn test_warn_command_definition() {
        let cmd = warn();
        assert_eq!(cmd.name, "warn");
        assert!(cmd.guild_only);
        assert!(cmd.required_permissions.contains(Permissions::MODERATE_MEMBERS));
        assert_eq!(cmd.parameters.len(), 2);
        assert_eq!(cmd.parameters[0].name, "member");
        assert!(cmd.parameters.iter().all(|p| p.required));
        assert!(cmd.create_as_slash_command().is_some());
    }

    #[test]
    fn test_infractions_command_definition() {
        let cmd = infractions();
        assert_eq!(cmd.name, "infractions");
        assert!(cmd.guild_only);
        assert!(cmd.required_permissions.contains(Permissions::MODERATE_MEMBERS));
        assert_eq!(cmd.parameters.len(), 1);
        assert_eq!(cmd.parameters[0].name, "member");
        assert!(cmd.parameters[0].required);
        assert!(cmd
            .description
            .unwrap_or_default()
            .contains("Show a member's warnings"));
    }

    #[test]
    fn test_warned_message() {
        assert_eq!(
            warned_message(UserId::new(42), "spam"),
            "<@42> has been warned. Reason: spam"
        );
    }

    #[test]
    fn test_infractions_message_empty() {
        assert_eq!(
            infractions_messages(&user(42, "alice"), &[]),
            vec!["<@42> has no warnings.".to_string()]
        );
    }

    #[test]
    fn test_infractions_message_lists_in_order() {
        let warnings = [
            WarningRecord::new("spam", 1001_u64),
            WarningRecord::new("flood", "automod"),
        ];
        let msgs = infractions_messages(&user(42, "alice"), &warnings);
        assert_eq!(
            msgs,
            vec!["**alice has 2 warning(s):**\n\
             1. Reason: spam (by <@1001>)\n\
             2. Reason: flood (by automod)\n"
                .to_string()]
        );
    }

    #[test]
    fn test_long_history_is_split_within_limit() {
        let warnings: Vec<_> = (0..40)
            .map(|i| {
                WarningRecord::new(
                    format!("repeatedly posting invite links in #general after warning {i}"),
                    1_000_000_000_000_000_000_u64 + i,
                )
            })
            .collect();

        let msgs = infractions_messages(&user(42, "alice"), &warnings);
        assert!(msgs.len() > 1);
        assert!(msgs.iter().all(|m| m.chars().count() <= MESSAGE_LIMIT));
        assert!(msgs[0].starts_with("**alice has 40 warning(s):**\n"));

        // Nothing is lost or reordered across the split
        let lines: Vec<&str> = msgs.iter().flat_map(|m| m.lines()).collect();
        assert_eq!(lines.len(), 41);
        assert!(lines[1].starts_with("1. Reason:"));
        assert!(lines[40].starts_with("40. Reason:"));
        assert!(msgs.iter().all(|m| m.ends_with('\n')));
    }

    #[test]
    fn test_oversized_reason_is_truncated() {
        let warnings = [WarningRecord::new("x".repeat(5000), "automod")];
        let msgs = infractions_messages(&user(42, "alice"), &warnings);

        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].chars().count(), MESSAGE_LIMIT);
        assert!(msgs[1].ends_with("…\n"));
    }

    #[test]
    fn test_ledger_error_message() {
        let msg = ledger_error_message(&LedgerError::invalid("reason must not be empty"));
        assert_eq!(msg, "Could not record the warning: reason must not be empty.");

        let err = LedgerError::from(StorageError::Io {
            path: "infractions.yaml".into(),
            source: std::io::Error::other("disk full"),
        });
        // Storage details stay in the logs
        assert!(!ledger_error_message(&err).contains("disk full"));
    }
}
