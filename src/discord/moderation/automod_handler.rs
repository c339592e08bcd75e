// Discord-specific automod handling - builds a platform-neutral snapshot of
// each gateway message and feeds it to the core pipeline.

use crate::core::automod::{AuthorPermissions, AutoModAction, MessageEvent};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Run the automod pipeline for an inbound message.
///
/// Returns `true` if the message triggered an automod action.
pub async fn handle_message_for_automod(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<bool, Error> {
    // Skip bots
    if msg.author.bot {
        return Ok(false);
    }

    // Only check guild messages
    let guild_id = match msg.guild_id {
        Some(id) => id,
        None => return Ok(false),
    };

    let event = MessageEvent {
        guild_id: Some(guild_id.get()),
        channel_id: msg.channel_id.get(),
        message_id: msg.id.get(),
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        author_permissions: author_permissions(ctx, guild_id, msg.author.id),
        content: msg.content.clone(),
    };

    let now = data.clock.now_secs();
    let action = data.automod.handle_message(&event, &data.config, now).await;

    match &action {
        AutoModAction::WordFilter { matched_word } => {
            tracing::info!(
                author_id = event.author_id,
                guild_id = guild_id.get(),
                word = matched_word.as_str(),
                "Removed message containing a filtered word"
            );
        }
        AutoModAction::Spam => {
            tracing::info!(
                author_id = event.author_id,
                guild_id = guild_id.get(),
                "Spam threshold reached, author timed out"
            );
        }
        AutoModAction::None => {}
    }

    Ok(!matches!(action, AutoModAction::None))
}

/// Read the author's guild-wide permission flags from the cache.
///
/// An author missing from the cache is treated as unprivileged so the
/// checks still run; failing open would disable automod whenever the
/// member cache is cold.
fn author_permissions(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> AuthorPermissions {
    let perms = ctx.cache.guild(guild_id).and_then(|guild| {
        guild
            .members
            .get(&user_id)
            .map(|member| guild.member_permissions(member))
    });

    match perms {
        Some(p) => AuthorPermissions {
            manage_messages: p.manage_messages(),
            kick_members: p.kick_members(),
            ban_members: p.ban_members(),
        },
        None => AuthorPermissions::default(),
    }
}
