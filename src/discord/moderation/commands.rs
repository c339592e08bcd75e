// Moderator slash commands.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call serenity (or read shared config)
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

use crate::core::automod::{AutoModConfig, AutoModService, MonotonicClock};
use crate::discord::moderation::actuator::SerenityActuator;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and the event handler.
pub struct Data {
    pub automod: Arc<AutoModService<SerenityActuator>>,
    pub config: Arc<AutoModConfig>,
    pub clock: MonotonicClock,
}

/// Discord caps member timeouts at 28 days.
const MAX_TIMEOUT: Duration = Duration::from_secs(28 * 24 * 60 * 60);

// ============================================================================
// PERMISSION CHECK
// ============================================================================

/// Moderator gate: passes if the author holds any of Manage Messages,
/// Kick Members, or Ban Members. A `check` predicate rather than
/// `required_permissions`, since any one of the three is enough.
async fn is_moderator(ctx: Context<'_>) -> Result<bool, Error> {
    let allowed = author_guild_permissions(&ctx)
        .map(|p| p.manage_messages() || p.kick_members() || p.ban_members())
        .unwrap_or(false);

    if !allowed {
        ctx.send(
            poise::CreateReply::default()
                .content(
                    "You need Manage Messages, Kick Members, or Ban Members to use this command.",
                )
                .ephemeral(true),
        )
        .await?;
    }

    Ok(allowed)
}

fn author_guild_permissions(ctx: &Context<'_>) -> Option<serenity::Permissions> {
    let guild = ctx.guild()?;
    let member = guild.members.get(&ctx.author().id)?;
    Some(guild.member_permissions(member))
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Show the active auto-moderation configuration.
#[poise::command(slash_command, guild_only, check = "is_moderator")]
pub async fn automod(ctx: Context<'_>) -> Result<(), Error> {
    let config = &ctx.data().config;

    let filter_summary = if config.word_filter.is_empty() {
        "none".to_string()
    } else {
        config.word_filter.join(", ")
    };

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "🛡️ **Auto-moderation**\n\
                 • Spam trigger: {} identical messages within {} seconds\n\
                 • Filtered words: {}",
                config.spam_threshold, config.spam_interval_secs, filter_summary
            ))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Kick a member from the server.
#[poise::command(slash_command, guild_only, check = "is_moderator")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The member to kick"] member: serenity::Member,
    #[description = "Reason for the kick"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    // DM the user before kicking, while we still share a guild (best-effort)
    dm_member(&ctx, &member, &format!("You were kicked.\nReason: {}", reason)).await;

    guild_id
        .kick_with_reason(ctx.http(), member.user.id, &reason)
        .await?;

    ctx.say(format!(
        "👢 **{}** has been kicked.\nReason: {}",
        member.user.name, reason
    ))
    .await?;
    Ok(())
}

/// Ban a member from the server.
#[poise::command(slash_command, guild_only, check = "is_moderator")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The member to ban"] member: serenity::Member,
    #[description = "Reason for the ban"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    // DM the user before banning (best-effort)
    dm_member(&ctx, &member, &format!("You were banned.\nReason: {}", reason)).await;

    guild_id
        .ban_with_reason(ctx.http(), member.user.id, 0, &reason)
        .await?;

    ctx.say(format!(
        "🔨 **{}** has been banned.\nReason: {}",
        member.user.name, reason
    ))
    .await?;
    Ok(())
}

/// Timeout (mute) a member for a given duration.
#[poise::command(slash_command, guild_only, check = "is_moderator")]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "The member to mute"] member: serenity::Member,
    #[description = "Duration, e.g. 30s, 10m, 1h, 7d (max 28d)"] duration: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let delta = match parse_duration(&duration) {
        Some(d) if d <= MAX_TIMEOUT => d,
        Some(_) => {
            ctx.send(
                poise::CreateReply::default()
                    .content("Discord limits timeouts to a maximum of **28 days**.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        None => {
            ctx.send(
                poise::CreateReply::default()
                    .content("Invalid duration. Use a format like `30s`, `10m`, `1h`, or `7d`.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    };

    let until = chrono::Utc::now().timestamp() + delta.as_secs() as i64;
    let timestamp = serenity::Timestamp::from_unix_timestamp(until)?;
    let audit_reason = format!("Muted by {}", ctx.author().name);

    guild_id
        .edit_member(
            ctx.http(),
            member.user.id,
            serenity::EditMember::new()
                .disable_communication_until_datetime(timestamp)
                .audit_log_reason(&audit_reason),
        )
        .await?;

    ctx.say(format!(
        "🔇 <@{}> has been timed out for **{}**.",
        member.user.id, duration
    ))
    .await?;
    Ok(())
}

/// Delete the last N messages from this channel.
#[poise::command(slash_command, guild_only, check = "is_moderator")]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "Number of messages to delete (1-100)"]
    #[min = 1]
    #[max = 100]
    count: u32,
) -> Result<(), Error> {
    // Defer ephemerally so the purge can take a moment
    ctx.defer_ephemeral().await?;

    let channel = ctx.channel_id();
    let recent = channel
        .messages(
            ctx.http(),
            serenity::GetMessages::new().limit(count.min(100) as u8),
        )
        .await?;

    let targets: Vec<serenity::MessageId> = recent.iter().map(|m| m.id).collect();
    let deleted = targets.len();
    match deleted {
        0 => {}
        1 => channel.delete_message(ctx.http(), targets[0]).await?,
        _ => channel.delete_messages(ctx.http(), targets).await?,
    }

    ctx.say(format!("🧹 Deleted **{}** message(s).", deleted)).await?;
    Ok(())
}

/// Best-effort DM; members can have DMs closed.
async fn dm_member(ctx: &Context<'_>, member: &serenity::Member, text: &str) {
    let guild_name = ctx
        .guild()
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "the server".to_string());
    let message = serenity::CreateMessage::new().content(format!("**{}**: {}", guild_name, text));

    if let Err(e) = member.user.direct_message(ctx.http(), message).await {
        tracing::debug!(user_id = member.user.id.get(), "Could not DM member: {}", e);
    }
}

// ============================================================================
// DURATION PARSER  (e.g. "10m", "1h", "1d", "30s")
// ============================================================================

/// Parse a human-friendly duration string.
///
/// Accepted formats: `30s`, `10m`, `1h`, `7d` (unit suffix, case
/// insensitive). Returns `None` if the string cannot be parsed; range
/// limits are the caller's job.
fn parse_duration(raw: &str) -> Option<Duration> {
    let s = raw.trim();
    let unit = s.chars().last()?;
    let value: u64 = s[..s.len() - unit.len_utf8()].trim().parse().ok()?;

    let unit_secs = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return None,
    };

    Some(Duration::from_secs(value.checked_mul(unit_secs)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_units() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("10m"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("7d"), Some(Duration::from_secs(604_800)));
    }

    #[test]
    fn unit_is_case_insensitive_and_spacing_is_tolerated() {
        assert_eq!(parse_duration("10M"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration(" 10 m "), Some(Duration::from_secs(600)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("m"), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("10w"), None);
        assert_eq!(parse_duration("-5m"), None);
        assert_eq!(parse_duration("ten minutes"), None);
    }

    #[test]
    fn twenty_eight_days_fits_the_timeout_cap() {
        let four_weeks = parse_duration("28d").unwrap();
        assert!(four_weeks <= MAX_TIMEOUT);
        assert!(parse_duration("29d").unwrap() > MAX_TIMEOUT);
    }
}
