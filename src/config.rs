use serde::Deserialize;

/// Engine configuration, supplied by the embedding application.
///
/// Everything has a sensible default; hosts that want localized display
/// strings or a bounded record set deserialize this from their own
/// config source and pass it to [`NotificationCenter::new`].
///
/// [`NotificationCenter::new`]: crate::engine::NotificationCenter::new
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display phrase templates, already resolved by the caller's i18n
    /// layer. `{actor}`, `{subject}` and `{count}` are substituted at
    /// projection time.
    pub phrases: Phrases,
    /// Optional cap on the live record set. When exceeded, the oldest
    /// records are evicted. `None` (the default) = unbounded; in practice
    /// the UI's display limit bounds the set upstream.
    pub max_records: Option<usize>,
}

/// Phrase templates for group titles, keyed by kind and cardinality.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Phrases {
    /// Single direct message. Placeholders: `{actor}`.
    pub message_one: String,
    /// Collapsed direct messages. Placeholders: `{count}`, `{actor}`.
    pub message_many: String,
    /// Single chat room message. Placeholders: `{actor}`, `{subject}`.
    pub chatroom_one: String,
    /// Collapsed chat room messages. Placeholders: `{count}`, `{subject}`.
    pub chatroom_many: String,
    /// Single comment. Placeholders: `{actor}`, `{subject}`.
    pub comment_one: String,
    /// Collapsed comments. Placeholders: `{count}`, `{subject}`.
    pub comment_many: String,
    /// Invitation, any cardinality. Placeholders: `{actor}`, `{subject}`.
    pub invitation: String,
}

impl Default for Phrases {
    fn default() -> Self {
        Self {
            message_one: "New message from {actor}".into(),
            message_many: "{count} new messages from {actor}".into(),
            chatroom_one: "New message from {actor} in '{subject}'".into(),
            chatroom_many: "{count} new messages in '{subject}'".into(),
            comment_one: "{actor} commented on '{subject}'".into(),
            comment_many: "{count} new comments on '{subject}'".into(),
            invitation: "{actor} invited you to '{subject}'".into(),
        }
    }
}

impl Phrases {
    /// Substitute `{actor}`, `{subject}` and `{count}` into a template.
    /// Missing values render as an empty string rather than the raw
    /// placeholder.
    pub(crate) fn render(
        template: &str,
        actor: Option<&str>,
        subject: Option<&str>,
        count: usize,
    ) -> String {
        template
            .replace("{actor}", actor.unwrap_or_default())
            .replace("{subject}", subject.unwrap_or_default())
            .replace("{count}", &count.to_string())
    }
}
