//! Discriminator tag enumerations for the activity model.
//!
//! Both discriminator domains are closed enumerations defined in one place:
//! [`ActivityType`] for the top-level `type` tag and [`InvokeName`] for the
//! secondary `name` tag carried by invoke activities. Tag comparison is a
//! case-sensitive string comparison, mirroring the chat-platform wire values.

use std::fmt;

/// Classification of top-level activity types.
///
/// This is the primary discriminator: it selects the concrete [`Activity`]
/// variant during decode. An unrecognized tag is preserved verbatim in
/// [`Other`](ActivityType::Other) so unknown-but-well-formed payloads keep
/// flowing (forward compatibility).
///
/// [`Activity`]: crate::activity::Activity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// A user or bot message.
    Message,
    /// A request/response-style activity requiring a structured reply.
    Invoke,
    /// Members joined or left the conversation.
    ConversationUpdate,
    /// A reaction was added to or removed from a message.
    MessageReaction,
    /// An out-of-band application event.
    Event,
    /// A command issued to the bot.
    Command,
    /// The result of a previously issued command.
    CommandResult,
    /// The conversation ended.
    EndOfConversation,
    /// The peer is typing.
    Typing,
    /// The application was installed or removed.
    InstallationUpdate,
    /// Any tag outside the known set, preserved verbatim.
    Other(String),
}

impl ActivityType {
    /// Returns the wire tag for this activity type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Invoke => "invoke",
            Self::ConversationUpdate => "conversationUpdate",
            Self::MessageReaction => "messageReaction",
            Self::Event => "event",
            Self::Command => "command",
            Self::CommandResult => "commandResult",
            Self::EndOfConversation => "endOfConversation",
            Self::Typing => "typing",
            Self::InstallationUpdate => "installationUpdate",
            Self::Other(tag) => tag,
        }
    }

    /// Maps a wire tag to its activity type.
    ///
    /// Matching is case-sensitive: `"Message"` is not `"message"` and lands
    /// in [`Other`](ActivityType::Other).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "message" => Self::Message,
            "invoke" => Self::Invoke,
            "conversationUpdate" => Self::ConversationUpdate,
            "messageReaction" => Self::MessageReaction,
            "event" => Self::Event,
            "command" => Self::Command,
            "commandResult" => Self::CommandResult,
            "endOfConversation" => Self::EndOfConversation,
            "typing" => Self::Typing,
            "installationUpdate" => Self::InstallationUpdate,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for ActivityType {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ActivityType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// The secondary discriminator carried by invoke activities.
///
/// Unlike [`ActivityType`], this enumeration has no catch-all: typed invoke
/// handlers rely on exhaustive matching, so an unrecognized name is a decode
/// error rather than a silent downgrade to a generic invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeName {
    /// `task/fetch` — a task module is being opened.
    TaskFetch,
    /// `task/submit` — a task module was submitted.
    TaskSubmit,
    /// `message/submitAction` — an action was taken on a message.
    MessageSubmitAction,
    /// `signin/verifyState` — sign-in state verification.
    SigninVerifyState,
    /// `signin/tokenExchange` — single sign-on token exchange.
    SigninTokenExchange,
    /// `adaptiveCard/action` — an adaptive card action was executed.
    AdaptiveCardAction,
    /// `config/fetch` — a configuration page is being opened.
    ConfigFetch,
    /// `config/submit` — a configuration page was submitted.
    ConfigSubmit,
    /// `application/search` — a search query was issued.
    ApplicationSearch,
}

impl InvokeName {
    /// Every known invoke name, in wire order.
    pub const ALL: [InvokeName; 9] = [
        Self::TaskFetch,
        Self::TaskSubmit,
        Self::MessageSubmitAction,
        Self::SigninVerifyState,
        Self::SigninTokenExchange,
        Self::AdaptiveCardAction,
        Self::ConfigFetch,
        Self::ConfigSubmit,
        Self::ApplicationSearch,
    ];

    /// Returns the wire value for this invoke name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskFetch => "task/fetch",
            Self::TaskSubmit => "task/submit",
            Self::MessageSubmitAction => "message/submitAction",
            Self::SigninVerifyState => "signin/verifyState",
            Self::SigninTokenExchange => "signin/tokenExchange",
            Self::AdaptiveCardAction => "adaptiveCard/action",
            Self::ConfigFetch => "config/fetch",
            Self::ConfigSubmit => "config/submit",
            Self::ApplicationSearch => "application/search",
        }
    }

    /// Maps a wire value to its invoke name, or `None` if unrecognized.
    ///
    /// Matching is case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.as_str() == name)
    }
}

impl fmt::Display for InvokeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for InvokeName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_type_round_trips_known_tags() {
        for tag in [
            "message",
            "invoke",
            "conversationUpdate",
            "messageReaction",
            "event",
            "command",
            "commandResult",
            "endOfConversation",
            "typing",
            "installationUpdate",
        ] {
            assert_eq!(ActivityType::from_tag(tag).as_str(), tag);
        }
    }

    #[test]
    fn activity_type_preserves_unknown_tags() {
        let ty = ActivityType::from_tag("delivery/receipt");
        assert_eq!(ty, ActivityType::Other("delivery/receipt".to_string()));
        assert_eq!(ty.as_str(), "delivery/receipt");
    }

    #[test]
    fn activity_type_matching_is_case_sensitive() {
        assert_eq!(
            ActivityType::from_tag("Message"),
            ActivityType::Other("Message".to_string())
        );
        assert_ne!(ActivityType::from_tag("Message"), ActivityType::Message);
    }

    #[test]
    fn tags_with_equal_strings_are_interchangeable() {
        assert_eq!(ActivityType::from_tag("message"), ActivityType::Message);
        assert!(ActivityType::Message == "message");
        assert!(ActivityType::Message != "Message");
    }

    #[test]
    fn invoke_name_round_trips_all_wire_values() {
        for name in InvokeName::ALL {
            assert_eq!(InvokeName::from_name(name.as_str()), Some(name));
        }
    }

    #[test]
    fn invoke_name_rejects_unknown_and_wrong_case() {
        assert_eq!(InvokeName::from_name("task/Fetch"), None);
        assert_eq!(InvokeName::from_name("composeExtension/query"), None);
        assert_eq!(InvokeName::from_name(""), None);
    }
}
