//! Activity model — **parent-in-child** design over a closed sum type.
//!
//! One [`Activity`] is one inbound or outbound envelope exchanged with the
//! chat platform. Each variant struct contains the shared [`Envelope`] via
//! `#[serde(flatten)]` and `Deref`, so any variant can transparently access
//! the common fields:
//!
//! ```text
//! MessageActivity      ──Deref──▶  Envelope
//!   text, value                     id, from, recipient, conversation, …
//! ```
//!
//! # Activity Hierarchy
//!
//! ```text
//! Activity                                   ← keyed by `type`
//! ├── Message            { text, value }
//! ├── Invoke             { payload, value }  ← keyed further by `name`
//! │   ├── task/fetch, task/submit
//! │   ├── message/submitAction
//! │   ├── signin/verifyState, signin/tokenExchange
//! │   ├── adaptiveCard/action
//! │   ├── config/fetch, config/submit
//! │   └── application/search
//! ├── ConversationUpdate { members_added, members_removed }
//! ├── MessageReaction    { reactions_added, reactions_removed }
//! ├── Event / Command / CommandResult { name, value }
//! ├── EndOfConversation  { code, text }
//! ├── Typing / InstallationUpdate
//! └── Other              { type_tag, value } ← unknown tags, forward-compatible
//! ```
//!
//! # Decoding
//!
//! [`decode`] inspects the `type` discriminator in the raw JSON and
//! constructs the matching variant in a single pass. Unknown top-level tags
//! decode into [`GenericActivity`]; invoke activities without a resolvable
//! `name` fail fast (see [`invoke`]).

pub mod invoke;
pub mod types;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use invoke::{
    AdaptiveCardInvokeAction, AdaptiveCardInvokeValue, InvokeActivity, InvokePayload,
    MessageSubmitAction, SearchQuery, SearchQueryOptions, SigninStateVerification,
    TaskModuleContext, TaskModuleRequest, TokenExchangeRequest,
};
pub use types::{ActivityType, InvokeName};

use crate::error::{DecodeError, DecodeResult};

// ============================================================================
// Envelope and address types
// ============================================================================

/// A conversation participant (user or bot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Channel-scoped id of the participant.
    #[serde(default)]
    pub id: String,
    /// Display name, if the channel provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role in the conversation ("user" or "bot").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Account {
    /// Creates an account with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            role: None,
        }
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Channel-scoped conversation id.
    #[serde(default)]
    pub id: String,
    /// Display name, for named conversations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether this is a group conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
}

impl Conversation {
    /// Creates a conversation reference with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: None,
        }
    }
}

/// Fields shared by every activity variant.
///
/// Variant structs embed this via `#[serde(flatten)] pub envelope: Envelope`
/// and deref to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Channel-assigned activity id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Account>,
    /// The addressee (usually the bot on inbound activities).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Account>,
    /// The conversation this activity belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    /// Base URL for replying into this conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    /// The channel the activity arrived on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Id of the activity this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    /// Sender locale (e.g. "en-US").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Channel timestamp, kept in wire form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

// ============================================================================
// Variant structs
// ============================================================================

/// A user or bot message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageActivity {
    /// Common envelope fields.
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Plain-text content.
    #[serde(default)]
    pub text: String,
    /// Card- or action-attached data, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl MessageActivity {
    /// Creates a bare message with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Members joined or left the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdateActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Members added by this update.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<Account>,
    /// Members removed by this update.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_removed: Vec<Account>,
}

/// A single message reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageReaction {
    /// Reaction kind ("like", "heart", …).
    #[serde(rename = "type", default)]
    pub reaction_type: String,
}

/// Reactions were added to or removed from a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReactionActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions_added: Vec<MessageReaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions_removed: Vec<MessageReaction>,
}

/// An out-of-band application event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Application-defined event name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Event payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A command issued to the bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// The command name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Command payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// The result of a previously issued command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResultActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// The originating command name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// The conversation ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOfConversationActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Why the conversation ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Optional farewell text.
    #[serde(default)]
    pub text: String,
}

/// The peer is typing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
}

/// The application was installed or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationUpdateActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// "add" or "remove".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// An activity with an unrecognized top-level tag.
///
/// Unknown tags decode successfully into this variant so newer platform
/// features keep flowing through catch-all routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericActivity {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// The tag as it arrived on the wire.
    #[serde(rename = "type", default)]
    pub type_tag: String,
    /// Whatever payload accompanied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Generates `Deref`/`DerefMut` to [`Envelope`] for variant structs.
macro_rules! impl_envelope_deref {
    ($($ty:ty),+ $(,)?) => {$(
        impl std::ops::Deref for $ty {
            type Target = Envelope;

            fn deref(&self) -> &Envelope {
                &self.envelope
            }
        }

        impl std::ops::DerefMut for $ty {
            fn deref_mut(&mut self) -> &mut Envelope {
                &mut self.envelope
            }
        }
    )+};
}

impl_envelope_deref!(
    MessageActivity,
    ConversationUpdateActivity,
    MessageReactionActivity,
    EventActivity,
    CommandActivity,
    CommandResultActivity,
    EndOfConversationActivity,
    TypingActivity,
    InstallationUpdateActivity,
    GenericActivity,
);

// ============================================================================
// Activity — the sum type
// ============================================================================

/// One inbound or outbound activity, as a closed tagged union.
///
/// The variant is selected by the `type` discriminator at decode time; the
/// `invoke` variant is selected further by `name` (see
/// [`InvokeActivity`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    /// `type = "message"`
    Message(MessageActivity),
    /// `type = "invoke"`
    Invoke(InvokeActivity),
    /// `type = "conversationUpdate"`
    ConversationUpdate(ConversationUpdateActivity),
    /// `type = "messageReaction"`
    MessageReaction(MessageReactionActivity),
    /// `type = "event"`
    Event(EventActivity),
    /// `type = "command"`
    Command(CommandActivity),
    /// `type = "commandResult"`
    CommandResult(CommandResultActivity),
    /// `type = "endOfConversation"`
    EndOfConversation(EndOfConversationActivity),
    /// `type = "typing"`
    Typing(TypingActivity),
    /// `type = "installationUpdate"`
    InstallationUpdate(InstallationUpdateActivity),
    /// Any other tag.
    Other(GenericActivity),
}

impl Activity {
    /// Creates a bare message activity.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(MessageActivity::new(text))
    }

    /// Returns this activity's type classification.
    pub fn activity_type(&self) -> ActivityType {
        match self {
            Self::Message(_) => ActivityType::Message,
            Self::Invoke(_) => ActivityType::Invoke,
            Self::ConversationUpdate(_) => ActivityType::ConversationUpdate,
            Self::MessageReaction(_) => ActivityType::MessageReaction,
            Self::Event(_) => ActivityType::Event,
            Self::Command(_) => ActivityType::Command,
            Self::CommandResult(_) => ActivityType::CommandResult,
            Self::EndOfConversation(_) => ActivityType::EndOfConversation,
            Self::Typing(_) => ActivityType::Typing,
            Self::InstallationUpdate(_) => ActivityType::InstallationUpdate,
            Self::Other(generic) => ActivityType::Other(generic.type_tag.clone()),
        }
    }

    /// Returns the wire tag for this activity.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Other(generic) => &generic.type_tag,
            Self::Message(_) => "message",
            Self::Invoke(_) => "invoke",
            Self::ConversationUpdate(_) => "conversationUpdate",
            Self::MessageReaction(_) => "messageReaction",
            Self::Event(_) => "event",
            Self::Command(_) => "command",
            Self::CommandResult(_) => "commandResult",
            Self::EndOfConversation(_) => "endOfConversation",
            Self::Typing(_) => "typing",
            Self::InstallationUpdate(_) => "installationUpdate",
        }
    }

    /// Returns the shared envelope fields.
    pub fn envelope(&self) -> &Envelope {
        match self {
            Self::Message(a) => &a.envelope,
            Self::Invoke(a) => &a.envelope,
            Self::ConversationUpdate(a) => &a.envelope,
            Self::MessageReaction(a) => &a.envelope,
            Self::Event(a) => &a.envelope,
            Self::Command(a) => &a.envelope,
            Self::CommandResult(a) => &a.envelope,
            Self::EndOfConversation(a) => &a.envelope,
            Self::Typing(a) => &a.envelope,
            Self::InstallationUpdate(a) => &a.envelope,
            Self::Other(a) => &a.envelope,
        }
    }

    /// Mutable access to the shared envelope fields.
    pub fn envelope_mut(&mut self) -> &mut Envelope {
        match self {
            Self::Message(a) => &mut a.envelope,
            Self::Invoke(a) => &mut a.envelope,
            Self::ConversationUpdate(a) => &mut a.envelope,
            Self::MessageReaction(a) => &mut a.envelope,
            Self::Event(a) => &mut a.envelope,
            Self::Command(a) => &mut a.envelope,
            Self::CommandResult(a) => &mut a.envelope,
            Self::EndOfConversation(a) => &mut a.envelope,
            Self::Typing(a) => &mut a.envelope,
            Self::InstallationUpdate(a) => &mut a.envelope,
            Self::Other(a) => &mut a.envelope,
        }
    }

    /// Returns the activity id, if the channel assigned one.
    pub fn id(&self) -> Option<&str> {
        self.envelope().id.as_deref()
    }

    /// Returns `true` for invoke-style activities (which expect a reply body).
    pub fn is_invoke(&self) -> bool {
        matches!(self, Self::Invoke(_))
    }

    /// Returns the invoke view of this activity, if it is one.
    pub fn as_invoke(&self) -> Option<&InvokeActivity> {
        match self {
            Self::Invoke(invoke) => Some(invoke),
            _ => None,
        }
    }

    /// Builds a message activity addressed back at this activity's sender.
    ///
    /// From/recipient are swapped; conversation, service URL, and channel
    /// are carried over; `reply_to_id` references this activity.
    pub fn create_reply(&self, text: impl Into<String>) -> Activity {
        let envelope = self.envelope();
        let mut reply = MessageActivity::new(text);
        reply.envelope = Envelope {
            id: None,
            from: envelope.recipient.clone(),
            recipient: envelope.from.clone(),
            conversation: envelope.conversation.clone(),
            service_url: envelope.service_url.clone(),
            channel_id: envelope.channel_id.clone(),
            reply_to_id: envelope.id.clone(),
            locale: envelope.locale.clone(),
            timestamp: None,
        };
        Activity::Message(reply)
    }

    /// Serializes this activity into its wire object, `type` tag included.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut wire = match self {
            Self::Message(a) => serde_json::to_value(a)?,
            Self::Invoke(a) => a.to_value()?,
            Self::ConversationUpdate(a) => serde_json::to_value(a)?,
            Self::MessageReaction(a) => serde_json::to_value(a)?,
            Self::Event(a) => serde_json::to_value(a)?,
            Self::Command(a) => serde_json::to_value(a)?,
            Self::CommandResult(a) => serde_json::to_value(a)?,
            Self::EndOfConversation(a) => serde_json::to_value(a)?,
            Self::Typing(a) => serde_json::to_value(a)?,
            Self::InstallationUpdate(a) => serde_json::to_value(a)?,
            Self::Other(a) => serde_json::to_value(a)?,
        };
        if let Value::Object(map) = &mut wire {
            map.insert("type".into(), Value::String(self.type_tag().to_string()));
        }
        Ok(wire)
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decodes a parsed JSON payload into the matching [`Activity`] variant.
///
/// The `type` discriminator is required; an unknown tag decodes into
/// [`Activity::Other`]. Invoke activities are decoded through
/// [`invoke::decode_invoke`] and fail fast when their `name` discriminator
/// is missing, malformed, or unrecognized.
pub fn decode(value: &Value) -> DecodeResult<Activity> {
    let tag_field = value
        .get("type")
        .ok_or(DecodeError::MissingField { field: "type" })?;
    let tag = tag_field.as_str().ok_or_else(|| DecodeError::Invalid {
        kind: "activity".to_string(),
        reason: "'type' must be a string".to_string(),
    })?;

    match tag {
        "message" => variant(value, tag).map(Activity::Message),
        "invoke" => invoke::decode_invoke(value).map(Activity::Invoke),
        "conversationUpdate" => variant(value, tag).map(Activity::ConversationUpdate),
        "messageReaction" => variant(value, tag).map(Activity::MessageReaction),
        "event" => variant(value, tag).map(Activity::Event),
        "command" => variant(value, tag).map(Activity::Command),
        "commandResult" => variant(value, tag).map(Activity::CommandResult),
        "endOfConversation" => variant(value, tag).map(Activity::EndOfConversation),
        "typing" => variant(value, tag).map(Activity::Typing),
        "installationUpdate" => variant(value, tag).map(Activity::InstallationUpdate),
        _ => variant(value, tag).map(Activity::Other),
    }
}

/// Decodes a raw JSON string into an [`Activity`].
pub fn decode_str(raw: &str) -> DecodeResult<Activity> {
    let value: Value = serde_json::from_str(raw)?;
    decode(&value)
}

fn variant<T: serde::de::DeserializeOwned>(value: &Value, kind: &str) -> DecodeResult<T> {
    serde_json::from_value(value.clone()).map_err(|err| DecodeError::Invalid {
        kind: kind.to_string(),
        reason: err.to_string(),
    })
}

// ============================================================================
// Typed extraction
// ============================================================================

/// Trait for extracting a typed view from an [`Activity`].
///
/// Handlers can request views at any level of specificity — the whole
/// [`Activity`], a variant struct like [`MessageActivity`], or the
/// [`InvokeActivity`] subtree — and the framework layer wires this into
/// parameter extraction.
pub trait FromActivity: Sized + Clone {
    /// Attempts to extract this view from the given activity.
    fn from_activity(activity: &Activity) -> Option<Self>;
}

impl FromActivity for Activity {
    fn from_activity(activity: &Activity) -> Option<Self> {
        Some(activity.clone())
    }
}

macro_rules! impl_from_activity {
    ($($variant:ident => $ty:ty),+ $(,)?) => {$(
        impl FromActivity for $ty {
            fn from_activity(activity: &Activity) -> Option<Self> {
                match activity {
                    Activity::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    )+};
}

impl_from_activity!(
    Message => MessageActivity,
    Invoke => InvokeActivity,
    ConversationUpdate => ConversationUpdateActivity,
    MessageReaction => MessageReactionActivity,
    Event => EventActivity,
    Command => CommandActivity,
    CommandResult => CommandResultActivity,
    EndOfConversation => EndOfConversationActivity,
    Typing => TypingActivity,
    InstallationUpdate => InstallationUpdateActivity,
    Other => GenericActivity,
);

/// Context wrapper providing access to an extracted activity view.
///
/// Use `Deref` to access fields directly on the wrapped type.
#[derive(Debug, Clone)]
pub struct ActivityContext<T: FromActivity> {
    data: T,
}

impl<T: FromActivity> ActivityContext<T> {
    /// Wraps an extracted view.
    pub fn new(data: T) -> Self {
        Self { data }
    }

    /// Consumes the wrapper and returns the view.
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T: FromActivity> std::ops::Deref for ActivityContext<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}
