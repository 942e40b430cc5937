//! Wire types for the Feishu webhook message formats, inbound and outbound.

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------- Outbound ----------

/// The three message shapes the bot emits. Serializes to the platform's
/// envelope, e.g. `{"msg_type":"text","text":{"content":"..."}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "msg_type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text { text: TextPayload },
    Post { post: PostPayload },
    // The platform expects the card serialized as an embedded JSON string
    Interactive { card: String },
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        OutboundMessage::Text {
            text: TextPayload { content: content.into() },
        }
    }

    /// Rich text: a single title with a single paragraph, zh_cn locale.
    pub fn rich_text(title: impl Into<String>, content: impl Into<String>) -> Self {
        OutboundMessage::Post {
            post: PostPayload {
                zh_cn: PostLocale {
                    title: title.into(),
                    content: vec![vec![PostRun::text(content)]],
                },
            },
        }
    }

    pub fn interactive(card: &Card) -> Result<Self> {
        Ok(OutboundMessage::Interactive {
            card: serde_json::to_string(card)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextPayload {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPayload {
    pub zh_cn: PostLocale,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostLocale {
    pub title: String,
    pub content: Vec<Vec<PostRun>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostRun {
    tag: &'static str,
    pub text: String,
}

impl PostRun {
    pub fn text(text: impl Into<String>) -> Self {
        PostRun { tag: "text", text: text.into() }
    }
}

/// Interactive card: a colored header plus div/action elements.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

impl Card {
    pub fn new(title: impl Into<String>, template: CardTemplate) -> Self {
        Card {
            header: CardHeader {
                title: PlainText::new(title),
                template,
            },
            elements: Vec::new(),
        }
    }

    pub fn markdown(mut self, content: impl Into<String>) -> Self {
        self.elements.push(CardElement::Div {
            text: Markdown::new(content),
        });
        self
    }

    pub fn actions(mut self, actions: Vec<CardButton>) -> Self {
        self.elements.push(CardElement::Action { actions });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardHeader {
    pub title: PlainText,
    pub template: CardTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTemplate {
    Blue,
    Green,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tag")]
pub enum CardElement {
    #[serde(rename = "div")]
    Div { text: Markdown },
    #[serde(rename = "action")]
    Action { actions: Vec<CardButton> },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlainText {
    tag: &'static str,
    pub content: String,
}

impl PlainText {
    pub fn new(content: impl Into<String>) -> Self {
        PlainText { tag: "plain_text", content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Markdown {
    tag: &'static str,
    pub content: String,
}

impl Markdown {
    pub fn new(content: impl Into<String>) -> Self {
        Markdown { tag: "lark_md", content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardButton {
    tag: &'static str,
    pub text: PlainText,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    style: Option<&'static str>,
    pub value: CardAction,
}

impl CardButton {
    pub fn new(label: impl Into<String>, value: CardAction) -> Self {
        CardButton {
            tag: "button",
            text: PlainText::new(label),
            style: None,
            value,
        }
    }

    pub fn primary(mut self) -> Self {
        self.style = Some("primary");
        self
    }
}

/// Typed payload attached to every card button; comes back verbatim in the
/// callback event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CardAction {
    Checkin { status: String },
    Checkout { completion: i64 },
}

// ---------- Inbound ----------

/// Text-message event body. Every field is defaulted so partial payloads
/// still deserialize; the handler decides what to ignore.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub msg_type: String,
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub text: MessageText,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub sender_id: SenderId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SenderId {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageText {
    #[serde(default)]
    pub content: String,
}

/// Interactive-card button-press event body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardCallback {
    #[serde(default, rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub action: CallbackAction,
    #[serde(default)]
    pub operator: Operator,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackAction {
    // Kept loose here; unknown actions must be ignored, not rejected
    #[serde(default)]
    pub value: serde_json::Value,
}

impl CallbackAction {
    pub fn card_action(&self) -> Option<CardAction> {
        serde_json::from_value(self.value.clone()).ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operator {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
}
