use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One entry in the conversation history. Append-only, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for `POST /chat`. Built fresh for every send.
///
/// `thread_id` is serialized as `null` on the first turn and echoed verbatim
/// afterwards; the client never parses or constructs one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub thread_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<u16>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub thread_id: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceItem {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub label: String,
}

/// One unit of structured, renderable chat output.
///
/// The wire discriminator is `type`. Unrecognized discriminators decode as
/// `Unknown` rather than failing the whole response; the renderer shows a
/// visible placeholder for them so newer server payloads stay diagnosable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emphasis: Option<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        subtle: bool,
    },
    Card {
        title: String,
        #[serde(with = "ordered_kv")]
        kv: Vec<(String, String)>,
    },
    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footnote: Option<String>,
    },
    Choice {
        prompt: String,
        choices: Vec<ChoiceItem>,
    },
    Chips {
        items: Vec<Chip>,
    },
    #[serde(other)]
    Unknown,
}

/// Text emphasis value the renderer styles specially.
pub const EMPHASIS_WARNING: &str = "warning";

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            emphasis: None,
            subtle: false,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            emphasis: Some(EMPHASIS_WARNING.to_string()),
            subtle: false,
        }
    }

    pub fn table(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Table {
            caption: None,
            columns,
            rows,
            footnote: None,
        }
    }
}

/// Serde adapter decoding a JSON object into a `Vec` of pairs so that card
/// entries render in the order the server emitted them.
mod ordered_kv {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(kv: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(kv.len()))?;
        for (key, value) in kv {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KvVisitor;

        impl<'de> Visitor<'de> for KvVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of string keys to string values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(KvVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_block_round_trips() {
        let value = serde_json::json!({
            "type": "text",
            "text": "Looking up annual result…",
            "emphasis": "warning"
        });
        let block: Block = serde_json::from_value(value.clone()).unwrap();
        assert!(matches!(
            &block,
            Block::Text { text, emphasis, subtle }
            if text.starts_with("Looking up") && emphasis.as_deref() == Some("warning") && !subtle
        ));
        assert_eq!(serde_json::to_value(&block).unwrap(), value);
    }

    #[test]
    fn subtle_defaults_to_false() {
        let block: Block = serde_json::from_value(serde_json::json!({
            "type": "text",
            "text": "fine print",
            "subtle": true
        }))
        .unwrap();
        assert!(matches!(block, Block::Text { subtle: true, .. }));

        let block: Block =
            serde_json::from_value(serde_json::json!({"type": "text", "text": "x"})).unwrap();
        assert!(matches!(block, Block::Text { subtle: false, .. }));
    }

    #[test]
    fn card_preserves_kv_order() {
        let block: Block = serde_json::from_str(
            r#"{"type":"card","title":"Profile","kv":{"Status":"Active","CVR":"12345678","City":"Aarhus"}}"#,
        )
        .unwrap();
        let Block::Card { kv, .. } = &block else {
            panic!("expected card");
        };
        let keys: Vec<&str> = kv.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["Status", "CVR", "City"]);
    }

    #[test]
    fn table_block_decodes() {
        let block: Block = serde_json::from_value(serde_json::json!({
            "type": "table",
            "columns": ["Year", "Revenue"],
            "rows": [["2023", "1000000"]],
            "footnote": "DKK"
        }))
        .unwrap();
        assert!(matches!(
            &block,
            Block::Table { columns, rows, footnote, caption: None }
            if columns.len() == 2 && rows.len() == 1 && footnote.as_deref() == Some("DKK")
        ));
    }

    #[test]
    fn choice_block_decodes() {
        let block: Block = serde_json::from_value(serde_json::json!({
            "type": "choice",
            "prompt": "Which company did you mean?",
            "choices": [
                {"id": "12345678", "label": "Demo IT ApS", "description": "Aarhus"},
                {"id": "87654321", "label": "Demo Holding A/S"}
            ]
        }))
        .unwrap();
        let Block::Choice { choices, .. } = &block else {
            panic!("expected choice");
        };
        assert_eq!(choices[0].id, "12345678");
        assert!(choices[1].description.is_none());
    }

    #[test]
    fn chips_block_decodes() {
        let block: Block = serde_json::from_value(serde_json::json!({
            "type": "chips",
            "items": [{"label": "type: bankruptcy"}, {"label": "nace: 62*"}]
        }))
        .unwrap();
        assert!(matches!(&block, Block::Chips { items } if items.len() == 2));
    }

    #[test]
    fn unrecognized_type_decodes_as_unknown() {
        let block: Block =
            serde_json::from_str(r#"{"type":"sparkline","points":[1,2,3]}"#).unwrap();
        assert_eq!(block, Block::Unknown);
    }

    #[test]
    fn response_blocks_default_empty() {
        let response: ChatResponse = serde_json::from_str(r#"{"thread_id":"t1"}"#).unwrap();
        assert!(response.blocks.is_empty());
    }

    #[test]
    fn request_serializes_null_thread_and_skips_hints() {
        let request = ChatRequest {
            thread_id: None,
            messages: vec![ChatMessage::user("hello")],
            cvr: None,
            years: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["thread_id"].is_null());
        assert!(json.get("cvr").is_none());
        assert!(json.get("years").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn request_carries_hints_when_set() {
        let request = ChatRequest {
            thread_id: Some("t1".into()),
            messages: vec![],
            cvr: Some("12345678".into()),
            years: Some(vec![2022, 2023]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["thread_id"], "t1");
        assert_eq!(json["cvr"], "12345678");
        assert_eq!(json["years"][1], 2023);
    }
}
