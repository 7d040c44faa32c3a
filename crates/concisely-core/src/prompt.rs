//! Summary prompt rendering.
//!
//! Messages are rendered into a compact, line-oriented transcript:
//!
//! ```text
//! ### 42 Anna [reply to 40]
//!   text, indented by two spaces
//! <photo>
//!   description of the photo
//! </photo>
//! ```

use crate::domain::{Attachment, ChatMessage};

/// Instruction block prepended to every summary prompt.
pub const SUMMARIZATION_PROMPT: &str = r#"Ты — бот-саммаризатор сообщений в Telegram.

Сообщения поступают в формате:
```
### ID Name
  text
```

Перескажи самые интересные / смешные моменты.

Требования:
0. Язык ответа — русский
1. Длина — приблизительно до 1200 символов
2. Пиши только сам пересказ! Без фразы "Вот основные моменты", без заголовка "Пересказ", без рассуждений о чате в целом.
3. Для форматирования используй html (не markdown).
4. Используй только теги, поддерживаемые Telegram:
   - <b>текст</b> (жирный)
   - <i>текст</i> (курсив)
   - <a href="URL">текст</a> (ссылки)
5. Вместо списков (<ul>) используй символы-буллеты (• или -) и обычный перенос строки (\n).
6. Обязательно закрывай все теги."#;

/// Placeholder for documents sent without a file name.
const UNNAMED_DOCUMENT: &str = "файл";

fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn described_block(tag: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) => format!("<{tag}>\n{}\n</{tag}>", indent(desc)),
        None => format!("<{tag} />"),
    }
}

/// Render an attachment as a pseudo-XML block.
pub fn format_attachment(attachment: &Attachment) -> String {
    match attachment {
        Attachment::Photo { description } => described_block("photo", description.as_deref()),
        Attachment::Voice { description } => described_block("voice", description.as_deref()),
        Attachment::VideoNote { description } => {
            described_block("video_note", description.as_deref())
        }
        Attachment::Video => "<video />".to_string(),
        Attachment::Animation => "<gif />".to_string(),
        Attachment::Sticker { emoji, description } => match description {
            Some(desc) => described_block("sticker", Some(desc)),
            None if !emoji.is_empty() => format!("<sticker>{emoji}</sticker>"),
            None => "<sticker />".to_string(),
        },
        Attachment::Document { file_name } => {
            let name = if file_name.is_empty() {
                UNNAMED_DOCUMENT
            } else {
                file_name
            };
            format!("<document>{name}</document>")
        }
        Attachment::Poll { question, options } => {
            if options.is_empty() {
                format!("<poll>{question}</poll>")
            } else {
                let options = options
                    .iter()
                    .map(|opt| format!("  - {opt}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("<poll>{question}\n{options}\n</poll>")
            }
        }
        Attachment::Location => "<location />".to_string(),
        Attachment::NewMembers { names } => format!("<new_members>{names}</new_members>"),
    }
}

/// Render one message: header line, indented text, attachment block.
pub fn format_message(msg: &ChatMessage) -> String {
    let mut labels = Vec::new();
    if let Some(reply_to) = msg.reply_to_message_id.filter(|id| *id != 0) {
        labels.push(format!("reply to {reply_to}"));
    }
    if let Some(forward) = msg.forward_sender_name.as_deref().filter(|s| !s.is_empty()) {
        labels.push(format!("forward from {forward}"));
    }

    let labels = if labels.is_empty() {
        String::new()
    } else {
        format!(" [{}]", labels.join(", "))
    };

    let mut parts = vec![format!("### {} {}{labels}", msg.message_id, msg.sender_name)];

    if !msg.text.is_empty() {
        parts.push(indent(&msg.text));
    }

    if let Some(attachment) = &msg.attachment {
        parts.push(format_attachment(attachment));
    }

    parts.join("\n")
}

/// Render messages as the `<messages>` block, without instructions.
pub fn transcript(messages: &[ChatMessage]) -> String {
    let body = messages
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("<messages>\n{body}\n</messages>")
}

/// Build the complete summary prompt for a batch of messages.
pub fn full_prompt(messages: &[ChatMessage]) -> String {
    format!("{SUMMARIZATION_PROMPT}\n\n{}", transcript(messages))
}

/// Strip the vendor prefix: `anthropic/claude-opus-4.5` -> `claude-opus-4.5`.
pub fn model_short_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}
