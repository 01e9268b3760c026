//! Localized user-facing strings.
//!
//! The chat surface talks to Chinese-speaking users; these strings are the
//! exact texts clients render and tests match against.

/// 400 body for an empty, oversized, or malformed chat request.
pub const INVALID_REQUEST: &str = "消息格式无效";

/// 500 body when a chat message could not be stored.
pub const PROCESS_FAILED: &str = "处理消息失败";

/// 500 body when a transcript could not be read.
pub const FETCH_FAILED: &str = "获取消息失败";

/// Assistant reply persisted when the completion provider fails.
pub const FALLBACK_REPLY: &str = "抱歉，AI 服务暂时不可用，请检查 API 密钥设置。";

/// Reply used when a hosted backend answers without any text.
pub const NO_ANSWER: &str = "很抱歉，我现在无法回答。";

/// English counterpart of [`NO_ANSWER`] for the Anthropic backend.
pub const NO_ANSWER_EN: &str = "Sorry, I cannot answer right now.";

/// System preamble sent to hosted backends that accept one.
pub const ASSISTANT_PREAMBLE: &str = "你是一个有帮助的助手，用中文回答问题。";

/// Raised by the client-side session roster when the cap is hit.
pub const SESSION_LIMIT_REACHED: &str = "已达到最大会话数量限制";

/// Prefix for auto-generated session names (`新会话 1`, `新会话 2`, ...).
pub const SESSION_NAME_PREFIX: &str = "新会话";
