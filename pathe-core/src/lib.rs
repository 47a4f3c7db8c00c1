//! # pathe-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], [`Middleware`], [`SessionStore`],
//! message, attachment, turn and user types, and tracing initialization. Transport-agnostic; used by
//! pathe-telegram, handler-chain, the media pipeline and the agent gateway.

pub mod bot;
pub mod error;
pub mod logger;
pub mod session;
pub mod turn;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{HandlerError, PatheError, Result};
pub use logger::init_tracing;
pub use session::{HistoryEntry, HistoryRole, Session, SessionKey, SessionStore};
pub use turn::{resolve_caption, ConversationTurn, TurnAttachment};
pub use types::{
    Attachment, Chat, FileRef, Handler, HandlerResponse, Message, MessageDirection, Middleware,
    ToCoreMessage, ToCoreUser, User,
};
