mod message_record;
mod user_record;

pub use message_record::{MessageRecord, MessageRole};
pub use user_record::UserRecord;
