//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層と接続レジストリを操作します。

pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod fetch_history;
pub mod send_message;
pub mod session;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{MalformedInput, SendMessageError};
pub use fetch_history::FetchHistoryUseCase;
pub use send_message::{SendMessageUseCase, SentMessage};
pub use session::{InboundFrame, MalformedInputPolicy, SessionEnd, SessionHandler, parse_inbound};
