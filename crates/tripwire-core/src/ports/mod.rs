//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部の依存先 1 つとの境界（メッセージキュー、オブジェクトストア、
//! state の保存先、時刻）。実装は `impls`（in-memory とファイル）か crate の外に置く。

pub mod client_factory;
pub mod clock;
pub mod object_store;
pub mod queue_client;
pub mod state_store;

pub use self::client_factory::ServiceClientFactory;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::object_store::ObjectStoreClient;
pub use self::queue_client::QueueClient;
pub use self::state_store::StateStore;
