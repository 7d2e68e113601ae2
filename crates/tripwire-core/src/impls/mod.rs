//! Impls - ports の実装（開発用・テスト用 + ローカルファイル）
//!
//! # 含まれる実装
//! - **InMemoryQueueClient**: visibility-timeout 付きの in-memory キュー
//! - **InMemoryObjectStore**: in-memory の Blob ストレージ
//! - **InMemoryStateStore**: テスト用の StateStore
//! - **FileStateStore**: ローカルファイルの StateStore（fallback の既定）
//! - **InMemoryClientFactory**: 上記の in-memory サービスを配る factory
//!
//! 実サービス向けのキュー・オブジェクトストアのクライアントはこの crate の外にあり、
//! `ServiceClientFactory` 経由で差し込む。

pub mod file_state;
pub mod inmem_factory;
pub mod inmem_object_store;
pub mod inmem_queue;
pub mod inmem_state;

pub use self::file_state::FileStateStore;
pub use self::inmem_factory::InMemoryClientFactory;
pub use self::inmem_object_store::{InMemoryObjectStore, StoreOperation, StoredObject};
pub use self::inmem_queue::InMemoryQueueClient;
pub use self::inmem_state::InMemoryStateStore;
