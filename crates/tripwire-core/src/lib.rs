//! tripwire-core
//!
//! ビルドホスト向けのキュー駆動ビルドトリガーと integration state の永続化。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, message, decision, state, credentials, errors）
//! - **ports**: 抽象化レイヤー（Clock, QueueClient, ObjectStoreClient, StateStore, ServiceClientFactory）
//! - **impls**: 実装（in-memory サービス、FileStateStore）
//! - **trigger**: IntervalGate と各種 Trigger（queue, interval, composite）
//! - **state**: RemoteStateStore（fallback 付き）
//! - **config**: TOML 設定の読み込み・検証・構築
//! - **app**: 参照用のホストループ（ProjectCycle）
//! - **deadline**: リモート呼び出しのタイムアウト

pub mod app;
pub mod config;
pub mod deadline;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod state;
pub mod trigger;
