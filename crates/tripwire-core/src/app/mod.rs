//! App - アプリケーション層
//!
//! ports と trigger/state を組み合わせた参照用のホストループ。
//!
//! # 主要コンポーネント
//! - **ProjectCycle**: 1 プロジェクト分の fire → build → save → completed
//! - **Integrator**: ビルド本体のコールバック
//!
//! tick のスケジューリングは呼び出し側の責務。CLI はプロジェクトごとに
//! 1 タスクで 1 つの cycle を回す。

pub mod cycle;
pub mod integrator;

pub use self::cycle::{CycleOutcome, ProjectCycle};
pub use self::integrator::{CountingIntegrator, IntegrationRequest, Integrator};
