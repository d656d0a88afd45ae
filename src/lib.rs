//! # Download Popular Books
//!
//! 一个用于批量下载最受欢迎书籍榜单的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 会话操作（导航 / 读取 / 执行脚本）
//! - `Locator` - 有界轮询的元素定位与等待
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个关注点
//! - `LoginService` - 登录能力
//! - `NavigationService` - 打开榜单 / 四级降级返回列表
//! - `CatalogExtractor` - 榜单页解析能力
//! - `QuotaMonitor` - 限额信号检测与全局状态
//! - `AcquisitionService` - 选择并触发最大 PDF 下载
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一本书"的完整处理流程
//! - `BookCtx` - 上下文封装（批次位置）
//! - `BookFlow` - 流程编排（点击 → 验证 → 限额 → 下载 → 返回）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量下载编排器，管理资源、
//!   选择循环与串行迭代
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::launch_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Locator, PageDriver};
pub use models::{BookRecord, ProcessOutcome, ProcessStats, SelectionSpec};
pub use orchestrator::App;
pub use services::{CatalogExtractor, QuotaState};
pub use workflow::{BookCtx, BookFlow};
