//! 下载限额监控 - 业务能力层
//!
//! 检查当前页面是否出现限额信号，并维护全局的限额状态。
//! 状态是单写多读的信号：一旦置位，本次运行内不再复位，
//! 之后所有下载尝试都会被短路。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::infrastructure::PageDriver;

/// 限额提示文字
const LIMIT_PHRASE: &str = "每日限额已用完";
const LIMIT_PHRASE_SHORT: &str = "每日限额";

/// 专门的限额错误提示区域
static LIMIT_ERROR_REGION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".download-limits-error__message").unwrap());

/// "N/N" 形式的用量计数（如 20/20）
static USAGE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,4})\s*/\s*(\d{1,4})\b").unwrap());

/// 全局限额状态
///
/// 进程级布尔信号，初始为 false，第一次观测到限额信号后置为 true，
/// 本次运行内不会复位。
#[derive(Clone, Default)]
pub struct QuotaState {
    limit_reached: Arc<AtomicBool>,
}

impl QuotaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 置位限额信号（不可逆）
    pub fn trip(&self) {
        self.limit_reached.store(true, Ordering::SeqCst);
    }

    /// 限额是否已触发
    pub fn is_tripped(&self) -> bool {
        self.limit_reached.load(Ordering::SeqCst)
    }
}

/// 限额监控器
///
/// 每本书最多在三个检查点被调用（进入详情页后、触发下载前、触发下载后），
/// 重复的正向检测是幂等的。
pub struct QuotaMonitor {
    state: QuotaState,
}

impl QuotaMonitor {
    pub fn new(state: QuotaState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    /// 检查当前页面是否出现限额信号
    ///
    /// 命中任意一种信号即返回 true 并置位全局状态；未命中时无副作用。
    pub async fn check_limit(&self, driver: &PageDriver) -> Result<bool> {
        let page_source = driver.page_content().await?;

        if !limit_signal_in(&page_source) {
            return Ok(false);
        }

        warn!("{}", "=".repeat(60));
        warn!("⚠️ 检测到下载限制提示：每日下载限额已用完！");
        if let Some(detail) = limit_detail(&page_source) {
            warn!("   限制详情: {}", crate::utils::logging::truncate_text(&detail, 100));
        }
        if let Some(counter) = exhausted_counter(&page_source) {
            warn!("   下载数量: {}", counter);
        }
        warn!("{}", "=".repeat(60));

        if !self.state.is_tripped() {
            self.state.trip();
            info!("限额状态已置位，后续书籍将不再尝试下载");
        }

        Ok(true)
    }
}

/// 页面中是否存在限额信号
///
/// 三种信号按"或"组合：限额文字、专门的错误区域、用尽的 N/N 计数。
pub fn limit_signal_in(html: &str) -> bool {
    if html.contains(LIMIT_PHRASE) || html.contains(LIMIT_PHRASE_SHORT) {
        return true;
    }

    let document = Html::parse_document(html);
    if document.select(&LIMIT_ERROR_REGION).next().is_some() {
        return true;
    }

    exhausted_counter(html).is_some()
}

/// 提取限额错误区域的详情文字
fn limit_detail(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&LIMIT_ERROR_REGION)
        .next()
        .map(|region| region.text().collect::<String>().trim().to_string())
}

/// 查找用尽的用量计数（分子等于分母，如 "20/20"）
fn exhausted_counter(html: &str) -> Option<String> {
    for caps in USAGE_COUNTER.captures_iter(html) {
        let used = &caps[1];
        let total = &caps[2];
        // regex 不支持反向引用，数值相等在代码里比较
        if used == total && used.parse::<u32>().map(|n| n > 0).unwrap_or(false) {
            return Some(format!("{}/{}", used, total));
        }
    }
    None
}
