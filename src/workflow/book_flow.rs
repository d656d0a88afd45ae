//! 单本书处理流程 - 流程层
//!
//! 核心职责：定义"一本书"的完整处理流程
//!
//! 流程顺序：
//! 1. 定位并点击书籍 → 进入详情页
//! 2. 验证详情页与记录匹配
//! 3. 限额检查 → 触发下载（下载服务内部在点击前再查一次）
//! 4. 下载后限额复查 → 返回列表
//!
//! 任何一步失败都被吸收为一个 ProcessOutcome 变体，不向上抛异常；
//! 只有限额触发会让编排器停止整个批次。

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{Locator, PageDriver};
use crate::models::{BookRecord, ProcessOutcome};
use crate::services::{AcquireOutcome, AcquisitionService, NavigationService, QuotaMonitor, QuotaState};
use crate::workflow::book_ctx::BookCtx;

/// 单本书处理流程
///
/// - 编排完整的处理步骤
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）
pub struct BookFlow {
    navigation: NavigationService,
    acquisition: AcquisitionService,
    quota: QuotaMonitor,
    title_timeout: Duration,
    post_download_pause: Duration,
}

impl BookFlow {
    /// 创建新的处理流程
    pub fn new(config: &Config, quota_state: QuotaState) -> Self {
        Self {
            navigation: NavigationService::new(config),
            acquisition: AcquisitionService::new(Duration::from_secs(5)),
            quota: QuotaMonitor::new(quota_state),
            title_timeout: Duration::from_secs(config.title_timeout_secs),
            post_download_pause: Duration::from_secs(config.post_download_pause_secs),
        }
    }

    pub async fn run(
        &self,
        driver: &PageDriver,
        locator: &Locator,
        book: &BookRecord,
        ctx: &BookCtx,
    ) -> Result<ProcessOutcome> {
        // 限额已触发时直接短路，不做任何页面操作
        if let Some(outcome) = self.short_circuit() {
            warn!("⚠️ 下载限额已用完，停止处理新书籍");
            return Ok(outcome);
        }

        info!(
            "\n📖 正在处理第{}本书: 《{}》 ({}/{})",
            book.index, book.title, ctx.position, ctx.batch_total
        );

        // 点击书籍进入详情页
        if !self.open_book(locator, book).await? {
            warn!("❌ 点击书籍失败，跳过本书");
            self.recover_to_list(driver, locator).await;
            return Ok(ProcessOutcome::SkippedNoTarget);
        }

        // 验证是否成功进入书籍页面
        if !self.verify_book_page(driver, locator, book).await? {
            let mismatch = AppError::navigation_mismatch(&book.title);
            warn!("❌ {}，返回列表", mismatch);
            self.recover_to_list(driver, locator).await;
            return Ok(ProcessOutcome::SkippedNoTarget);
        }

        // 进入详情页后先检查限额
        if self.quota.check_limit(driver).await? {
            warn!("❌ 已达到每日下载限额，停止所有下载");
            return Ok(ProcessOutcome::LimitReached);
        }

        // 尝试下载 PDF（服务内部会在触发点击前再查一次限额）
        let outcome = match self
            .acquisition
            .download_largest_pdf(driver, locator, &self.quota)
            .await?
        {
            AcquireOutcome::Triggered => {
                info!("✅ 《{}》下载已开始", book.title);
                // 等待下载注册，再复查限额
                sleep(self.post_download_pause).await;
                if self.quota.check_limit(driver).await? {
                    // 点击已经发出，本书仍算成功；限额状态已置位，
                    // 之后的书籍会被短路
                    warn!("⚠️ 本次下载后已达到每日限额");
                }
                ProcessOutcome::Success
            }
            AcquireOutcome::NoResource => {
                warn!("❌ 《{}》没有可下载的PDF", book.title);
                ProcessOutcome::SkippedNoResource
            }
            AcquireOutcome::LimitReached => return Ok(ProcessOutcome::LimitReached),
            AcquireOutcome::Failed => {
                warn!("❌ 《{}》下载触发失败", book.title);
                ProcessOutcome::Failed
            }
        };

        // 返回书籍列表（失败只记录，不影响本书结果）
        self.navigation.back_to_list(driver, locator).await?;
        sleep(Duration::from_secs(2)).await;

        Ok(outcome)
    }

    /// 限额已触发时的短路结果
    ///
    /// 进入流程前调用，命中时不做任何页面操作。
    fn short_circuit(&self) -> Option<ProcessOutcome> {
        if self.quota.state().is_tripped() {
            Some(ProcessOutcome::LimitReached)
        } else {
            None
        }
    }

    /// 定位并点击书籍封面
    ///
    /// 依次尝试：站内 ID → ISBN 属性 → 标题前缀包含匹配。
    async fn open_book(&self, locator: &Locator, book: &BookRecord) -> Result<bool> {
        info!("📖 正在查找书籍: 《{}》", book.title);

        for selector in cover_selectors(book) {
            let element = match locator
                .wait_present(&selector, locator.default_timeout())
                .await
            {
                Ok(el) => el,
                Err(_) => continue,
            };
            info!("✅ 找到书籍元素");

            // 滚动到元素位置
            info!("📏 滚动到书籍位置...");
            let _ = element.scroll_into_view().await;
            sleep(Duration::from_secs(1)).await;

            // 等待可点击后点击
            match locator.wait_clickable(&selector, Duration::from_secs(5)).await {
                Ok(clickable) => {
                    info!("🖱️ 尝试点击《{}》...", book.title);
                    if clickable.click().await.is_ok() {
                        info!("✅ 成功点击《{}》", book.title);
                        return Ok(true);
                    }
                }
                Err(e) => warn!("⚠️ 元素不可点击: {}", e),
            }

            // 备用方法：通过 JS 点击
            info!("🔄 尝试备用方法：JS点击");
            if locator.script_click(&selector).await.unwrap_or(false) {
                info!("✅ 通过JS成功点击《{}》", book.title);
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// 验证是否成功打开书籍详情页
    ///
    /// 页面标题可能被截断，用标题前缀做包含匹配；
    /// 标题验证失败时依次降级到页面内容匹配和详情页标志元素。
    async fn verify_book_page(
        &self,
        driver: &PageDriver,
        locator: &Locator,
        book: &BookRecord,
    ) -> Result<bool> {
        let title_part = book.title_prefix();

        info!("🔍 验证页面标题是否包含: {}...", title_part);
        if locator
            .wait_title_contains(&title_part, self.title_timeout)
            .await
        {
            let current_title = driver.current_title().await.unwrap_or_default();
            info!("✅ 成功打开书籍详情页");
            info!("📄 当前页面标题: {}", current_title);
            return Ok(true);
        }

        // 方法2：检查页面内容中是否有书籍标题
        warn!("⚠️ 页面标题验证失败，尝试其他验证方法");
        if let Ok(page_source) = driver.page_content().await {
            if page_source.contains(&title_part) {
                info!("✅ 在页面内容中找到书籍标题");
                return Ok(true);
            }
        }

        // 方法3：检查详情页标志元素
        if locator
            .wait_present("h1.book-title", Duration::from_secs(5))
            .await
            .is_ok()
        {
            info!("✅ 找到书籍标题元素");
            return Ok(true);
        }

        warn!("❌ 无法验证是否打开《{}》的界面", book.title);
        Ok(false)
    }

    /// 跳过当前书籍前尽力回到列表页
    async fn recover_to_list(&self, driver: &PageDriver, locator: &Locator) {
        if let Err(e) = self.navigation.back_to_list(driver, locator).await {
            warn!("返回列表时出错: {}", e);
        }
        sleep(Duration::from_secs(2)).await;
    }
}

/// 书籍封面的候选选择器，按可靠程度排序
fn cover_selectors(book: &BookRecord) -> Vec<String> {
    let mut selectors = Vec::new();
    if !book.id.is_empty() {
        selectors.push(format!(r#"z-cover[id="{}"]"#, book.id));
    }
    if !book.isbn.is_empty() {
        selectors.push(format!(r#"z-cover[isbn="{}"]"#, book.isbn));
    }
    // 清理后的标题不含引号，可以安全嵌入属性选择器
    selectors.push(format!(r#"z-cover[title*="{}"]"#, book.title_prefix()));
    selectors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, isbn: &str, title: &str) -> BookRecord {
        BookRecord {
            index: 1,
            title: title.to_string(),
            raw_title: title.to_string(),
            author: String::new(),
            isbn: isbn.to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn test_cover_selectors_prefer_id_then_isbn_then_title() {
        let selectors = cover_selectors(&book("1001", "9787536692930", "三体"));
        assert_eq!(
            selectors,
            vec![
                r#"z-cover[id="1001"]"#.to_string(),
                r#"z-cover[isbn="9787536692930"]"#.to_string(),
                r#"z-cover[title*="三体"]"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_cover_selectors_fall_back_to_title_only() {
        let selectors = cover_selectors(&book("", "", "活着"));
        assert_eq!(selectors, vec![r#"z-cover[title*="活着"]"#.to_string()]);
    }

    #[test]
    fn test_cover_selector_uses_title_prefix() {
        let long_title = "深入理解计算机系统（原书第3版）经典黑皮书系列";
        let selectors = cover_selectors(&book("", "", long_title));
        let expected_prefix: String = long_title.chars().take(20).collect();
        assert_eq!(
            selectors[0],
            format!(r#"z-cover[title*="{}"]"#, expected_prefix)
        );
    }

    #[test]
    fn test_flow_short_circuits_after_limit_tripped() {
        let state = QuotaState::new();
        let flow = BookFlow::new(&Config::default(), state.clone());

        // 限额未触发时不短路
        assert_eq!(flow.short_circuit(), None);

        // 触发后每次调用都直接返回 LimitReached，不会有任何点击
        state.trip();
        assert_eq!(flow.short_circuit(), Some(ProcessOutcome::LimitReached));
        assert_eq!(flow.short_circuit(), Some(ProcessOutcome::LimitReached));
    }
}
