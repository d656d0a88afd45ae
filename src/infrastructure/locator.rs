//! 元素定位器 - 基础设施层
//!
//! 把 CDP 的即时查询包装成有界轮询等待：每一次与页面的交互都有超时上限，
//! 永远不会无限阻塞。超时以 `LocatorError::Timeout` 区分于其他错误。

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::{Element, Page};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::AppError;

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 元素定位器
///
/// 职责：
/// - 持有 Page 的克隆（Page 内部使用 Arc，克隆是安全的）
/// - 暴露"查找元素、等待元素、等待标题"的能力
/// - 不认识 BookRecord
/// - 不处理业务流程
pub struct Locator {
    page: Page,
    default_timeout: Duration,
}

impl Locator {
    /// 创建新的定位器
    pub fn new(page: Page, default_timeout: Duration) -> Self {
        Self {
            page,
            default_timeout,
        }
    }

    /// 默认超时
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// 立即查找单个元素，找不到返回 None
    pub async fn find(&self, selector: &str) -> Option<Element> {
        self.page.find_element(selector).await.ok()
    }

    /// 立即查找所有匹配的元素
    pub async fn find_all(&self, selector: &str) -> Vec<Element> {
        self.page.find_elements(selector).await.unwrap_or_default()
    }

    /// 等待元素出现在 DOM 中
    pub async fn wait_present(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, AppError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                debug!("等待元素出现超时: {}", selector);
                return Err(AppError::locator_timeout(selector, timeout));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 等待元素出现并处于可点击状态
    ///
    /// 会先滚动到元素位置，再确认元素有可点击的坐标。
    pub async fn wait_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, AppError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                if let Ok(visible) = element.scroll_into_view().await {
                    if visible.clickable_point().await.is_ok() {
                        return Ok(element);
                    }
                }
            }
            if Instant::now() >= deadline {
                debug!("等待元素可点击超时: {}", selector);
                return Err(AppError::not_clickable(selector, timeout));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 等待页面标题包含指定内容
    pub async fn wait_title_contains(&self, fragment: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(Some(title)) = self.page.get_title().await {
                if title.contains(fragment) {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                debug!("等待标题包含 '{}' 超时", fragment);
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 等待页面内容包含指定文字
    pub async fn wait_content_contains(&self, fragment: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(content) = self.page.content().await {
                if content.contains(fragment) {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                debug!("等待页面内容包含 '{}' 超时", fragment);
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 通过 JS 点击元素（普通点击失败时的备用方案）
    ///
    /// 返回是否找到并点击了元素。
    pub async fn script_click(&self, selector: &str) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.click();
                return true;
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        let result = self.page.evaluate(js_code).await?;
        let clicked: bool = result.into_value().unwrap_or(false);
        Ok(clicked)
    }

    /// 通过 JS 点击第 n 个匹配的元素（0 起始）
    pub async fn script_click_nth(&self, selector: &str, index: usize) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const els = document.querySelectorAll({});
                if (els.length <= {}) return false;
                els[{}].click();
                return true;
            }})()
            "#,
            serde_json::to_string(selector)?,
            index,
            index
        );
        let result = self.page.evaluate(js_code).await?;
        let clicked: bool = result.into_value().unwrap_or(false);
        Ok(clicked)
    }
}
