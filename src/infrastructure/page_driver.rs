//! 页面驱动 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"会话操作"的能力

use anyhow::Result;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;

/// 页面驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露导航 / 读取 / 执行脚本的能力
/// - 不认识 BookRecord
/// - 不处理业务流程
pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    /// 创建新的页面驱动
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定 URL
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    /// 当前页面 URL
    pub async fn current_url(&self) -> Result<String> {
        let url = self.page.url().await?;
        Ok(url.unwrap_or_default())
    }

    /// 当前页面标题
    pub async fn current_title(&self) -> Result<String> {
        let title = self.page.get_title().await?;
        Ok(title.unwrap_or_default())
    }

    /// 当前页面完整 HTML
    pub async fn page_content(&self) -> Result<String> {
        let content = self.page.content().await?;
        Ok(content)
    }

    /// 浏览器历史后退
    pub async fn go_back(&self) -> Result<()> {
        self.page.evaluate("window.history.back()").await?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }
}
