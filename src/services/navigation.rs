//! 导航服务 - 业务能力层
//!
//! 负责打开最受欢迎榜单，以及从详情页回到列表页。
//! 返回列表是整个流程里最脆弱的一步（瞬时渲染、动画时序），
//! 因此准备了四级依次降级的返回方案，任何一级成功即终止。

use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::NavigationError;
use crate::infrastructure::{Locator, PageDriver};

/// 侧边菜单按钮
const MENU_BUTTON: &str = "section.navigation-element.navigation-menu-element div.navigation-icon";
/// 菜单里的最受欢迎入口
const POPULAR_LINK: &str = "a[href='/popular']";
/// 详情页的返回箭头
const BACK_ARROW: &str = "a.page-title__back-arrow";
/// 列表页上的书籍封面（返回成功的标志之一）
const LIST_COVER: &str = "z-cover.ready";
/// 列表页标题片段
const LIST_TITLE: &str = "最受欢迎";

/// 导航服务
pub struct NavigationService {
    popular_url: String,
    timeout: Duration,
}

impl NavigationService {
    pub fn new(config: &Config) -> Self {
        Self {
            popular_url: config.popular_url.clone(),
            timeout: Duration::from_secs(config.locator_timeout_secs),
        }
    }

    /// 从首页导航到最受欢迎书籍榜单
    pub async fn goto_popular(&self, locator: &Locator) -> Result<bool> {
        // 等首页渲染稳定后再打开菜单
        sleep(Duration::from_secs(3)).await;

        let menu_button = match locator.wait_clickable(MENU_BUTTON, self.timeout).await {
            Ok(el) => el,
            Err(e) => {
                error!("❌ 未找到菜单按钮: {}", e);
                return Ok(false);
            }
        };
        menu_button.click().await?;
        info!("✅ 成功打开菜单。");

        let popular_button = match locator.wait_clickable(POPULAR_LINK, self.timeout).await {
            Ok(el) => el,
            Err(e) => {
                error!("❌ 未找到最受欢迎入口: {}", e);
                return Ok(false);
            }
        };
        popular_button.click().await?;
        info!("✅ 成功点击最受欢迎书籍榜单。");

        // 验证跳转
        if locator.wait_title_contains(LIST_TITLE, self.timeout).await {
            info!("✅ 成功打开最受欢迎书籍榜单。");
            Ok(true)
        } else {
            error!("❌ 导航到最受欢迎书籍榜单失败");
            Ok(false)
        }
    }

    /// 返回书籍列表页面
    ///
    /// 四级方案依次尝试：返回箭头点击 → JS 点击 → 浏览器后退 → 直接导航。
    /// 四级全部失败只记录日志，不让当前记录失败（编排器会容忍陈旧页面继续）。
    pub async fn back_to_list(&self, driver: &PageDriver, locator: &Locator) -> Result<bool> {
        // 方法1：点击返回箭头
        info!("🔙 尝试点击返回按钮...");
        sleep(Duration::from_secs(2)).await;

        match locator.wait_clickable(BACK_ARROW, self.timeout).await {
            Ok(back_button) => {
                if back_button.click().await.is_ok() {
                    info!("✅ 成功点击返回键");
                    if self.wait_list_page(driver, Duration::from_secs(8)).await {
                        info!("✅ 成功返回最受欢迎书籍榜单。");
                        return Ok(true);
                    }
                    if locator
                        .wait_present(LIST_COVER, Duration::from_secs(5))
                        .await
                        .is_ok()
                    {
                        info!("✅ 检测到书籍列表，返回成功。");
                        return Ok(true);
                    }
                    warn!("⚠️ 返回验证失败，但已尝试返回");
                    return Ok(true);
                }
            }
            Err(e) => warn!("❌ 无法点击返回键: {}", e),
        }

        // 方法2：JS 点击返回箭头
        info!("尝试通过JS点击返回按钮...");
        if locator.script_click(BACK_ARROW).await.unwrap_or(false) {
            info!("✅ 通过JS点击返回键成功");
            sleep(Duration::from_secs(2)).await;
            return Ok(true);
        }

        // 方法3：浏览器后退
        info!("尝试使用浏览器后退...");
        if driver.go_back().await.is_ok() {
            sleep(Duration::from_secs(3)).await;
            if self.wait_list_page(driver, Duration::from_secs(5)).await {
                info!("✅ 使用浏览器后退成功");
                return Ok(true);
            }
        }

        // 方法4：直接导航到最受欢迎页面
        info!("尝试直接导航到最受欢迎页面...");
        if driver.navigate(&self.popular_url).await.is_ok() {
            sleep(Duration::from_secs(3)).await;
            if locator.wait_present(LIST_COVER, self.timeout).await.is_ok() {
                info!("✅ 直接导航到最受欢迎页面成功");
                return Ok(true);
            }
        }

        error!("❌ {}", NavigationError::ReturnFailed);
        Ok(false)
    }

    /// 等待列表页标志出现（标题或 URL 任一匹配即可）
    async fn wait_list_page(&self, driver: &PageDriver, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let title = driver.current_title().await.unwrap_or_default();
            let url = driver.current_url().await.unwrap_or_default();
            if title.contains(LIST_TITLE) || url.contains("popular") {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(250)).await;
        }
    }
}
