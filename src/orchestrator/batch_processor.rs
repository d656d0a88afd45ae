//! 批量下载编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责会话引导和批量书籍的处理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、启动浏览器、登录、打开榜单
//! 2. **目录提取**：把榜单页解析成 `Vec<BookRecord>`
//! 3. **选择循环**：展示列表、收集下载模式和编号选择
//! 4. **串行处理**：逐本驱动 BookFlow，书与书之间固定停顿
//! 5. **限额响应**：限额触发后立即停止剩余书籍
//! 6. **全局统计**：汇总成功 / 跳过 / 失败数量
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单本书的细节
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **严格串行**：一个浏览器会话同一时刻只能打开一个详情页，
//!   不存在并发处理
//! - **向下委托**：委托 BookFlow 处理单本书

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser;
use crate::cli;
use crate::cli::DownloadMode;
use crate::config::Config;
use crate::infrastructure::{Locator, PageDriver};
use crate::models::{BookRecord, ProcessOutcome, ProcessStats};
use crate::services::{CatalogExtractor, LoginService, NavigationService, QuotaState};
use crate::utils::logging::init_log_file;
use crate::workflow::{BookCtx, BookFlow};

/// 站点标题片段，用于确认首页加载
const SITE_TITLE: &str = "Z-Library";

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    driver: PageDriver,
    locator: Locator,
    quota: QuotaState,
}

/// 一次批量处理的汇总结果
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchReport {
    pub stats: ProcessStats,
    /// 是否因限额触发而提前停止
    pub stopped_early: bool,
}

impl BatchReport {
    /// 吸收一次处理结果，返回是否继续处理后续书籍
    fn absorb(&mut self, outcome: &ProcessOutcome) -> bool {
        self.stats.add_outcome(outcome);
        if matches!(outcome, ProcessOutcome::LimitReached) {
            self.stopped_early = true;
            return false;
        }
        true
    }
}

impl App {
    /// 初始化应用：启动浏览器、登录、打开最受欢迎榜单
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        // 启动浏览器并打开首页
        let (browser, page) =
            browser::launch_browser_and_page(&config.base_url, config.headless).await?;

        let driver = PageDriver::new(page.clone());
        let locator = Locator::new(page, Duration::from_secs(config.locator_timeout_secs));

        // 等待首页加载
        if !locator
            .wait_title_contains(SITE_TITLE, Duration::from_secs(15))
            .await
        {
            anyhow::bail!("首页加载失败或超时");
        }
        info!(
            "✅ 页面加载成功。当前标题: {}",
            driver.current_title().await.unwrap_or_default()
        );

        // 登录
        let (email, password) = cli::prompt_credentials();
        let login = LoginService::new(Duration::from_secs(config.locator_timeout_secs));
        if !login.login(&driver, &locator, &email, &password).await? {
            anyhow::bail!("登录失败，程序退出");
        }

        // 导航到最受欢迎书籍榜单
        let navigation = NavigationService::new(&config);
        if !navigation.goto_popular(&locator).await? {
            anyhow::bail!("导航失败，程序退出");
        }

        Ok(Self {
            config,
            browser,
            driver,
            locator,
            quota: QuotaState::new(),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 提取书籍信息
        let extractor = CatalogExtractor::new();
        let books = extractor.extract(&self.driver).await?;

        if books.is_empty() {
            warn!("❌ 没有找到书籍，程序退出");
            return Ok(());
        }

        // 展示 / 选择循环
        let mut start_display_index = 1;
        loop {
            cli::display_books(&books, start_display_index, self.config.books_per_page);

            let mode = cli::prompt_download_mode();

            if mode == DownloadMode::Repage {
                // 用户想要重新选择起始显示位置
                start_display_index = cli::prompt_repage_start(books.len());
                continue;
            }

            // 根据模式获取选中的书籍编号
            let selected_indices = cli::prompt_selection(mode, books.len());

            // 构建要下载的书籍列表（编号从1开始，列表索引从0开始）
            let books_to_download: Vec<&BookRecord> = selected_indices
                .iter()
                .map(|&idx| &books[idx - 1])
                .collect();

            if books_to_download.is_empty() {
                println!("❌ 没有选择要下载的书籍");
                continue;
            }

            println!("\n🎯 已选择 {} 本书籍进行下载：", books_to_download.len());
            for (i, book) in books_to_download.iter().enumerate() {
                println!("{:3}. 《{}》", i + 1, book.title);
            }

            if !cli::confirm("\n确认开始下载？(输入'y'或'是'开始，其他键取消): ") {
                println!("下载已取消");
                break;
            }

            // 处理选中的书籍
            let report = self.process_selected(&books_to_download).await?;

            print_final_stats(&report, &self.config);
            break;
        }

        Ok(())
    }

    /// 串行处理选中的书籍
    ///
    /// 一个浏览器会话只能打开一个详情页，必须严格串行；
    /// 每本书之间插入固定停顿，避免触发请求频率防御。
    async fn process_selected(&self, books: &[&BookRecord]) -> Result<BatchReport> {
        let flow = BookFlow::new(&self.config, self.quota.clone());
        let mut report = BatchReport::default();
        let total = books.len();

        for (i, book) in books.iter().enumerate() {
            log_book_start(i + 1, total, book.index);

            let ctx = BookCtx::new(i + 1, total);
            let outcome = flow.run(&self.driver, &self.locator, book, &ctx).await?;

            let keep_going = report.absorb(&outcome);

            match outcome {
                ProcessOutcome::Success => info!("✅ 《{}》处理成功", book.title),
                ProcessOutcome::SkippedNoResource => {
                    warn!("⚠️ 《{}》跳过下载（无资源），继续下一本", book.title)
                }
                ProcessOutcome::SkippedNoTarget => {
                    warn!("⚠️ 《{}》跳过，继续下一本", book.title)
                }
                ProcessOutcome::Failed => error!("❌ 《{}》处理失败", book.title),
                ProcessOutcome::LimitReached => {
                    warn!("⚠️ 检测到下载限额已用完，停止处理后续书籍")
                }
            }

            if !keep_going {
                self.handle_download_limit().await;
                break;
            }

            // 成功下载后限额也可能刚好用尽（点击已发出，本书计成功）
            if self.quota.is_tripped() {
                report.stopped_early = true;
                warn!("⚠️ 本次下载后限额已用完，停止处理后续书籍");
                self.handle_download_limit().await;
                break;
            }

            // 添加短暂延迟，避免请求过快
            sleep(Duration::from_secs(self.config.pause_between_books_secs)).await;
        }

        Ok(report)
    }

    /// 处理下载限额达到的情况
    async fn handle_download_limit(&self) {
        println!("\n{}", "=".repeat(60));
        println!("⚠️ 检测到下载限额已达到！");
        println!("{}", "=".repeat(60));
        println!("   每日下载量：普通账户20/20已用完");
        println!("   您可以：");
        println!("   1. 等待次日限额重置");
        println!("   2. 捐款或升级Premium账户提高限额");
        println!("{}", "=".repeat(60));

        // 询问用户是否等待当前下载完成
        if cli::confirm("\n是否等待当前下载完成？(输入'是'等待，其他键立即退出): ") {
            println!("等待下载完成...");
            let wait_time = 30;
            println!("等待 {} 秒...", wait_time);
            for remaining in (1..=wait_time).rev() {
                print!("剩余等待时间: {}秒\r", remaining);
                let _ = std::io::stdout().flush();
                sleep(Duration::from_secs(1)).await;
            }
            println!("\n等待完成");
        } else {
            println!("立即停止程序...");
        }
    }

    /// 收尾：限额用尽时延迟后自动关闭，否则询问用户
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.quota.is_tripped() {
            // 限额已满，留出时间让进行中的下载收尾
            println!("\n程序将在10秒后自动关闭...");
            sleep(Duration::from_secs(10)).await;
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器时出错: {}", e);
            }
            println!("浏览器已关闭。");
        } else if cli::confirm("\n是否已完成浏览？(输入'是'或'yes'关闭浏览器，其他键继续): ") {
            println!("正在关闭浏览器...");
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器时出错: {}", e);
            }
            println!("浏览器已经关闭。");
        } else {
            println!("浏览器保持打开状态，您可以继续操作");
        }
        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 最受欢迎书籍批量下载");
    info!("📊 无头模式: {}", config.headless);
    info!("{}", "=".repeat(60));
}

fn log_book_start(position: usize, total: usize, book_index: usize) {
    info!("\n{}", "=".repeat(60));
    info!("正在处理第 {} 本/共 {} 本", position, total);
    info!("书籍编号: {}", book_index);
}

fn print_final_stats(report: &BatchReport, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 下载统计结果:");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("   成功下载: {} 本", report.stats.success);
    info!("   跳过: {} 本", report.stats.skipped);
    info!("   失败: {} 本", report.stats.failed);
    if report.stopped_early {
        info!("   因下载限额已满而停止");
    } else {
        info!("   任务完成");
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_counts_and_continues() {
        let mut report = BatchReport::default();
        assert!(report.absorb(&ProcessOutcome::Success));
        assert!(report.absorb(&ProcessOutcome::SkippedNoTarget));
        assert!(report.absorb(&ProcessOutcome::Failed));
        assert_eq!(report.stats.success, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(report.stats.failed, 1);
        assert!(!report.stopped_early);
    }

    #[test]
    fn test_absorb_limit_reached_halts() {
        let mut report = BatchReport::default();
        assert!(report.absorb(&ProcessOutcome::Success));
        assert!(!report.absorb(&ProcessOutcome::LimitReached));
        assert!(report.stopped_early);
        // 限额不计入任何计数器
        assert_eq!(report.stats.total(), 1);
    }

    /// 尾部模式选中 8..=12，第 10 本触发限额后批次立即停止
    #[test]
    fn test_tail_batch_halts_at_limit() {
        use crate::models::SelectionSpec;

        let indices = SelectionSpec::Tail { start: 8 }.resolve(12).unwrap();
        assert_eq!(indices, vec![8, 9, 10, 11, 12]);

        let outcomes = [
            ProcessOutcome::Success,      // 第 8 本
            ProcessOutcome::Success,      // 第 9 本
            ProcessOutcome::LimitReached, // 第 10 本触发限额
            ProcessOutcome::Success,      // 不应该被处理
            ProcessOutcome::Success,
        ];

        let mut report = BatchReport::default();
        let mut attempted = 0;
        for outcome in &outcomes {
            attempted += 1;
            if !report.absorb(outcome) {
                break;
            }
        }

        assert_eq!(attempted, 3);
        assert!(report.stopped_early);
        assert_eq!(report.stats.success, 2);
    }
}
