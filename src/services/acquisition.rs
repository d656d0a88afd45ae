//! 下载服务 - 业务能力层
//!
//! 在书籍详情页上触发目标格式（PDF）的下载：
//! 主按钮就是 PDF 时直接触发；否则展开其他格式下拉菜单，
//! 在所有 PDF 候选中选体积最大的一个。
//! 所有大小统一换算成 KB 再比较。

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::infrastructure::{Locator, PageDriver};
use crate::services::quota::QuotaMonitor;

/// 主下载按钮
const MAIN_DOWNLOAD_BUTTON: &str = "a.addDownloadedBook.btn.btn-default";
/// 主按钮上的格式标签
const MAIN_BUTTON_EXTENSION: &str = "a.addDownloadedBook.btn.btn-default .book-property__extension";
/// 其他格式下拉按钮
const OTHER_FORMATS_BUTTON: &str = "#btnCheckOtherFormats";
/// 下拉菜单中的下载项
const DROPDOWN_ITEMS: &str = ".dropdown-menu a.addDownloadedBook";

static DROPDOWN_ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(DROPDOWN_ITEMS).unwrap());
static EXTENSION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".book-property__extension").unwrap());
static SIZE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".book-property__size").unwrap());

/// 文件大小，如 "2.5 MB"、"356 KB"
static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)\s*([KMG]?B)").unwrap());

/// 目标下载格式
const TARGET_EXTENSION: &str = "pdf";

/// 一次下载尝试的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// 已触发下载
    Triggered,
    /// 没有目标格式可下载（未触发任何点击）
    NoResource,
    /// 触发点击前检测到限额
    LimitReached,
    /// 尝试触发但未确认
    Failed,
}

/// 下拉菜单中的一个格式候选
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOption {
    /// 在下拉菜单中的位置（0 起始），用于脚本点击
    pub position: usize,
    pub extension: String,
    pub size_text: String,
    pub size_kb: f64,
}

/// 下载服务
pub struct AcquisitionService {
    button_timeout: Duration,
}

impl AcquisitionService {
    pub fn new(button_timeout: Duration) -> Self {
        Self { button_timeout }
    }

    /// 下载体积最大的 PDF
    ///
    /// 触发点击之前会再次检查限额；点击之后的限额检查由流程层负责。
    pub async fn download_largest_pdf(
        &self,
        driver: &PageDriver,
        locator: &Locator,
        quota: &QuotaMonitor,
    ) -> Result<AcquireOutcome> {
        info!("开始查找PDF格式...");

        let main_button = match locator
            .wait_clickable(MAIN_DOWNLOAD_BUTTON, self.button_timeout)
            .await
        {
            Ok(el) => el,
            Err(e) => {
                warn!("未找到主下载按钮: {}", e);
                return Ok(AcquireOutcome::NoResource);
            }
        };

        // 读取主按钮的格式
        let extension = match locator.find(MAIN_BUTTON_EXTENSION).await {
            Some(el) => el
                .inner_text()
                .await?
                .unwrap_or_default()
                .trim()
                .to_lowercase(),
            None => String::new(),
        };
        info!("主按钮格式: {}", extension);

        if extension == TARGET_EXTENSION {
            // 下载前再次检查限额
            if quota.check_limit(driver).await? {
                warn!("❌ 下载前检测到限额已用完，停止下载");
                return Ok(AcquireOutcome::LimitReached);
            }

            if main_button.click().await.is_err() {
                warn!("主按钮点击失败");
                return Ok(AcquireOutcome::Failed);
            }
            info!("✅ 已开始下载PDF");
            return Ok(AcquireOutcome::Triggered);
        }

        info!("主按钮不是PDF，是{}格式", extension.to_uppercase());
        self.download_from_dropdown(driver, locator, quota).await
    }

    /// 从其他格式下拉菜单中选最大的 PDF 下载
    async fn download_from_dropdown(
        &self,
        driver: &PageDriver,
        locator: &Locator,
        quota: &QuotaMonitor,
    ) -> Result<AcquireOutcome> {
        let dropdown_button = match locator
            .wait_clickable(OTHER_FORMATS_BUTTON, self.button_timeout)
            .await
        {
            Ok(el) => el,
            Err(e) => {
                warn!("未找到其他格式下拉按钮: {}", e);
                return Ok(AcquireOutcome::NoResource);
            }
        };

        if dropdown_button.click().await.is_err() {
            warn!("下拉按钮点击失败");
            return Ok(AcquireOutcome::Failed);
        }
        info!("已点击下拉按钮");
        tokio::time::sleep(Duration::from_secs(1)).await;

        // 解析下拉菜单中的所有下载项
        let page_source = driver.page_content().await?;
        let options = parse_format_options(&page_source);
        info!("找到 {} 个下载选项", options.len());

        let largest = match largest_of_target(&options) {
            Some(option) => option,
            None => {
                warn!("❌ 没有找到PDF格式");
                return Ok(AcquireOutcome::NoResource);
            }
        };
        info!("最大PDF: {}", largest.size_text);

        // 开始下载前最后检查一次限额
        if quota.check_limit(driver).await? {
            warn!("❌ 开始下载前检测到限额已用完，停止下载");
            return Ok(AcquireOutcome::LimitReached);
        }

        // 点击下载
        if !locator
            .script_click_nth(DROPDOWN_ITEMS, largest.position)
            .await?
        {
            warn!("下载项点击失败");
            return Ok(AcquireOutcome::Failed);
        }
        info!("✅ 已开始下载最大PDF ({})", largest.size_text);
        Ok(AcquireOutcome::Triggered)
    }
}

/// 解析下拉菜单中的格式候选
pub fn parse_format_options(html: &str) -> Vec<FormatOption> {
    let document = Html::parse_document(html);

    document
        .select(&DROPDOWN_ITEM_SEL)
        .enumerate()
        .filter_map(|(position, item)| {
            let extension = item
                .select(&EXTENSION_SEL)
                .next()?
                .text()
                .collect::<String>()
                .trim()
                .to_lowercase();
            let size_text = item
                .select(&SIZE_SEL)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let size_kb = convert_to_kb(&size_text);
            Some(FormatOption {
                position,
                extension,
                size_text,
                size_kb,
            })
        })
        .collect()
}

/// 在候选中选体积最大的目标格式
pub fn largest_of_target(options: &[FormatOption]) -> Option<&FormatOption> {
    options
        .iter()
        .filter(|option| option.extension == TARGET_EXTENSION)
        .max_by(|a, b| {
            a.size_kb
                .partial_cmp(&b.size_kb)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// 把文件大小字符串统一换算成 KB
///
/// 无法解析时返回 0。
pub fn convert_to_kb(size_str: &str) -> f64 {
    let upper = size_str.to_uppercase();
    let caps = match SIZE_PATTERN.captures(&upper) {
        Some(caps) => caps,
        None => return 0.0,
    };

    let value: f64 = match caps[1].parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };

    match &caps[2] {
        "KB" => value,
        "MB" => value * 1024.0,
        "GB" => value * 1024.0 * 1024.0,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_to_kb_units() {
        assert_eq!(convert_to_kb("100 KB"), 100.0);
        assert_eq!(convert_to_kb("2.5 MB"), 2560.0);
        assert_eq!(convert_to_kb("1 GB"), 1048576.0);
    }

    #[test]
    fn test_convert_to_kb_case_and_spacing() {
        assert_eq!(convert_to_kb("2.5mb"), 2560.0);
        assert_eq!(convert_to_kb("356KB"), 356.0);
    }

    #[test]
    fn test_convert_to_kb_unparseable_is_zero() {
        assert_eq!(convert_to_kb(""), 0.0);
        assert_eq!(convert_to_kb("未知大小"), 0.0);
    }

    fn option(position: usize, extension: &str, size_text: &str) -> FormatOption {
        FormatOption {
            position,
            extension: extension.to_string(),
            size_text: size_text.to_string(),
            size_kb: convert_to_kb(size_text),
        }
    }

    #[test]
    fn test_largest_pdf_selected() {
        let options = vec![
            option(0, "epub", "1.2 MB"),
            option(1, "pdf", "2.5 MB"),
            option(2, "pdf", "18.7 MB"),
            option(3, "pdf", "900 KB"),
        ];
        let largest = largest_of_target(&options).unwrap();
        assert_eq!(largest.position, 2);
        assert_eq!(largest.size_text, "18.7 MB");
    }

    #[test]
    fn test_largest_selection_stable_under_reordering() {
        let mut options = vec![
            option(0, "pdf", "900 KB"),
            option(1, "pdf", "18.7 MB"),
            option(2, "pdf", "2.5 MB"),
        ];
        let first = largest_of_target(&options).unwrap().size_kb;
        options.reverse();
        let second = largest_of_target(&options).unwrap().size_kb;
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_pdf_returns_none() {
        let options = vec![option(0, "epub", "1.2 MB"), option(1, "mobi", "3 MB")];
        assert!(largest_of_target(&options).is_none());
    }

    #[test]
    fn test_parse_format_options_from_dropdown_html() {
        let html = r#"
        <html><body>
            <div class="dropdown-menu">
                <a class="addDownloadedBook" href="/dl/1">
                    <span class="book-property__extension">EPUB</span>
                    <span class="book-property__size">1.2 MB</span>
                </a>
                <a class="addDownloadedBook" href="/dl/2">
                    <span class="book-property__extension">PDF</span>
                    <span class="book-property__size">18.7 MB</span>
                </a>
            </div>
        </body></html>
        "#;
        let options = parse_format_options(html);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].extension, "epub");
        assert_eq!(options[1].extension, "pdf");
        assert_eq!(options[1].position, 1);
        assert_eq!(options[1].size_kb, 18.7 * 1024.0);
    }
}
