//! 目录提取服务 - 业务能力层
//!
//! 把渲染后的榜单页解析成有序的书籍记录列表。
//! 解析本身是纯函数，方便离线测试。

use std::sync::LazyLock;

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::infrastructure::PageDriver;
use crate::models::BookRecord;

/// 榜单页上的书籍封面元素（渲染完成后带 ready 类）
static BOOK_COVER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("z-cover.ready").unwrap());

/// 目录提取器
pub struct CatalogExtractor;

impl CatalogExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 从当前页面提取书籍列表
    ///
    /// 找不到任何书籍时返回空列表（软失败），由调用方决定是重试还是终止。
    pub async fn extract(&self, driver: &PageDriver) -> Result<Vec<BookRecord>> {
        info!("📚 开始提取书籍信息...");

        let page_source = driver.page_content().await?;
        let books = parse_book_list(&page_source);

        if books.is_empty() {
            warn!("❌ 未找到书籍条目，请检查页面结构");
        } else {
            info!("✅ 共找到 {} 本书籍", books.len());
        }

        Ok(books)
    }
}

impl Default for CatalogExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析榜单页 HTML，按文档顺序生成 1 起始编号的书籍记录
pub fn parse_book_list(html: &str) -> Vec<BookRecord> {
    let document = Html::parse_document(html);

    document
        .select(&BOOK_COVER)
        .enumerate()
        .map(|(i, cover)| {
            let raw_title = cover.value().attr("title").unwrap_or("标题未找到");
            BookRecord {
                index: i + 1,
                title: sanitize_title(raw_title),
                raw_title: raw_title.to_string(),
                author: cover.value().attr("author").unwrap_or("").to_string(),
                isbn: cover.value().attr("isbn").unwrap_or("").to_string(),
                id: cover.value().attr("id").unwrap_or("").to_string(),
            }
        })
        .collect()
}

/// 清理书名中的引号，只保留基本字符
///
/// 清理后的书名可以安全地嵌入 CSS 属性选择器。
fn sanitize_title(raw: &str) -> String {
    raw.replace(['"', '\''], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"
        <html><body>
            <z-cover class="ready" id="1001" title="三体" author="刘慈欣" isbn="9787536692930"></z-cover>
            <z-cover class="ready" id="1002" title='他说:"你好"' author="佚名"></z-cover>
            <z-cover class="ready" title="无属性之书"></z-cover>
            <z-cover class="loading" title="渲染中的书"></z-cover>
        </body></html>
    "#;

    #[test]
    fn test_indices_are_contiguous_from_one() {
        let books = parse_book_list(LIST_PAGE);
        assert_eq!(books.len(), 3);
        let indices: Vec<usize> = books.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_only_ready_covers_extracted() {
        let books = parse_book_list(LIST_PAGE);
        assert!(books.iter().all(|b| b.title != "渲染中的书"));
    }

    #[test]
    fn test_attributes_extracted() {
        let books = parse_book_list(LIST_PAGE);
        assert_eq!(books[0].title, "三体");
        assert_eq!(books[0].author, "刘慈欣");
        assert_eq!(books[0].isbn, "9787536692930");
        assert_eq!(books[0].id, "1001");
    }

    #[test]
    fn test_quotes_stripped_from_title_but_kept_in_raw() {
        let books = parse_book_list(LIST_PAGE);
        assert_eq!(books[1].title, "他说:你好");
        assert_eq!(books[1].raw_title, r#"他说:"你好""#);
    }

    #[test]
    fn test_missing_attributes_default_to_empty() {
        let books = parse_book_list(LIST_PAGE);
        assert_eq!(books[2].author, "");
        assert_eq!(books[2].isbn, "");
        assert_eq!(books[2].id, "");
    }

    #[test]
    fn test_empty_page_yields_empty_list() {
        let books = parse_book_list("<html><body><p>没有任何书</p></body></html>");
        assert!(books.is_empty());
    }
}
