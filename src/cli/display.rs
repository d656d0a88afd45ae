//! 书籍列表展示
//!
//! 以分页表格的形式打印提取到的书籍列表。

use crate::models::BookRecord;
use crate::utils::logging::truncate_text;

/// 显示书籍列表，从 start_index 开始最多显示一页
///
/// 返回本页实际显示到的最后一个编号。
pub fn display_books(books: &[BookRecord], start_index: usize, books_per_page: usize) -> usize {
    let total_books = books.len();

    if books.is_empty() {
        println!("❌ 没有书籍可显示");
        return 0;
    }

    // 计算实际开始索引（确保不超出范围）
    let actual_start = start_index.clamp(1, total_books);

    println!(
        "\n📚 书籍列表（第{}本开始，共{}本）:",
        actual_start, total_books
    );
    println!("{}", "=".repeat(100));
    println!("{:<6} {:<60} {:<30}", "编号", "书名", "作者");
    println!("{}", "-".repeat(100));

    let end_index = (actual_start + books_per_page - 1).min(total_books);

    for book in &books[actual_start - 1..end_index] {
        let title = truncate_text(&book.title, 55);
        let author = truncate_text(&book.author, 25);
        println!("{:<6} {:<60} {:<30}", book.index, title, author);
    }

    println!("{}", "-".repeat(100));

    if end_index < total_books {
        println!(
            "显示第 {}-{} 本书籍，还有 {} 本书籍未显示",
            actual_start,
            end_index,
            total_books - end_index
        );
    } else {
        println!("显示第 {}-{} 本书籍，已显示所有书籍", actual_start, end_index);
    }

    end_index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_books(n: usize) -> Vec<BookRecord> {
        (1..=n)
            .map(|i| BookRecord {
                index: i,
                title: format!("书籍{}", i),
                raw_title: format!("书籍{}", i),
                author: "作者".to_string(),
                isbn: String::new(),
                id: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_display_returns_last_shown_index() {
        let books = make_books(150);
        assert_eq!(display_books(&books, 1, 100), 100);
        assert_eq!(display_books(&books, 101, 100), 150);
    }

    #[test]
    fn test_display_clamps_start_index() {
        let books = make_books(10);
        // 起始超出范围时回落到最后一本
        assert_eq!(display_books(&books, 999, 100), 10);
    }

    #[test]
    fn test_display_empty_list() {
        assert_eq!(display_books(&[], 1, 100), 0);
    }
}
