use serde::{Deserialize, Serialize};

/// 一条书籍记录
///
/// 由目录提取器从一次列表页快照中批量创建，创建后不可变，
/// 只在本次运行的内存中存在。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    /// 在提取结果中的 1 起始位置，仅用于用户选择
    pub index: usize,
    /// 清理后的书名（去掉引号，安全用于选择器构造和日志）
    pub title: String,
    /// 原始书名（用于和页面内容精确匹配）
    pub raw_title: String,
    /// 作者，源页面缺失时为空
    pub author: String,
    /// ISBN，源页面缺失时为空
    pub isbn: String,
    /// 站内 ID，源页面缺失时为空
    pub id: String,
}

impl BookRecord {
    /// 用于详情页验证的标题前缀
    ///
    /// 页面标题可能被截断，取前 20 个字符做包含匹配。
    pub fn title_prefix(&self) -> String {
        self.title.chars().take(20).collect()
    }
}

/// 单本书籍的处理结果
///
/// 每次处理恰好产生一个变体，由批量编排器消费。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// 下载已触发
    Success,
    /// 定位或点击失败，跳过本书
    SkippedNoTarget,
    /// 没有可下载的目标格式，跳过本书
    SkippedNoResource,
    /// 处理本书期间触发了每日限额
    LimitReached,
    /// 触发了下载但未能确认
    Failed,
}

/// 批量处理统计
#[derive(Default, Debug, Clone, Copy)]
pub struct ProcessStats {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ProcessStats {
    pub fn add_outcome(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Success => self.success += 1,
            ProcessOutcome::SkippedNoTarget | ProcessOutcome::SkippedNoResource => {
                self.skipped += 1
            }
            ProcessOutcome::Failed => self.failed += 1,
            // 限额触发不计入任何计数器，由编排器单独记录提前停止
            ProcessOutcome::LimitReached => {}
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefix_truncates_at_20_chars() {
        let book = BookRecord {
            index: 1,
            title: "深入理解计算机系统（原书第3版）经典黑皮书系列".to_string(),
            raw_title: String::new(),
            author: String::new(),
            isbn: String::new(),
            id: String::new(),
        };
        assert_eq!(book.title_prefix().chars().count(), 20);
        assert!(book.title.starts_with(&book.title_prefix()));
    }

    #[test]
    fn test_title_prefix_short_title_unchanged() {
        let book = BookRecord {
            index: 1,
            title: "活着".to_string(),
            raw_title: "活着".to_string(),
            author: "余华".to_string(),
            isbn: String::new(),
            id: String::new(),
        };
        assert_eq!(book.title_prefix(), "活着");
    }

    #[test]
    fn test_stats_add_outcome() {
        let mut stats = ProcessStats::default();
        stats.add_outcome(&ProcessOutcome::Success);
        stats.add_outcome(&ProcessOutcome::SkippedNoTarget);
        stats.add_outcome(&ProcessOutcome::SkippedNoResource);
        stats.add_outcome(&ProcessOutcome::Failed);
        stats.add_outcome(&ProcessOutcome::LimitReached);

        assert_eq!(stats.success, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.failed, 1);
        // 限额不计入总数
        assert_eq!(stats.total(), 4);
    }
}
