//! 下载选择模式
//!
//! 把用户输入解析成 SelectionSpec，再解析成具体的 1 起始编号列表。
//! 解析是纯函数，不触碰提取状态；非法输入一律拒绝并由 CLI 重新提示，
//! 绝不静默截断。

use std::fmt;

/// 用户选择的下载范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSpec {
    /// 闭区间 [start, end]
    Range { start: usize, end: usize },
    /// 显式编号集合
    Explicit(Vec<usize>),
    /// 从 start 一直到末尾
    Tail { start: usize },
}

/// 选择解析错误，展示给用户后重新提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// 格式错误（无法解析为数字）
    Malformed,
    /// 区间颠倒（start > end）
    InvertedRange { start: usize, end: usize },
    /// 编号超出 [1, total]
    OutOfBounds { index: usize, total: usize },
    /// 空的编号集合
    Empty,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Malformed => write!(f, "格式错误，请输入正确的编号格式"),
            SelectionError::InvertedRange { start, end } => {
                write!(f, "范围无效: {} 大于 {}", start, end)
            }
            SelectionError::OutOfBounds { index, total } => {
                write!(f, "编号 {} 无效，请输入1到{}之间的有效编号", index, total)
            }
            SelectionError::Empty => write!(f, "没有选择任何编号"),
        }
    }
}

impl std::error::Error for SelectionError {}

impl SelectionSpec {
    /// 解析"开始-结束"格式的范围输入
    pub fn parse_range(input: &str) -> Result<Self, SelectionError> {
        let (start_str, end_str) = input
            .split_once('-')
            .ok_or(SelectionError::Malformed)?;
        let start: usize = start_str
            .trim()
            .parse()
            .map_err(|_| SelectionError::Malformed)?;
        let end: usize = end_str
            .trim()
            .parse()
            .map_err(|_| SelectionError::Malformed)?;
        Ok(SelectionSpec::Range { start, end })
    }

    /// 解析逗号分隔的编号集合输入
    pub fn parse_explicit(input: &str) -> Result<Self, SelectionError> {
        let indices = input
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<usize>, _>>()
            .map_err(|_| SelectionError::Malformed)?;
        if indices.is_empty() {
            return Err(SelectionError::Empty);
        }
        Ok(SelectionSpec::Explicit(indices))
    }

    /// 解析单个起始编号输入
    pub fn parse_tail(input: &str) -> Result<Self, SelectionError> {
        let start: usize = input
            .trim()
            .parse()
            .map_err(|_| SelectionError::Malformed)?;
        Ok(SelectionSpec::Tail { start })
    }

    /// 把选择解析成具体的编号列表
    ///
    /// 纯函数：只依赖 total 和自身，任何编号越界即整体拒绝。
    pub fn resolve(&self, total: usize) -> Result<Vec<usize>, SelectionError> {
        match self {
            SelectionSpec::Range { start, end } => {
                if start > end {
                    return Err(SelectionError::InvertedRange {
                        start: *start,
                        end: *end,
                    });
                }
                Self::check_bounds(*start, total)?;
                Self::check_bounds(*end, total)?;
                Ok((*start..=*end).collect())
            }
            SelectionSpec::Explicit(indices) => {
                if indices.is_empty() {
                    return Err(SelectionError::Empty);
                }
                for &index in indices {
                    Self::check_bounds(index, total)?;
                }
                Ok(indices.clone())
            }
            SelectionSpec::Tail { start } => {
                Self::check_bounds(*start, total)?;
                Ok((*start..=total).collect())
            }
        }
    }

    fn check_bounds(index: usize, total: usize) -> Result<(), SelectionError> {
        if index < 1 || index > total {
            Err(SelectionError::OutOfBounds { index, total })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_resolves_to_contiguous_indices() {
        let spec = SelectionSpec::Range { start: 3, end: 5 };
        assert_eq!(spec.resolve(10).unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn test_inverted_range_rejected_not_clamped() {
        let spec = SelectionSpec::Range { start: 5, end: 3 };
        assert_eq!(
            spec.resolve(10),
            Err(SelectionError::InvertedRange { start: 5, end: 3 })
        );
    }

    #[test]
    fn test_out_of_bounds_range_rejected() {
        let spec = SelectionSpec::Range { start: 8, end: 12 };
        assert_eq!(
            spec.resolve(10),
            Err(SelectionError::OutOfBounds {
                index: 12,
                total: 10
            })
        );
    }

    #[test]
    fn test_explicit_indices_resolved_in_order() {
        let spec = SelectionSpec::parse_explicit("1,3,5").unwrap();
        assert_eq!(spec.resolve(10).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_explicit_single_invalid_index_rejects_whole_set() {
        let spec = SelectionSpec::parse_explicit("1,3,11").unwrap();
        assert_eq!(
            spec.resolve(10),
            Err(SelectionError::OutOfBounds {
                index: 11,
                total: 10
            })
        );
    }

    #[test]
    fn test_zero_index_rejected() {
        let spec = SelectionSpec::Explicit(vec![0, 2]);
        assert_eq!(
            spec.resolve(10),
            Err(SelectionError::OutOfBounds { index: 0, total: 10 })
        );
    }

    #[test]
    fn test_tail_resolves_to_end() {
        let spec = SelectionSpec::Tail { start: 8 };
        assert_eq!(spec.resolve(12).unwrap(), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_parse_range_with_spaces() {
        assert_eq!(
            SelectionSpec::parse_range(" 1 - 10 ").unwrap(),
            SelectionSpec::Range { start: 1, end: 10 }
        );
    }

    #[test]
    fn test_parse_range_malformed() {
        assert_eq!(
            SelectionSpec::parse_range("abc"),
            Err(SelectionError::Malformed)
        );
        assert_eq!(
            SelectionSpec::parse_range("1-x"),
            Err(SelectionError::Malformed)
        );
    }

    #[test]
    fn test_parse_explicit_malformed() {
        assert_eq!(
            SelectionSpec::parse_explicit("1,a,3"),
            Err(SelectionError::Malformed)
        );
    }
}
