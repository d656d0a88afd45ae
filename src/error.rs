use std::fmt;
use std::time::Duration;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 元素定位错误
    Locator(LocatorError),
    /// 页面导航错误
    Navigation(NavigationError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Locator(e) => write!(f, "定位错误: {}", e),
            AppError::Navigation(e) => write!(f, "导航错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Locator(e) => Some(e),
            AppError::Navigation(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 启动浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    ConfigurationFailed {
        message: String,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::LaunchFailed { source } => {
                write!(f, "启动浏览器失败: {}", source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "浏览器配置失败: {}", message)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::LaunchFailed { source }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::ConfigurationFailed { .. } => None,
        }
    }
}

/// 元素定位错误
///
/// 定位失败永远是可恢复的：上层要么走备用定位方案，要么把本条记录记为跳过。
#[derive(Debug)]
pub enum LocatorError {
    /// 在限定时间内未找到元素
    Timeout {
        selector: String,
        timeout: Duration,
    },
    /// 在限定时间内元素未变为可点击状态
    NotClickable {
        selector: String,
        timeout: Duration,
    },
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::Timeout { selector, timeout } => {
                write!(f, "等待元素超时 ({:?}): {}", timeout, selector)
            }
            LocatorError::NotClickable { selector, timeout } => {
                write!(f, "元素不可点击 ({:?}): {}", timeout, selector)
            }
        }
    }
}

impl std::error::Error for LocatorError {}

/// 页面导航错误
#[derive(Debug)]
pub enum NavigationError {
    /// 详情页与预期记录不匹配
    Mismatch {
        expected_title: String,
    },
    /// 未能回到列表页
    ReturnFailed,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::Mismatch { expected_title } => {
                write!(f, "详情页验证失败，预期标题: {}", expected_title)
            }
            NavigationError::ReturnFailed => {
                write!(f, "所有返回列表的方法都失败了")
            }
        }
    }
}

impl std::error::Error for NavigationError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON解析失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建定位超时错误
    pub fn locator_timeout(selector: impl Into<String>, timeout: Duration) -> Self {
        AppError::Locator(LocatorError::Timeout {
            selector: selector.into(),
            timeout,
        })
    }

    /// 创建元素不可点击错误
    pub fn not_clickable(selector: impl Into<String>, timeout: Duration) -> Self {
        AppError::Locator(LocatorError::NotClickable {
            selector: selector.into(),
            timeout,
        })
    }

    /// 创建详情页验证失败错误
    pub fn navigation_mismatch(expected_title: impl Into<String>) -> Self {
        AppError::Navigation(NavigationError::Mismatch {
            expected_title: expected_title.into(),
        })
    }

    /// 判断是否为可恢复的定位/导航类错误
    ///
    /// 此类错误只影响当前记录，不会终止整个批次。
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Locator(_) | AppError::Navigation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_timeout_is_recoverable() {
        let err = AppError::locator_timeout("z-cover.ready", Duration::from_secs(10));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_navigation_mismatch_is_recoverable() {
        let err = AppError::navigation_mismatch("深入理解计算机系统");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_browser_error_not_recoverable() {
        let err = AppError::Browser(BrowserError::ConfigurationFailed {
            message: "端口被占用".to_string(),
        });
        assert!(!err.is_recoverable());
    }
}
