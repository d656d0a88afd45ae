/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 站点首页URL
    pub base_url: String,
    /// 最受欢迎榜单URL
    pub popular_url: String,
    /// 是否使用无头模式
    pub headless: bool,
    /// 元素定位默认超时（秒）
    pub locator_timeout_secs: u64,
    /// 页面标题验证超时（秒）
    pub title_timeout_secs: u64,
    /// 每本书之间的间隔（秒），避免触发请求频率防御
    pub pause_between_books_secs: u64,
    /// 点击下载后等待下载注册的时间（秒）
    pub post_download_pause_secs: u64,
    /// 书籍列表每页显示数量
    pub books_per_page: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://zh.101isfj.ru/".to_string(),
            popular_url: "https://zh.101isfj.ru/popular".to_string(),
            headless: false,
            locator_timeout_secs: 10,
            title_timeout_secs: 8,
            pause_between_books_secs: 1,
            post_download_pause_secs: 3,
            books_per_page: 100,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: std::env::var("BASE_URL").unwrap_or(default.base_url),
            popular_url: std::env::var("POPULAR_URL").unwrap_or(default.popular_url),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            locator_timeout_secs: std::env::var("LOCATOR_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.locator_timeout_secs),
            title_timeout_secs: std::env::var("TITLE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.title_timeout_secs),
            pause_between_books_secs: std::env::var("PAUSE_BETWEEN_BOOKS_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pause_between_books_secs),
            post_download_pause_secs: std::env::var("POST_DOWNLOAD_PAUSE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.post_download_pause_secs),
            books_per_page: std::env::var("BOOKS_PER_PAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.books_per_page),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}
