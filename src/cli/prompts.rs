//! 交互提示
//!
//! 所有用户输入都在这里收集：登录凭据、下载模式、编号选择、确认。
//! 非法输入一律重新提示，不向上传播。

use std::io::{self, Write};

use crate::models::SelectionSpec;

/// 用户选择的下载模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// 下载指定范围的书籍（例如：1-10）
    Range,
    /// 下载指定编号的书籍（例如：1,3,5,7）
    Explicit,
    /// 从指定编号开始一直下载到末尾
    Tail,
    /// 返回书籍列表，重新选择起始编号
    Repage,
}

/// 读取一行输入并去掉首尾空白
fn read_trimmed_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buffer = String::new();
    if io::stdin().read_line(&mut buffer).is_err() {
        return String::new();
    }
    buffer.trim().to_string()
}

/// 提示输入登录凭据
pub fn prompt_credentials() -> (String, String) {
    let email = read_trimmed_line("请输入登录邮箱: ");
    let password = read_trimmed_line("请输入登录密码: ");
    (email, password)
}

/// 提示选择下载模式
pub fn prompt_download_mode() -> DownloadMode {
    println!("\n请选择下载模式：");
    println!("1. 下载指定范围的书籍（例如：1-10）");
    println!("2. 下载指定编号的书籍（例如：1,3,5,7）");
    println!("3. 从指定编号开始一直下载到末尾");
    println!("4. 返回书籍列表，重新选择起始编号");

    loop {
        match read_trimmed_line("请输入模式编号（1/2/3/4）: ").as_str() {
            "1" => return DownloadMode::Range,
            "2" => return DownloadMode::Explicit,
            "3" => return DownloadMode::Tail,
            "4" => return DownloadMode::Repage,
            _ => println!("❌ 输入错误，请输入1、2、3或4"),
        }
    }
}

/// 按模式提示并解析编号选择，直到得到合法结果
///
/// `DownloadMode::Repage` 不在这里处理，调用前应先分流。
pub fn prompt_selection(mode: DownloadMode, total: usize) -> Vec<usize> {
    loop {
        let parsed = match mode {
            DownloadMode::Range => {
                let input = read_trimmed_line(&format!(
                    "请输入下载范围（格式：开始-结束，例如：1-{}）: ",
                    total
                ));
                SelectionSpec::parse_range(&input)
            }
            DownloadMode::Explicit => {
                let input = read_trimmed_line(&format!(
                    "请输入要下载的书籍编号（用逗号分隔，例如：1,3,5，范围：1-{}）: ",
                    total
                ));
                SelectionSpec::parse_explicit(&input)
            }
            DownloadMode::Tail => {
                let input =
                    read_trimmed_line(&format!("请输入开始下载的编号（范围：1-{}）: ", total));
                SelectionSpec::parse_tail(&input)
            }
            DownloadMode::Repage => unreachable!("Repage 模式不产生编号选择"),
        };

        match parsed.and_then(|spec| spec.resolve(total)) {
            Ok(indices) => return indices,
            Err(e) => println!("❌ {}", e),
        }
    }
}

/// 提示重新选择列表起始显示位置
pub fn prompt_repage_start(total: usize) -> usize {
    match read_trimmed_line(&format!("请输入从第几本书开始显示（1-{}）: ", total))
        .parse::<usize>()
    {
        Ok(start) if (1..=total).contains(&start) => start,
        _ => {
            println!("❌ 输入无效，使用默认值1");
            1
        }
    }
}

/// 是/否确认
pub fn confirm(prompt: &str) -> bool {
    let input = read_trimmed_line(prompt).to_lowercase();
    matches!(input.as_str(), "y" | "yes" | "是")
}
