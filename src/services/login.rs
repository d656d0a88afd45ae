//! 登录服务 - 业务能力层
//!
//! 只负责"登录"能力，不关心流程

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{error, info};

use crate::infrastructure::{Locator, PageDriver};

/// 登录按钮
const LOGIN_BUTTON: &str = r#"[data-action="login"]"#;
/// 邮箱输入框（兼容多种页面写法）
const EMAIL_INPUT: &str = "input[type='email'], input[placeholder*='mail'], input[placeholder*='电子']";
/// 密码输入框
const PASSWORD_INPUT: &str = r#"input[type="password"]"#;
/// 提交按钮
const SUBMIT_BUTTON: &str = "button[type='submit'][name='submit']";
/// 登录成功后出现的入口文字
const LOGGED_IN_MARKER: &str = "我的图书馆";

/// 登录服务
pub struct LoginService {
    timeout: Duration,
}

impl LoginService {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 登录账号
    ///
    /// 返回是否登录成功。登录失败不是致命错误，由调用方决定是否终止。
    pub async fn login(
        &self,
        driver: &PageDriver,
        locator: &Locator,
        email: &str,
        password: &str,
    ) -> Result<bool> {
        // 点击登录按钮
        let login_button = match locator.wait_clickable(LOGIN_BUTTON, self.timeout).await {
            Ok(el) => el,
            Err(e) => {
                error!("❌ 未找到登录按钮: {}", e);
                return Ok(false);
            }
        };
        login_button.click().await?;
        info!("✅ 已点击登录按钮，等待弹窗出现。");
        sleep(Duration::from_secs(2)).await;

        // 填写登录信息
        let email_input = match locator.wait_present(EMAIL_INPUT, self.timeout).await {
            Ok(el) => el,
            Err(e) => {
                error!("❌ 未找到邮箱输入框: {}", e);
                return Ok(false);
            }
        };
        email_input.click().await?;
        self.clear_input(driver, EMAIL_INPUT).await?;
        email_input.type_str(email).await?;

        let password_input = match locator.wait_present(PASSWORD_INPUT, self.timeout).await {
            Ok(el) => el,
            Err(e) => {
                error!("❌ 未找到密码输入框: {}", e);
                return Ok(false);
            }
        };
        password_input.click().await?;
        self.clear_input(driver, PASSWORD_INPUT).await?;
        password_input.type_str(password).await?;
        info!("✅ 凭据填写完毕。");

        // 提交登录
        let submit_button = match locator.wait_clickable(SUBMIT_BUTTON, self.timeout).await {
            Ok(el) => el,
            Err(e) => {
                error!("❌ 未找到提交按钮: {}", e);
                return Ok(false);
            }
        };
        submit_button.click().await?;
        info!("✅ 已经点击提交按钮，正在等待结果。");

        // 等待登录成功
        if locator
            .wait_content_contains(LOGGED_IN_MARKER, self.timeout)
            .await
        {
            info!("🎉 登录成功！");
            Ok(true)
        } else {
            error!("❌ 登录超时，未检测到登录成功标志");
            Ok(false)
        }
    }

    /// 清空输入框已有内容
    async fn clear_input(&self, driver: &PageDriver, selector: &str) -> Result<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (el) el.value = '';
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        driver.eval(js_code).await?;
        Ok(())
    }
}
