//! 正文净化模块
//! 文章正文允许携带 HTML，存库前剥离可执行内容

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// HTML 净化器
pub struct HtmlSanitizer {
    /// 净化规则
    rules: Vec<SanitizeRule>,
}

/// 净化规则
#[derive(Clone, Debug)]
pub struct SanitizeRule {
    /// 名称（用于调试和规则识别）
    #[allow(dead_code)]
    name: String,
    /// 正则表达式
    pattern: Regex,
    /// 替换字符串
    replacement: String,
}

impl HtmlSanitizer {
    /// 创建默认净化器
    pub fn new_default() -> Self {
        Self {
            rules: vec![
                // script 块整体移除
                SanitizeRule {
                    name: "script".to_string(),
                    pattern: Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap(),
                    replacement: String::new(),
                },
                // style 块整体移除
                SanitizeRule {
                    name: "style".to_string(),
                    pattern: Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap(),
                    replacement: String::new(),
                },
                // iframe / object / embed 块
                SanitizeRule {
                    name: "embed".to_string(),
                    pattern: Regex::new(
                        r"(?is)<(?:iframe|object|embed)\b[^>]*>.*?</(?:iframe|object|embed)>",
                    )
                    .unwrap(),
                    replacement: String::new(),
                },
                // 自闭合或未闭合的 iframe / object / embed 标签
                SanitizeRule {
                    name: "embed_void".to_string(),
                    pattern: Regex::new(r"(?is)<(?:iframe|object|embed)\b[^>]*/?>").unwrap(),
                    replacement: String::new(),
                },
                SanitizeRule {
                    name: "embed_close".to_string(),
                    pattern: Regex::new(r"(?i)</(?:iframe|object|embed)>").unwrap(),
                    replacement: String::new(),
                },
                // 内联事件处理器 onload= onclick= ...
                SanitizeRule {
                    name: "event_handler".to_string(),
                    pattern: Regex::new(r#"(?i)\son[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
                        .unwrap(),
                    replacement: String::new(),
                },
                // javascript: 协议链接
                SanitizeRule {
                    name: "javascript_url".to_string(),
                    pattern: Regex::new(r"(?i)javascript\s*:").unwrap(),
                    replacement: String::new(),
                },
            ],
        }
    }

    /// 创建自定义净化器
    pub fn new(rules: Vec<SanitizeRule>) -> Self {
        Self { rules }
    }

    /// 净化正文
    pub fn sanitize(&self, body: &str) -> String {
        let mut result = body.to_string();

        for rule in &self.rules {
            result = rule.pattern.replace_all(&result, &rule.replacement).to_string();
        }

        result
    }

    /// 检查正文是否包含可执行内容
    pub fn contains_active_content(&self, body: &str) -> bool {
        for rule in &self.rules {
            if rule.pattern.is_match(body) {
                return true;
            }
        }
        false
    }
}

/// 全局默认净化器
static DEFAULT_SANITIZER: Lazy<Arc<HtmlSanitizer>> = Lazy::new(|| {
    Arc::new(HtmlSanitizer::new_default())
});

/// 获取默认净化器
pub fn default_sanitizer() -> Arc<HtmlSanitizer> {
    Arc::clone(&DEFAULT_SANITIZER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        let sanitizer = HtmlSanitizer::new_default();
        let body = "일상적인 글입니다. <p>문단</p> and some <b>bold</b> text.";
        assert_eq!(sanitizer.sanitize(body), body);
    }

    #[test]
    fn test_script_stripped() {
        let sanitizer = HtmlSanitizer::new_default();
        let body = "before<script>alert('x')</script>after";
        assert_eq!(sanitizer.sanitize(body), "beforeafter");
    }

    #[test]
    fn test_event_handler_stripped() {
        let sanitizer = HtmlSanitizer::new_default();
        let body = r#"<img src="a.png" onerror="steal()">"#;
        let out = sanitizer.sanitize(body);
        assert!(!out.contains("onerror"));
        assert!(out.contains("a.png"));
    }

    #[test]
    fn test_javascript_url_stripped() {
        let sanitizer = HtmlSanitizer::new_default();
        let body = r#"<a href="javascript:alert(1)">x</a>"#;
        assert!(!sanitizer.sanitize(body).contains("javascript:"));
    }

    #[test]
    fn test_contains_active_content() {
        let sanitizer = HtmlSanitizer::new_default();
        assert!(sanitizer.contains_active_content("<script>x</script>"));
        assert!(!sanitizer.contains_active_content("<p>plain</p>"));
    }
}
