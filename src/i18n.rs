// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和阿拉伯文
// 只提供按指定语言翻译: 双语通知不能依赖全局 locale
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 按指定语言翻译（不修改全局语言）
///
/// 通知需要同时生成两种语言的文本，不能依赖全局 locale。
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_placeholders(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_placeholders(mut text: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        text = text.replace(&placeholder, v);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_t_in_ignores_global_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        rust_i18n::set_locale("ar");

        let ar = t_in("ar", "notification.review_required.title", &[]);
        let en = t_in("en", "notification.review_required.title", &[]);
        assert_eq!(en, "Assignments need review");
        assert_ne!(ar, en);
        assert_eq!(&*rust_i18n::locale(), "ar");

        rust_i18n::set_locale("en");
    }

    #[test]
    fn test_notification_keys_exist_in_both_locales() {
        let keys = [
            "notification.review_required.title",
            "notification.review_required.message",
            "availability.status.available",
            "availability.status.on_leave",
            "availability.status.unavailable",
        ];
        for locale in ["en", "ar"] {
            for key in keys {
                let text = t_in(locale, key, &[]);
                assert!(!text.is_empty());
                assert!(!text.contains(key), "{} 缺少 {}", locale, key);
            }
        }
    }

    #[test]
    fn test_t_in_fills_placeholders() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        let msg = t_in(
            "en",
            "notification.review_required.message",
            &[("count", "3"), ("name", "Alice"), ("status", "on leave")],
        );
        assert!(msg.starts_with("3 assignment(s) from Alice"));
        assert!(msg.contains("on leave"));
    }
}
