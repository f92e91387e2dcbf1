use nanoid::nanoid;

/// サブスクリプションID用のnanoIdを生成する
///
/// # 戻り値
/// 21文字のURL-safeなnanoId
///
/// # 特性
/// - 文字セット: A-Za-z0-9_- (64文字)
/// - 長さ: 21文字
pub fn generate_subscription_id() -> String {
    nanoid!()
}

/// nanoIdが有効な形式かどうかを検証する
///
/// # 検証条件
/// - 長さが21文字
/// - URL-safe文字（A-Za-z0-9_-）のみを含む
pub fn is_valid_nanoid(id: &str) -> bool {
    id.len() == 21
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_subscription_id_length() {
        assert_eq!(generate_subscription_id().len(), 21);
    }

    #[test]
    fn test_generate_subscription_id_uniqueness() {
        assert_ne!(generate_subscription_id(), generate_subscription_id());
    }

    #[test]
    fn test_is_valid_nanoid() {
        assert!(is_valid_nanoid(&generate_subscription_id()));
        assert!(is_valid_nanoid("123456789012345678901"));

        assert!(!is_valid_nanoid("short"));
        assert!(!is_valid_nanoid("123456789012345678@01"));
        assert!(!is_valid_nanoid("has space in it 12345"));
    }
}
