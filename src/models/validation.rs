// 创作者标识校验
//
// 与上游用户名规则保持一致：字母数字、点、下划线，长度 2-24

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9._]{2,24}$").unwrap();
}

/// 校验创作者标识格式
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("valid.user_42"));
        assert!(is_valid_username("ab"));
        assert!(is_valid_username("JaneDoe"));
        assert!(is_valid_username("a.b_c.d"));
    }

    #[test]
    fn test_too_short_or_long() {
        assert!(!is_valid_username("a"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username(&"x".repeat(25)));
        assert!(is_valid_username(&"x".repeat(24)));
    }

    #[test]
    fn test_illegal_characters() {
        assert!(!is_valid_username("user name"));
        assert!(!is_valid_username("@janedoe"));
        assert!(!is_valid_username("jane/doe"));
        assert!(!is_valid_username("jane-doe"));
    }
}
