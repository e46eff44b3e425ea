/// 空间与键之间的分隔符
const SPACE_SEPARATOR: char = ':';

/// 生成会话在存储中的键，例如 "sessions:abc-123"
pub fn session_key(space: &str, session_id: &str) -> String {
    format!("{}{}{}", space, SPACE_SEPARATOR, session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_prefixed_by_space() {
        assert_eq!(session_key("sessions", "abc-123"), "sessions:abc-123");
    }
}
