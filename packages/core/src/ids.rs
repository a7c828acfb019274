// ABOUTME: Prefixed id generation for all persisted entities
// ABOUTME: Ids look like "req-V1StGXR8_Z5jdHi6B-myT"

/// Entity prefixes used across storage layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    User,
    App,
    Request,
    Comment,
    Developer,
    History,
    Ratio,
    RatioMessage,
    Confirmation,
    Transaction,
    Notification,
}

impl IdPrefix {
    fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::User => "usr",
            IdPrefix::App => "app",
            IdPrefix::Request => "req",
            IdPrefix::Comment => "cmt",
            IdPrefix::Developer => "dev",
            IdPrefix::History => "hist",
            IdPrefix::Ratio => "ratio",
            IdPrefix::RatioMessage => "rmsg",
            IdPrefix::Confirmation => "conf",
            IdPrefix::Transaction => "txn",
            IdPrefix::Notification => "notif",
        }
    }
}

/// Generate a unique, URL-safe id with a type prefix.
pub fn generate_id(prefix: IdPrefix) -> String {
    format!("{}-{}", prefix.as_str(), nanoid::nanoid!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_carry_prefix() {
        assert!(generate_id(IdPrefix::Request).starts_with("req-"));
        assert!(generate_id(IdPrefix::Transaction).starts_with("txn-"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = generate_id(IdPrefix::Comment);
        let b = generate_id(IdPrefix::Comment);
        assert_ne!(a, b);
    }
}
