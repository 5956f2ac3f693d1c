//! Control port directives.

use crate::config::schema::{ControlAuth, ControlModel};

pub const HEADER: &str = "#### Tor Controller Configuration ####";

/// `ControlPort` followed by exactly one authentication directive.
pub fn render(model: &ControlModel, lines: &mut Vec<String>) {
    lines.push(HEADER.to_string());
    lines.push(format!("ControlPort {}", model.port));
    lines.push(match &model.auth {
        ControlAuth::HashedPassword(hash) => format!("HashedControlPassword {}", hash),
        ControlAuth::Cookie(value) => format!("CookieAuthentication {}", value),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_password() {
        let mut lines = Vec::new();
        render(
            &ControlModel {
                port: "9051".into(),
                auth: ControlAuth::HashedPassword("16:ABCDEF".into()),
            },
            &mut lines,
        );
        assert_eq!(lines, [HEADER, "ControlPort 9051", "HashedControlPassword 16:ABCDEF"]);
    }

    #[test]
    fn test_cookie() {
        let mut lines = Vec::new();
        render(
            &ControlModel {
                port: "127.0.0.1:9051".into(),
                auth: ControlAuth::Cookie("1".into()),
            },
            &mut lines,
        );
        assert_eq!(lines, [HEADER, "ControlPort 127.0.0.1:9051", "CookieAuthentication 1"]);
        assert!(!lines.iter().any(|l| l.starts_with("HashedControlPassword")));
    }
}
