//! SOCKS proxy directives.

use crate::config::schema::ProxyModel;

pub const HEADER: &str = "#### Tor Proxy Configuration ####";

/// `SocksPort`, then the accept policy, then the reject policy if one is set.
pub fn render(model: &ProxyModel, lines: &mut Vec<String>) {
    lines.push(HEADER.to_string());

    let socks_port = match &model.address {
        Some(address) => format!("SocksPort {}:{}", address, model.port),
        None => format!("SocksPort {}", model.port),
    };
    lines.push(socks_port);

    lines.push(format!("SocksPolicy accept {}", model.accept.join(",")));
    if let Some(reject) = &model.reject {
        lines.push(format!("SocksPolicy reject {}", reject.join(",")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(address: Option<&str>, reject: Option<Vec<&str>>) -> ProxyModel {
        ProxyModel {
            port: "9050".into(),
            address: address.map(str::to_string),
            accept: vec!["192.168.0.0/16".into(), "10.0.0.0/8".into()],
            reject: reject.map(|r| r.into_iter().map(str::to_string).collect()),
        }
    }

    fn rendered(model: &ProxyModel) -> Vec<String> {
        let mut lines = Vec::new();
        render(model, &mut lines);
        lines
    }

    #[test]
    fn test_minimal_proxy() {
        assert_eq!(
            rendered(&model(None, None)),
            [
                HEADER,
                "SocksPort 9050",
                "SocksPolicy accept 192.168.0.0/16,10.0.0.0/8",
            ]
        );
    }

    #[test]
    fn test_address_and_reject() {
        assert_eq!(
            rendered(&model(Some("0.0.0.0"), Some(vec!["*"]))),
            [
                HEADER,
                "SocksPort 0.0.0.0:9050",
                "SocksPolicy accept 192.168.0.0/16,10.0.0.0/8",
                "SocksPolicy reject *",
            ]
        );
    }

    #[test]
    fn test_reject_only_when_set() {
        let without = rendered(&model(None, None));
        assert!(!without.iter().any(|l| l.starts_with("SocksPolicy reject")));

        let with = rendered(&model(None, Some(vec!["0.0.0.0/0"])));
        assert_eq!(with.iter().filter(|l| l.starts_with("SocksPolicy reject")).count(), 1);
    }
}
