//! Onion service directives.
//!
//! Each service renders as a block:
//! ```text
//! ## HiddenService <name>
//! HiddenServiceDir <dir>
//! HiddenServicePort <vport> <host:port>   (one per mapping)
//! <blank>
//! ```

use crate::config::schema::ServiceModel;

pub const HEADER: &str = "#### Tor HiddenService Configuration ####";

pub fn render(model: &ServiceModel, lines: &mut Vec<String>) {
    lines.push(HEADER.to_string());

    for service in &model.services {
        lines.push(format!("## HiddenService {}", service.name));
        lines.push(format!("HiddenServiceDir {}", service.dir.display()));
        for mapping in service.ports.iter() {
            lines.push(format!(
                "HiddenServicePort {} {}",
                mapping.virtual_port, mapping.target
            ));
        }
        lines.push(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{OnionService, PortMapping, ServicePorts};

    fn mapping(vport: &str, target: &str) -> PortMapping {
        PortMapping {
            virtual_port: vport.into(),
            target: target.into(),
        }
    }

    #[test]
    fn test_single_env_service() {
        let model = ServiceModel {
            services: vec![OnionService {
                name: "web".into(),
                dir: "/tor/web".into(),
                ports: ServicePorts::Single(mapping("80", "nginx:8080")),
            }],
        };
        let mut lines = Vec::new();
        render(&model, &mut lines);
        assert_eq!(
            lines,
            [
                HEADER,
                "## HiddenService web",
                "HiddenServiceDir /tor/web",
                "HiddenServicePort 80 nginx:8080",
                "",
            ]
        );
    }

    #[test]
    fn test_services_grouped_in_order() {
        let model = ServiceModel {
            services: vec![
                OnionService {
                    name: "web".into(),
                    dir: "/tor/web".into(),
                    ports: ServicePorts::Mapped(vec![mapping("80", "web:80"), mapping("443", "web:443")]),
                },
                OnionService {
                    name: "git".into(),
                    dir: "/tor/git".into(),
                    ports: ServicePorts::Mapped(vec![mapping("22", "git:22"), mapping("80", "git:3000")]),
                },
            ],
        };
        let mut lines = Vec::new();
        render(&model, &mut lines);
        assert_eq!(
            lines,
            [
                HEADER,
                "## HiddenService web",
                "HiddenServiceDir /tor/web",
                "HiddenServicePort 80 web:80",
                "HiddenServicePort 443 web:443",
                "",
                "## HiddenService git",
                "HiddenServiceDir /tor/git",
                "HiddenServicePort 22 git:22",
                "HiddenServicePort 80 git:3000",
                "",
            ]
        );
    }
}
