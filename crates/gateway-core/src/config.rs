//! Cluster topology description
//!
//! The search cluster's members are addressed through StatefulSet-style
//! DNS names: each node type has a hostname template with an `{i}`
//! ordinal placeholder and a fixed replica count. The spec is built once
//! at startup and shared read-only afterwards.

/// Ordinal placeholder in hostname templates.
const ORDINAL_PLACEHOLDER: &str = "{i}";

/// Replica counts per node type.
#[derive(Debug, Clone)]
pub struct NodeCounts {
    pub configserver: usize,
    pub admin: usize,
    pub query: usize,
    pub content: usize,
    pub marqo: usize,
}

impl Default for NodeCounts {
    fn default() -> Self {
        Self {
            configserver: 3,
            admin: 1,
            query: 1,
            content: 3,
            marqo: 1,
        }
    }
}

/// One node type of the cluster: a tag, a hostname template, and how many
/// replicas to probe.
#[derive(Debug, Clone)]
pub struct NodeTypeSpec {
    pub tag: String,
    pub template: String,
    pub replicas: usize,
}

impl NodeTypeSpec {
    pub fn new(tag: &str, template: String, replicas: usize) -> Self {
        Self {
            tag: tag.to_string(),
            template,
            replicas,
        }
    }

    /// Synthesize the hostname for a given ordinal. Templates without a
    /// placeholder are used verbatim (single-address services).
    pub fn hostname(&self, ordinal: usize) -> String {
        self.template
            .replace(ORDINAL_PLACEHOLDER, &ordinal.to_string())
    }
}

/// Immutable mapping from node-type tag to hostname template and replica
/// count, fixed at startup.
#[derive(Debug, Clone)]
pub struct ClusterTopologySpec {
    pub node_types: Vec<NodeTypeSpec>,
}

impl ClusterTopologySpec {
    /// Topology of a Vespa-backed Marqo deployment inside a Kubernetes
    /// namespace: config servers, admin, query and content nodes of the
    /// search tier, plus the engine service itself.
    pub fn vespa_defaults(namespace: &str, counts: &NodeCounts) -> Self {
        Self {
            node_types: vec![
                NodeTypeSpec::new(
                    "configserver",
                    format!("vespa-configserver-{{i}}.vespa-internal.{}", namespace),
                    counts.configserver,
                ),
                NodeTypeSpec::new(
                    "admin",
                    format!("vespa-admin-server-{{i}}.vespa-admin-server.{}", namespace),
                    counts.admin,
                ),
                NodeTypeSpec::new(
                    "query",
                    format!("vespa-query-server-{{i}}.vespa-query-server.{}", namespace),
                    counts.query,
                ),
                NodeTypeSpec::new(
                    "content",
                    format!(
                        "vespa-content-server-{{i}}.vespa-content-server.{}",
                        namespace
                    ),
                    counts.content,
                ),
                NodeTypeSpec::new(
                    "marqo",
                    format!("marqo.{}.svc.cluster.local", namespace),
                    counts.marqo,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_substitution() {
        let spec = NodeTypeSpec::new("query", "vespa-query-server-{i}.vespa-query-server.prod".to_string(), 2);
        assert_eq!(spec.hostname(0), "vespa-query-server-0.vespa-query-server.prod");
        assert_eq!(spec.hostname(1), "vespa-query-server-1.vespa-query-server.prod");
    }

    #[test]
    fn test_hostname_without_placeholder_is_verbatim() {
        let spec = NodeTypeSpec::new("marqo", "marqo.prod.svc.cluster.local".to_string(), 1);
        assert_eq!(spec.hostname(0), "marqo.prod.svc.cluster.local");
    }

    #[test]
    fn test_vespa_defaults_cover_all_node_types() {
        let spec = ClusterTopologySpec::vespa_defaults("default", &NodeCounts::default());

        let tags: Vec<&str> = spec.node_types.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["configserver", "admin", "query", "content", "marqo"]);

        let configserver = &spec.node_types[0];
        assert_eq!(configserver.replicas, 3);
        assert_eq!(
            configserver.hostname(2),
            "vespa-configserver-2.vespa-internal.default"
        );
    }

    #[test]
    fn test_counts_flow_into_spec() {
        let counts = NodeCounts {
            configserver: 5,
            admin: 2,
            query: 4,
            content: 7,
            marqo: 1,
        };
        let spec = ClusterTopologySpec::vespa_defaults("staging", &counts);
        let content = spec.node_types.iter().find(|n| n.tag == "content").unwrap();
        assert_eq!(content.replicas, 7);
        assert!(content.template.ends_with(".staging"));
    }
}
