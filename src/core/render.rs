//! HTML rendering of the dashboard page.

use crate::core::ent::*;
use chrono::Local;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Groups statuses by network label. Labels iterate in ascending order; cards
/// inside a group keep configuration order.
pub fn group_by_network(statuses: &[AggregatedNodeStatus]) -> BTreeMap<&str, Vec<&AggregatedNodeStatus>> {
    let mut groups: BTreeMap<&str, Vec<&AggregatedNodeStatus>> = BTreeMap::new();
    for status in statuses {
        groups.entry(status.node.network.as_str()).or_default().push(status);
    }
    groups
}

/// "long-term-devnet" -> "Long Term Devnet"
pub fn format_network_name(network: &str) -> String {
    network
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Current local wall-clock time, as shown next to "Last updated".
pub fn local_time() -> String {
    Local::now().format("%-I:%M:%S %p").to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the full dashboard page. `last_updated` is the local time string
/// shown in the header.
pub fn render_dashboard(statuses: &[AggregatedNodeStatus], display: &DisplayConfig, last_updated: &str) -> String {
    let title = escape_html(&display.site_title);
    let refresh_seconds = display.refresh_interval_millis as f64 / 1000.0;
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <link rel="stylesheet" href="/styles.css">
</head>
<body>
  <div class="container">
    <header>
      <h1>{title}</h1>
      <p class="last-updated">Last updated: <span id="last-updated-time">{updated}</span></p>
    </header>
    <main>
{sections}    </main>
    <footer>
      <p>Auto-refreshes every {refresh_seconds} seconds</p>
    </footer>
  </div>
  <script>
    window.REFRESH_INTERVAL = {refresh_millis};
  </script>
  <script src="/script.js"></script>
</body>
</html>
"#,
        title = title,
        updated = escape_html(last_updated),
        sections = render_network_sections(statuses),
        refresh_seconds = refresh_seconds,
        refresh_millis = display.refresh_interval_millis,
    )
}

fn render_network_sections(statuses: &[AggregatedNodeStatus]) -> String {
    let mut html = String::new();
    for (network, nodes) in group_by_network(statuses) {
        render_network_section(&mut html, network, &nodes);
    }
    html
}

fn render_network_section(html: &mut String, network: &str, nodes: &[&AggregatedNodeStatus]) {
    if nodes.is_empty() {
        return;
    }
    let _ = writeln!(html, r#"      <section class="network-section" data-network="{}">"#, escape_html(network));
    let _ = writeln!(html, "        <h2>{}</h2>", escape_html(&format_network_name(network)));
    html.push_str("        <div class=\"nodes-grid\">\n");
    for node in nodes {
        render_node_card(html, node);
    }
    html.push_str("        </div>\n      </section>\n");
}

fn render_node_card(html: &mut String, status: &AggregatedNodeStatus) {
    let state = status.state();
    let _ = writeln!(
        html,
        r#"          <div class="node-card {}" data-node-url="{}" data-network="{}">"#,
        state.css_class(),
        escape_html(&status.node.url),
        escape_html(&status.node.network),
    );
    let _ = writeln!(
        html,
        r#"            <div class="node-header"><h3 class="node-name">{}</h3><span class="status-indicator"></span></div>"#,
        escape_html(&status.node.name),
    );
    html.push_str("            <div class=\"node-details\">\n");
    let _ = writeln!(html, r#"              <p class="node-url">{}</p>"#, escape_html(&status.node.url));
    let _ = writeln!(html, r#"              <p class="node-status">{}</p>"#, state.label());
    let _ = writeln!(
        html,
        r#"              <p class="node-response-time">Response: {}</p>"#,
        response_time_label(status.display_response_time()),
    );
    if state.is_online() {
        render_node_info(html, status.check.info.as_ref());
    }
    html.push_str("            </div>\n          </div>\n");
}

fn render_node_info(html: &mut String, info: Option<&NodeInfo>) {
    let version = info.and_then(|i| i.version.as_deref());
    let version_name = info.and_then(|i| i.version_name.as_deref());
    let identity = info.and_then(|i| i.identity.as_deref()).unwrap_or(UNKNOWN);
    let _ = write!(
        html,
        r#"              <div class="node-info">
                <p class="node-version">{version}</p>
                <div class="node-identity-container">
                  <p class="node-identity-label">ID:</p>
                  <p class="node-identity-value collapsed" data-full-identity="{full}">{short}</p>
                  <button class="toggle-identity" aria-label="Toggle full identity">
                    <span class="expand-icon">+</span>
                    <span class="collapse-icon" style="display:none;">&minus;</span>
                  </button>
                </div>
              </div>
"#,
        version = escape_html(&version_label(version, version_name)),
        full = escape_html(identity),
        short = escape_html(&short_identity(identity)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, network: &str, check: HealthCheckResult) -> AggregatedNodeStatus {
        AggregatedNodeStatus::new(
            NodeConfig {
                name: name.to_string(),
                url: format!("http://{}.example:8080", name),
                network: network.to_string(),
            },
            check,
        )
    }

    fn online(version: Option<&str>, version_name: Option<&str>, identity: Option<&str>) -> HealthCheckResult {
        HealthCheckResult::online(
            12,
            NodeInfo {
                version: version.map(String::from),
                version_name: version_name.map(String::from),
                identity: identity.map(String::from),
                ..NodeInfo::default()
            },
        )
    }

    fn page(statuses: &[AggregatedNodeStatus]) -> String {
        render_dashboard(statuses, &DisplayConfig::default(), "10:00:00 AM")
    }

    #[test]
    fn network_names_are_title_cased() {
        assert_eq!(format_network_name("test-net"), "Test Net");
        assert_eq!(format_network_name("long-term-devnet"), "Long Term Devnet");
        assert_eq!(format_network_name("mainnet"), "Mainnet");
        assert_eq!(format_network_name(""), "");
    }

    #[test]
    fn groups_are_sorted_and_keep_node_order() {
        let statuses = vec![
            status("b1", "beta", online(None, None, None)),
            status("a1", "alpha", online(None, None, None)),
            status("b2", "beta", HealthCheckResult::offline(None, "down")),
            status("a2", "alpha", online(None, None, None)),
        ];
        let groups = group_by_network(&statuses);
        let order: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(order, vec!["alpha", "beta"]);
        let beta: Vec<&str> = groups["beta"].iter().map(|s| s.node.name.as_str()).collect();
        assert_eq!(beta, vec!["b1", "b2"]);
    }

    #[test]
    fn sections_render_in_label_order() {
        let html = page(&[
            status("b1", "beta", online(None, None, None)),
            status("a1", "alpha", online(None, None, None)),
        ]);
        let alpha = html.find("<h2>Alpha</h2>").unwrap();
        let beta = html.find("<h2>Beta</h2>").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn empty_node_list_renders_no_sections() {
        let html = page(&[]);
        assert!(!html.contains("network-section"));
        assert!(html.contains("<title>Node Status Dashboard</title>"));
        assert!(html.contains("window.REFRESH_INTERVAL = 30000;"));
        assert!(html.contains("Auto-refreshes every 30 seconds"));
    }

    #[test]
    fn online_card_shows_version_and_short_identity() {
        let html = page(&[status(
            "n1",
            "devnet",
            online(Some("1.2.3"), None, Some("abcdef1234567890")),
        )]);
        assert!(html.contains("node-card status-online"));
        assert!(html.contains(r#"<p class="node-version">v1.2.3</p>"#));
        assert!(html.contains(r#"data-full-identity="abcdef1234567890">abcdef12</p>"#));
        assert!(html.contains("Response: 12ms"));
    }

    #[test]
    fn version_name_is_parenthesised_and_missing_fields_are_unknown() {
        let named = page(&[status("n1", "devnet", online(Some("2.0"), Some("Aurora"), None))]);
        assert!(named.contains("v2.0 (Aurora)"));
        assert!(named.contains(r#"data-full-identity="Unknown">Unknown</p>"#));

        let bare = page(&[status("n1", "devnet", online(None, None, None))]);
        assert!(bare.contains(r#"<p class="node-version">vUnknown</p>"#));
    }

    #[test]
    fn offline_card_has_no_info_block() {
        let html = page(&[status(
            "n1",
            "devnet",
            HealthCheckResult::offline(Some(5000), "request timed out"),
        )]);
        assert!(html.contains("node-card status-offline"));
        assert!(html.contains("<p class=\"node-status\">Offline</p>"));
        assert!(html.contains("Response: N/A"));
        assert!(!html.contains("node-info"));
    }

    #[test]
    fn configured_text_is_escaped() {
        let mut s = status("<b>n</b>", "devnet", online(Some("1\"2"), None, None));
        s.node.url = "http://x/?a=1&b=2".to_string();
        let html = render_dashboard(
            &[s],
            &DisplayConfig {
                refresh_interval_millis: 2_500,
                site_title: "Nodes & Co".to_string(),
            },
            "now",
        );
        assert!(html.contains("&lt;b&gt;n&lt;/b&gt;"));
        assert!(html.contains("data-node-url=\"http://x/?a=1&amp;b=2\""));
        assert!(html.contains("v1&quot;2"));
        assert!(html.contains("<title>Nodes &amp; Co</title>"));
        assert!(html.contains("Auto-refreshes every 2.5 seconds"));
    }
}
