use crate::core::doctor::Doctor;
use crate::core::ent::*;
use tokio::task::JoinHandle;

/// Runs one aggregation cycle: every node is checked concurrently and the
/// results come back in configuration order, one per node.
///
/// Each check runs in its own task so a panicking check only takes its own
/// node offline.
pub async fn aggregate(doctor: &Doctor, nodes: &[NodeConfig]) -> Vec<AggregatedNodeStatus> {
    let checks: Vec<_> = nodes
        .iter()
        .map(|node| {
            let doctor = doctor.clone();
            let url = node.url.clone();
            tokio::spawn(async move { doctor.check_node(&url).await })
        })
        .collect();
    collect_checks(nodes, checks).await
}

/// Pairs each node with the outcome of its check task, by position. A task
/// that panicked or was cancelled marks its node offline.
async fn collect_checks(
    nodes: &[NodeConfig],
    checks: Vec<JoinHandle<HealthCheckResult>>,
) -> Vec<AggregatedNodeStatus> {
    let mut statuses = Vec::with_capacity(nodes.len());
    for (node, check) in nodes.iter().zip(checks) {
        let result = match check.await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(url = %node.url, "health check aborted: {}", err);
                HealthCheckResult::offline(None, err.to_string())
            }
        };
        statuses.push(AggregatedNodeStatus::new(node.clone(), result));
    }

    let online = statuses.iter().filter(|s| s.check.success).count();
    tracing::debug!("aggregation finished: {}/{} online", online, statuses.len());
    statuses
}
