//! Metrics collection.
//!
//! # Metrics
//! - `identity_submissions_total` (counter): verification writes by chain, action, outcome
//! - `identity_status_queries_total` (counter): status reads by chain, result
//! - `identity_rpc_failovers_total` (counter): RPC endpoint failures by chain
//! - `identity_tx_transitions_total` (counter): tracker transitions by target state
//!
//! Recording is a no-op until an embedding application installs a recorder.

pub fn record_submission(chain_id: u64, action: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "identity_submissions_total",
        "chain" => chain_id.to_string(),
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_status_query(chain_id: u64, result: &'static str) {
    ::metrics::counter!(
        "identity_status_queries_total",
        "chain" => chain_id.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_rpc_failover(chain_id: u64) {
    ::metrics::counter!("identity_rpc_failovers_total", "chain" => chain_id.to_string())
        .increment(1);
}

pub fn record_tx_transition(state: &'static str) {
    ::metrics::counter!("identity_tx_transitions_total", "state" => state).increment(1);
}
