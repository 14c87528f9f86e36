//! Security audit events emitted by the guards.

use serde::Serialize;
use serde_json::Value;

/// One rejected request, with enough context to investigate it later.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityViolation {
    pub reason: String,
    pub client_ip: String,
    pub context: Value,
    pub user_agent: String,
    pub request_id: String,
}

/// Destination for security violation events.
///
/// Implementations are fire-and-forget: they must not panic or block the
/// request path, and a failure to record must never change the response.
pub trait AuditSink: Send + Sync {
    fn log_security_violation(&self, violation: &SecurityViolation);
}

/// Writes violations to the `security_audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log_security_violation(&self, violation: &SecurityViolation) {
        tracing::warn!(
            target: "security_audit",
            reason = %violation.reason,
            client_ip = %violation.client_ip,
            user_agent = %violation.user_agent,
            request_id = %violation.request_id,
            context = %violation.context,
            "Security violation"
        );
    }
}
