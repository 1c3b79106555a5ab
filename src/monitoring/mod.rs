/*!
 * Monitoring
 * Tracing setup and per-operation spans
 */

mod tracer;

pub(crate) use tracer::in_op_span;
pub use tracer::{generate_trace_id, init_tracing, OpSpan, ENV_TRACE_JSON};
