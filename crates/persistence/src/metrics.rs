//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Count a failed query.
pub fn record_query_error(query_name: &'static str) {
    counter!("database_query_errors_total", "query" => query_name).increment(1);
}

/// Record database connection pool metrics.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a database operation and records it on completion.
///
/// ```ignore
/// let timer = QueryTimer::new("get_badge_group");
/// let result = sqlx::query_as::<_, BadgeGroupEntity>(...).fetch_optional(&pool).await;
/// timer.observe(result)
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }

    /// Record the elapsed duration and, on failure, an error count; then
    /// hand the result back.
    pub fn observe<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            record_query_error(self.query_name);
        }
        self.record();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("list_badge_groups");
        assert_eq!(timer.query_name, "list_badge_groups");
    }

    #[test]
    fn test_observe_passes_result_through() {
        let ok: Result<u8, &str> = QueryTimer::new("test_query").observe(Ok(7));
        assert_eq!(ok, Ok(7));

        let err: Result<u8, &str> = QueryTimer::new("test_query").observe(Err("boom"));
        assert_eq!(err, Err("boom"));
    }
}
