use deadpool_redis::{Config, Pool, Runtime};
use vcon_core::{CoreError, CoreResult};

/// Builds a pool sized per §5: `pool_size >= total_workers * (1 + storage_parallelism)`.
/// Callers compute `size` from the resolved `RootConfig`, not a fixed constant.
pub fn build_pool(redis_url: &str, size: usize) -> CoreResult<Pool> {
    let cfg = Config::from_url(redis_url);
    cfg.builder()
        .map_err(|e| CoreError::fatal(format!("invalid redis url: {e}")))?
        .max_size(size.max(1))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| CoreError::fatal(format!("failed to build redis pool: {e}")))
}
