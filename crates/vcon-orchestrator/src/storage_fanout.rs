use std::time::Duration;

use futures::future::join_all;
use uuid::Uuid;
use vcon_core::{CoreError, Options, StorageFailureDetail, Storage};

/// §4.4 storage fan-out. Sequential when `parallel` is false (order = declaration
/// order, §8 invariant 4); concurrent with a full barrier when true. Each call is
/// bounded by `storage_timeout`. Aggregate result is success iff all succeed.
pub async fn fan_out(
    storages: &[(String, std::sync::Arc<dyn Storage>, Options)],
    uuid: Uuid,
    parallel: bool,
    storage_timeout: Duration,
) -> Result<(), Vec<StorageFailureDetail>> {
    if parallel {
        let futures = storages.iter().map(|(name, storage, options)| {
            let name = name.clone();
            async move {
                match tokio::time::timeout(storage_timeout, storage.save(uuid, options)).await {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(StorageFailureDetail {
                        storage: name,
                        reason: e.to_string(),
                    }),
                    Err(_) => Some(StorageFailureDetail {
                        storage: name,
                        reason: "timeout".to_string(),
                    }),
                }
            }
        });
        let failures: Vec<StorageFailureDetail> =
            join_all(futures).await.into_iter().flatten().collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    } else {
        let mut failures = Vec::new();
        for (name, storage, options) in storages {
            match tokio::time::timeout(storage_timeout, storage.save(uuid, options)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(StorageFailureDetail {
                    storage: name.clone(),
                    reason: e.to_string(),
                }),
                Err(_) => failures.push(StorageFailureDetail {
                    storage: name.clone(),
                    reason: "timeout".to_string(),
                }),
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

pub fn as_storage_failure(details: Vec<StorageFailureDetail>) -> CoreError {
    CoreError::StorageFailure(details)
}
