use futures::StreamExt;
use futures::stream;
use std::future::Future;

/// 以并发上限执行一组返回 Result 的任务，结果保持输入顺序。
/// 任一任务失败立即返回该错误，尚未完成的任务随之被丢弃（取消）。
pub async fn try_parallel_with_limit<F, T, E>(futures: Vec<F>, max_parallels: usize) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let total = futures.len();
    let limit = max_parallels.max(1);

    let indexed = stream::iter(
        futures
            .into_iter()
            .enumerate()
            .map(|(index, future)| async move { (index, future.await) }),
    )
    .buffer_unordered(limit);
    let mut indexed = std::pin::pin!(indexed);

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some((index, result)) = indexed.next().await {
        slots[index] = Some(result?);
    }

    Ok(slots.into_iter().flatten().collect())
}
