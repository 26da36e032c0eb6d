//! Redis list backend.
//!
//! Commands: `LPOP key count` (Redis >= 6.2), `RPUSH`, `LLEN`, and a
//! `MULTI RPUSH LTRIM EXEC` pipeline for flushes.

use ::redis::aio::ConnectionManager;
use ::redis::{ErrorKind, RedisError, RedisWrite, ToRedisArgs};
use async_trait::async_trait;
use tracing::info;

use crate::core::error::StoreError;
use crate::core::message::Message;
use crate::store::ListStore;

impl ToRedisArgs for Message {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(self.as_bytes());
    }
}

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        match e.kind() {
            ErrorKind::ResponseError
            | ErrorKind::TypeError
            | ErrorKind::ExecAbortError
            | ErrorKind::ExtensionError => StoreError::Rejected(e.to_string()),
            _ => StoreError::Transport(e.to_string()),
        }
    }
}

/// `LTRIM` start index keeping the newest `size` elements. Sizes past
/// `i64::MAX` keep everything.
fn trim_start(size: usize) -> i64 {
    -i64::try_from(size).unwrap_or(i64::MAX)
}

/// Shares one multiplexed, auto-reconnecting connection across all callers.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = ::redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!(target: "rchan::store", "connected to redis");
        Ok(Self { conn })
    }

    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ListStore for RedisStore {
    async fn pop_front(&self, key: &str, count: usize) -> Result<Vec<Message>, StoreError> {
        let mut conn = self.conn.clone();
        // nil reply when the list is empty or missing
        let popped: Option<Vec<Vec<u8>>> = ::redis::cmd("LPOP")
            .arg(key)
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok(popped
            .unwrap_or_default()
            .into_iter()
            .map(Message::from)
            .collect())
    }

    async fn push_back(&self, key: &str, messages: &[Message]) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: i64 = ::redis::cmd("RPUSH")
            .arg(key)
            .arg(messages)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn push_trim(
        &self,
        key: &str,
        messages: &[Message],
        size: usize,
    ) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let mut pipe = ::redis::pipe();
        pipe.atomic()
            .cmd("RPUSH")
            .arg(key)
            .arg(messages)
            .ignore()
            .cmd("LTRIM")
            .arg(key)
            .arg(trim_start(size))
            .arg(-1)
            .ignore();
        let () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, StoreError> {
        let mut conn = self.conn.clone();
        let n: usize = ::redis::cmd("LLEN").arg(key).query_async(&mut conn).await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_replies_count_as_rejections() {
        let e = RedisError::from((ErrorKind::ResponseError, "WRONGTYPE"));
        assert!(StoreError::from(e).is_rejected());

        let e = RedisError::from((ErrorKind::IoError, "connection reset"));
        assert!(!StoreError::from(e).is_rejected());
    }

    #[test]
    fn trim_keeps_the_newest_size_elements() {
        assert_eq!(trim_start(1), -1);
        assert_eq!(trim_start(10), -10);
        assert_eq!(trim_start(i64::MAX as usize), -i64::MAX);
    }

    #[test]
    fn oversized_trim_never_drops_the_head() {
        // a positive start would cut the oldest elements off every flush
        assert_eq!(trim_start(usize::MAX), -i64::MAX);
        assert_eq!(trim_start(1usize << 63), -i64::MAX);
    }

    #[test]
    fn messages_encode_as_one_argument_each() {
        let batch = vec![Message::from("a"), Message::from("bc")];
        let args = batch.as_slice().to_redis_args();
        assert_eq!(args, vec![b"a".to_vec(), b"bc".to_vec()]);
    }
}
