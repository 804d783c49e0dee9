//! Parsing of the evaluator reply
//!
//! The evaluator returns `{allowed, remaining, reset_epoch, capacity}`. Anything
//! that does not match that shape is a protocol error, never an implicit allow.

use super::error::LimiterError;
use redis::Value;

/// Raw evaluator reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketReply {
    pub allowed: bool,
    pub remaining: i64,
    pub reset_epoch: i64,
    pub capacity: i64,
}

/// Parse the four-element evaluator reply
pub fn parse_bucket_reply(value: &Value) -> Result<BucketReply, LimiterError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(LimiterError::malformed(format!(
                "expected an array reply, got {:?}",
                other
            )));
        }
    };

    if items.len() < 4 {
        return Err(LimiterError::malformed(format!(
            "expected 4 elements, got {}",
            items.len()
        )));
    }

    let allowed = match reply_int(&items[0], "allowed")? {
        0 => false,
        1 => true,
        other => {
            return Err(LimiterError::malformed(format!(
                "allowed flag must be 0 or 1, got {}",
                other
            )));
        }
    };

    Ok(BucketReply {
        allowed,
        remaining: reply_int(&items[1], "remaining")?,
        reset_epoch: reply_int(&items[2], "reset")?,
        capacity: reply_int(&items[3], "capacity")?,
    })
}

fn reply_int(value: &Value, field: &str) -> Result<i64, LimiterError> {
    let parsed = match value {
        Value::Int(n) => Some(*n),
        Value::BulkString(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse().ok()),
        Value::SimpleString(s) => s.parse().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        LimiterError::malformed(format!("{} is not an integer: {:?}", field, value))
    })
}
