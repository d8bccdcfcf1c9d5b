//! 短码生成
//!
//! 从操作系统 CSPRNG 取 4 字节，URL-safe base64 编码后截取前 6 位。

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use crate::errors::Result;

/// 生成短码的长度
pub const SHORT_CODE_LEN: usize = 6;

const RANDOM_BYTES: usize = 4;

pub fn generate() -> Result<String> {
    let mut bytes = [0u8; RANDOM_BYTES];
    getrandom::getrandom(&mut bytes)?;

    let mut code = URL_SAFE.encode(bytes);
    code.truncate(SHORT_CODE_LEN);
    Ok(code)
}

/// 是否是生成器产出的形状
pub fn is_short_code(value: &str) -> bool {
    value.len() == SHORT_CODE_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
