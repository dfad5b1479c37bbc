//! 密码哈希
//!
//! 存储格式：`<salt>$<base64(sha256^N(salt || password))>`

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// 哈希迭代次数
const HASH_ROUNDS: u32 = 10_000;

fn digest(salt: &str, password: &str) -> String {
    let mut hash = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();

    for _ in 1..HASH_ROUNDS {
        hash = Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(hash)
            .finalize();
    }

    STANDARD.encode(hash)
}

/// 生成带随机盐的密码哈希
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

/// 校验密码是否与存储的哈希匹配
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) if !salt.is_empty() => {
            let actual = digest(salt, password);
            // 逐字节比较，长度不同直接失败
            actual.len() == expected.len()
                && actual
                    .bytes()
                    .zip(expected.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        _ => false,
    }
}
