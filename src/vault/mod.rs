// ==========================================
// 中润设备日报系统 - 凭据加密仓
// ==========================================
// 职责: 数据库连接密文的加密/解密
// 密钥生命周期: 启动时加载或生成，此后只读
// 算法: ChaCha20-Poly1305（认证加密，密钥不匹配必然报错）
// ==========================================

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 密文封皮前缀（版本化，便于将来换算法）
const ENVELOPE_PREFIX: &str = "zr1";

/// 密钥长度（字节）
const KEY_LEN: usize = 32;

/// Nonce 长度（字节）
const NONCE_LEN: usize = 12;

/// 凭据仓错误类型
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("密钥文件不存在: {0}")]
    KeyMissing(PathBuf),

    #[error("密钥文件内容无效: {0}")]
    KeyCorrupted(String),

    #[error("解密失败（密文损坏或密钥不匹配）")]
    DecryptionFailed,

    #[error("加密失败: {0}")]
    EncryptionFailed(String),

    #[error("密钥文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type VaultResult<T> = Result<T, VaultError>;

/// 密钥存储
///
/// 固定路径的单值密钥文件，内容为 base64 编码的 32 字节对称密钥。
/// 密钥文件绝不进入版本分发。
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 加载已持久化的密钥；文件不存在时返回 `KeyMissing`
    pub fn load(&self) -> VaultResult<[u8; KEY_LEN]> {
        if !self.path.exists() {
            return Err(VaultError::KeyMissing(self.path.clone()));
        }
        let raw = fs::read_to_string(&self.path)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim().as_bytes())
            .map_err(|e| VaultError::KeyCorrupted(e.to_string()))?;
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| VaultError::KeyCorrupted("密钥长度错误".to_string()))?;
        Ok(key)
    }

    /// 加载密钥，不存在则生成并持久化
    ///
    /// 注意: 重新生成密钥会使既有密文全部失效，调用方需自行保全旧密钥。
    pub fn load_or_generate(&self) -> VaultResult<[u8; KEY_LEN]> {
        match self.load() {
            Ok(key) => Ok(key),
            Err(VaultError::KeyMissing(_)) => {
                let key = ChaCha20Poly1305::generate_key(&mut OsRng);
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::write(&self.path, URL_SAFE_NO_PAD.encode(key))?;
                tracing::info!(path = %self.path.display(), "已生成新密钥文件");
                Ok(key.into())
            }
            Err(e) => Err(e),
        }
    }
}

/// 凭据加密仓
///
/// 密钥由外部 KeyStore 显式注入，构造后只读。
pub struct CredentialVault {
    key: [u8; KEY_LEN],
}

impl CredentialVault {
    /// 从 KeyStore 构造（加载或生成密钥）
    pub fn new(store: &KeyStore) -> VaultResult<Self> {
        Ok(Self {
            key: store.load_or_generate()?,
        })
    }

    /// 从已加载的密钥构造（解密场景: 密钥必须已存在）
    pub fn from_existing(store: &KeyStore) -> VaultResult<Self> {
        Ok(Self { key: store.load()? })
    }

    /// 加密明文，返回 `zr1:{nonce}:{ciphertext}` 形态的封皮字符串
    pub fn encrypt(&self, plaintext: &str) -> VaultResult<String> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;
        Ok(format!(
            "{}:{}:{}",
            ENVELOPE_PREFIX,
            URL_SAFE_NO_PAD.encode(nonce),
            URL_SAFE_NO_PAD.encode(ciphertext)
        ))
    }

    /// 解密封皮字符串
    ///
    /// 密文损坏、封皮格式错误或密钥不匹配统一报 `DecryptionFailed`，
    /// 绝不静默返回垃圾数据。
    pub fn decrypt(&self, envelope: &str) -> VaultResult<String> {
        let mut parts = envelope.split(':');
        let prefix = parts.next().unwrap_or_default();
        let nonce_b64 = parts.next().unwrap_or_default();
        let ciphertext_b64 = parts.next().unwrap_or_default();
        if prefix != ENVELOPE_PREFIX || parts.next().is_some() {
            return Err(VaultError::DecryptionFailed);
        }

        let nonce_raw = URL_SAFE_NO_PAD
            .decode(nonce_b64.as_bytes())
            .map_err(|_| VaultError::DecryptionFailed)?;
        if nonce_raw.len() != NONCE_LEN {
            return Err(VaultError::DecryptionFailed);
        }
        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext_b64.as_bytes())
            .map_err(|_| VaultError::DecryptionFailed)?;

        let cipher = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|_| VaultError::DecryptionFailed)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_raw), ciphertext.as_ref())
            .map_err(|_| VaultError::DecryptionFailed)?;
        String::from_utf8(plaintext).map_err(|_| VaultError::DecryptionFailed)
    }
}
