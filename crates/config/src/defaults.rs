use std::path::PathBuf;

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_upstream_url() -> String {
    "http://localhost:5000".to_string()
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_staging_dir() -> PathBuf {
    PathBuf::from("uploads")
}

/// 16 MiB, the same cap the upstream service applies
pub fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}
