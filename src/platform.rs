use std::collections::HashSet;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Filesystem types that never hold user data worth tracking.
const PSEUDO_FS: &[&str] = &[
    "proc", "sysfs", "devpts", "tmpfs", "devtmpfs", "cgroup", "cgroup2",
    "pstore", "efivarfs", "securityfs", "debugfs", "tracefs", "bpf",
    "hugetlbfs", "mqueue", "fusectl", "configfs", "binfmt_misc",
    "overlay", "nsfs", "rpc_pipefs", "autofs", "squashfs", "ramfs",
];

const MOUNTS_FILE: &str = "/proc/self/mounts";

/// Set to anything but "" or "0" to silence the recorder's change report.
pub const UNATTENDED_ENV: &str = "DUTRAIL_UNATTENDED";

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Absolute form of `path` for store lookups. Existing paths are
/// canonicalized; a path that no longer exists is anchored at `cwd` so old
/// rows stay reachable.
pub fn lookup_path(path: &Path, cwd: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) if path.is_absolute() => path.to_path_buf(),
        Err(_) => cwd.join(path),
    }
}

/// Device id of `path` itself, without following a trailing symlink.
pub fn device_id(path: &Path) -> std::io::Result<u64> {
    fs::symlink_metadata(path).map(|meta| metadata_device(&meta))
}

pub fn metadata_device(meta: &fs::Metadata) -> u64 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        meta.dev()
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        0
    }
}

/// True for scheduled runs: the env switch is set or stdout is not a tty.
pub fn is_unattended() -> bool {
    let env_set = std::env::var(UNATTENDED_ENV)
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false);
    env_set || !std::io::stdout().is_terminal()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
}

impl MountEntry {
    pub fn is_excluded(&self) -> bool {
        PSEUDO_FS.contains(&self.fs_type.as_str()) || self.device.starts_with("/dev/loop")
    }
}

#[derive(Debug, Clone, Default)]
pub struct MountTable {
    entries: Vec<MountEntry>,
}

impl MountTable {
    /// Reads the host mount table. An unreadable table is treated as empty;
    /// device-id checks still keep scans on one filesystem.
    pub fn load() -> Self {
        match fs::read_to_string(MOUNTS_FILE) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                debug!(error = %e, "mount table unavailable");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let device = fields.next()?;
                let mount_point = fields.next()?;
                let fs_type = fields.next()?;
                Some(MountEntry {
                    device: unescape(device),
                    mount_point: PathBuf::from(unescape(mount_point)),
                    fs_type: fs_type.to_string(),
                })
            })
            .collect();

        MountTable { entries }
    }

    pub fn entries(&self) -> &[MountEntry] {
        &self.entries
    }

    /// Mount points of pseudo and loop-backed filesystems.
    pub fn excluded_prefixes(&self) -> HashSet<PathBuf> {
        self.entries
            .iter()
            .filter(|m| m.is_excluded())
            .map(|m| m.mount_point.clone())
            .collect()
    }

    /// Every mount point strictly below `root`.
    pub fn nested_mounts(&self, root: &Path) -> HashSet<PathBuf> {
        self.entries
            .iter()
            .map(|m| &m.mount_point)
            .filter(|mp| mp.as_path() != root && mp.starts_with(root))
            .cloned()
            .collect()
    }
}

/// True when `path` equals or lies below any of `prefixes`.
pub fn is_under_any(path: &Path, prefixes: &HashSet<PathBuf>) -> bool {
    path.ancestors().any(|ancestor| prefixes.contains(ancestor))
}

// /proc/mounts encodes space, tab, newline and backslash as \ooo
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = bytes.get(i + 1..i + 4).filter(|d| d.iter().all(|b| (b'0'..=b'7').contains(b)));
        if let (b'\\', Some(digits)) = (bytes[i], octal) {
            let code = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            out.push(u8::try_from(code).unwrap_or(b'?'));
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
