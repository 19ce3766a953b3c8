//! Read-only host inspection.
//!
//! [`probe`] produces an immutable [`Environment`] descriptor and never
//! fails: anything it cannot determine degrades to `Unknown`/empty fields.
use std::fmt;

use crate::exec::Executor;

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Darwin,
    Unknown,
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Darwin => write!(f, "darwin"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Host package manager identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Pacman,
    Dnf,
    Yum,
    Zypper,
    Apk,
    Brew,
    Unknown,
}

impl PackageManager {
    /// Executable name used for availability probing.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Pacman => "pacman",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
            Self::Brew => "brew",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Pacman => write!(f, "pacman"),
            Self::Dnf => write!(f, "dnf"),
            Self::Yum => write!(f, "yum"),
            Self::Zypper => write!(f, "zypper"),
            Self::Apk => write!(f, "apk"),
            Self::Brew => write!(f, "brew"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Fallback probing order when the distro id is absent or unrecognized.
const PROBE_ORDER: &[PackageManager] = &[
    PackageManager::Apt,
    PackageManager::Pacman,
    PackageManager::Dnf,
    PackageManager::Yum,
    PackageManager::Zypper,
    PackageManager::Apk,
    PackageManager::Brew,
];

/// Immutable descriptor of the host environment.
///
/// Created once per run by [`probe`]; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Environment {
    pub family: OsFamily,
    pub distro: String,
    pub version: String,
    pub package_manager: PackageManager,
    /// True when running under a Windows subsystem kernel.
    pub is_wsl: bool,
}

impl Environment {
    /// Whether the detected manager is in the fully supported
    /// (primary/secondary) set. Managers found only via executable fallback
    /// still count when they are in that set.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(
            self.package_manager,
            PackageManager::Apt | PackageManager::Pacman | PackageManager::Dnf | PackageManager::Brew
        )
    }

    /// Create an environment with explicit values (for testing).
    #[must_use]
    pub fn with_manager(package_manager: PackageManager) -> Self {
        Self {
            family: OsFamily::Linux,
            distro: String::new(),
            version: String::new(),
            package_manager,
            is_wsl: false,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}{})",
            self.family,
            self.distro,
            self.version,
            self.package_manager,
            if self.is_wsl { ", wsl" } else { "" }
        )
    }
}

/// Inspect the host and produce an [`Environment`].
///
/// Pure read-only: never modifies host state and never fails.
#[must_use]
pub fn probe(executor: &dyn Executor) -> Environment {
    let family = detect_family();
    match family {
        OsFamily::Darwin => Environment {
            family,
            distro: "macos".to_string(),
            version: String::new(),
            // Homebrew is the only third-party manager on macOS; installing
            // it is the plan builder's job, not the prober's.
            package_manager: PackageManager::Brew,
            is_wsl: false,
        },
        OsFamily::Linux => {
            let os_release = std::fs::read_to_string("/etc/os-release").ok();
            let (distro, version, manager) = detect_linux(os_release.as_deref(), executor);
            let is_wsl = std::fs::read_to_string("/proc/version")
                .map(|v| is_wsl_kernel(&v))
                .unwrap_or(false);
            Environment {
                family,
                distro,
                version,
                package_manager: manager,
                is_wsl,
            }
        }
        OsFamily::Unknown => Environment {
            family,
            distro: String::new(),
            version: String::new(),
            package_manager: PackageManager::Unknown,
            is_wsl: false,
        },
    }
}

const fn detect_family() -> OsFamily {
    if cfg!(target_os = "linux") {
        OsFamily::Linux
    } else if cfg!(target_os = "macos") {
        OsFamily::Darwin
    } else {
        OsFamily::Unknown
    }
}

/// Resolve distro id/version and package manager from os-release content,
/// falling back to executable probing when the file is absent or the id is
/// unrecognized.
fn detect_linux(
    os_release: Option<&str>,
    executor: &dyn Executor,
) -> (String, String, PackageManager) {
    let Some(content) = os_release else {
        return (String::new(), String::new(), probe_binaries(executor));
    };

    let fields = parse_os_release(content);
    let distro = fields.id.clone().unwrap_or_default();
    let version = fields.version_id.clone().unwrap_or_default();

    let manager = manager_for_distro(&distro, &fields.id_like, executor)
        .unwrap_or_else(|| probe_binaries(executor));

    (distro, version, manager)
}

/// Parsed subset of `/etc/os-release`.
#[derive(Debug, Default)]
struct OsRelease {
    id: Option<String>,
    version_id: Option<String>,
    id_like: Vec<String>,
}

fn parse_os_release(content: &str) -> OsRelease {
    let mut fields = OsRelease::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key.trim() {
            "ID" => fields.id = Some(value.to_lowercase()),
            "VERSION_ID" => fields.version_id = Some(value),
            "ID_LIKE" => {
                fields.id_like = value
                    .to_lowercase()
                    .split_whitespace()
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
    }
    fields
}

/// Fixed distro-id lookup table. Adding a distro is a data change here, not
/// a new branch elsewhere.
fn manager_for_distro(
    id: &str,
    id_like: &[String],
    executor: &dyn Executor,
) -> Option<PackageManager> {
    let matches_family = |family: &str| id == family || id_like.iter().any(|l| l == family);

    match id {
        "debian" | "ubuntu" | "linuxmint" | "pop" | "kali" | "raspbian" | "elementary" => {
            Some(PackageManager::Apt)
        }
        "arch" | "manjaro" | "endeavouros" | "artix" | "garuda" => Some(PackageManager::Pacman),
        "fedora" => Some(PackageManager::Dnf),
        // RHEL-likes carry dnf on modern releases, yum on older ones.
        "rhel" | "centos" | "rocky" | "almalinux" | "ol" => Some(rhel_manager(executor)),
        "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "sles" => {
            Some(PackageManager::Zypper)
        }
        "alpine" => Some(PackageManager::Apk),
        _ if matches_family("debian") => Some(PackageManager::Apt),
        _ if matches_family("arch") => Some(PackageManager::Pacman),
        _ if matches_family("fedora") => Some(PackageManager::Dnf),
        _ if matches_family("rhel") => Some(rhel_manager(executor)),
        _ if matches_family("suse") => Some(PackageManager::Zypper),
        _ => None,
    }
}

fn rhel_manager(executor: &dyn Executor) -> PackageManager {
    if executor.which("dnf") {
        PackageManager::Dnf
    } else {
        PackageManager::Yum
    }
}

/// Probe for manager executables directly, in fixed priority order.
fn probe_binaries(executor: &dyn Executor) -> PackageManager {
    PROBE_ORDER
        .iter()
        .copied()
        .find(|m| executor.which(m.binary()))
        .unwrap_or(PackageManager::Unknown)
}

/// Detect a Windows subsystem kernel from `/proc/version` content.
fn is_wsl_kernel(version_line: &str) -> bool {
    version_line.to_lowercase().contains("microsoft")
}
