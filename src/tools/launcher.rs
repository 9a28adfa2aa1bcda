//! 外部程序的定位与调用。
//!
//! [`ProcessLauncher`] 是与操作系统之间的接缝：会话只通过它查找和运行
//! BLAST 程序，测试里可以换成不启动子进程的实现。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 每个程序都可以用环境变量覆盖路径，例如 `GRAPH_BLAST_BLASTN=/opt/blast/bin/blastn`
pub const ENV_PREFIX: &str = "GRAPH_BLAST_";

/// 子进程运行结果
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub trait ProcessLauncher {
    /// 查找可执行文件，找不到返回 `None`
    fn locate_executable(&self, program: &str) -> Option<PathBuf>;

    /// 在 `cwd` 下运行程序并阻塞到结束
    fn execute(&self, program: &Path, args: &[String], cwd: &Path) -> std::io::Result<ProcessOutput>;
}

/// 覆盖 `program` 的环境变量名
pub fn override_var(program: &str) -> String {
    format!("{}{}", ENV_PREFIX, program.to_ascii_uppercase())
}

fn env_override(program: &str) -> Option<String> {
    std::env::var(override_var(program))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// 在 `search_path`（PATH 格式）中查找程序
pub fn find_in_path(program: &str, search_path: &std::ffi::OsStr) -> Option<PathBuf> {
    let names: Vec<String> = if cfg!(windows) {
        vec![format!("{}.exe", program), program.to_string()]
    } else {
        vec![program.to_string()]
    };
    std::env::split_paths(search_path)
        .flat_map(|dir| names.iter().map(move |n| dir.join(n)))
        .find(|candidate| is_executable(candidate))
}

/// 真实系统：环境变量覆盖优先，其次查找 PATH
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn locate_executable(&self, program: &str) -> Option<PathBuf> {
        if let Some(configured) = env_override(program) {
            let path = PathBuf::from(&configured);
            if path.components().count() > 1 {
                return is_executable(&path).then_some(path);
            }
            return std::env::var_os("PATH").and_then(|p| find_in_path(&configured, &p));
        }
        std::env::var_os("PATH").and_then(|p| find_in_path(program, &p))
    }

    fn execute(&self, program: &Path, args: &[String], cwd: &Path) -> std::io::Result<ProcessOutput> {
        log::debug!("running {} {}", program.display(), args.join(" "));
        let out = Command::new(program).args(args).current_dir(cwd).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("could not start '{}': {}", program.display(), e),
                )
            } else {
                e
            }
        })?;
        Ok(ProcessOutput {
            status: out.status.code(),
            success: out.status.success(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
