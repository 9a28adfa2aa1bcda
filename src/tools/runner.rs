use std::io::Write;
use std::path::{Path, PathBuf};

use super::launcher::{ProcessLauncher, SystemLauncher};
use crate::graph::NodeTable;
use crate::io::fasta;
use crate::search::error::{Result, SearchError};
use crate::search::query::QueryStore;
use crate::util::seq::SequenceKind;

pub const MAKEBLASTDB: &str = "makeblastdb";
pub const BLASTN: &str = "blastn";
pub const TBLASTN: &str = "tblastn";

/// 临时目录中的文件名
pub const DATABASE_FASTA: &str = "all_nodes.fasta";
pub const NUCL_QUERIES: &str = "nucl_queries.fasta";
pub const PROT_QUERIES: &str = "prot_queries.fasta";

/// 在调用方给出的目录下建立的专用子目录；清理只作用于它
pub const WORK_DIR: &str = "graph-blast-scratch";

/// 已定位的搜索程序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPrograms {
    pub blastn: PathBuf,
    pub tblastn: PathBuf,
}

/// 依次调用建库与搜索程序，所有中间文件都放在临时目录里。
///
/// 临时目录是 `<scratch>/graph-blast-scratch`，不会直接写入或清空调用方给出的目录。
pub struct ToolRunner {
    launcher: Box<dyn ProcessLauncher>,
    scratch: PathBuf,
}

impl ToolRunner {
    pub fn new(launcher: Box<dyn ProcessLauncher>, scratch: impl Into<PathBuf>) -> Self {
        Self { launcher, scratch: scratch.into().join(WORK_DIR) }
    }

    pub fn system(scratch: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(SystemLauncher), scratch)
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch
    }

    fn locate(&self, program: &str) -> Result<PathBuf> {
        match self.launcher.locate_executable(program) {
            Some(path) => {
                log::debug!("found {} at {}", program, path.display());
                Ok(path)
            }
            None => Err(SearchError::ToolNotFound { program: program.to_string() }),
        }
    }

    fn ensure_scratch(&self) -> Result<()> {
        std::fs::create_dir_all(&self.scratch).map_err(|e| {
            SearchError::io(format!("cannot create scratch directory '{}'", self.scratch.display()), e)
        })
    }

    fn write_fasta<'a, I>(&self, file_name: &str, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = (String, &'a [u8])>,
    {
        let path = self.scratch.join(file_name);
        let context = || format!("cannot write '{}'", path.display());
        let fh = std::fs::File::create(&path).map_err(|e| SearchError::io(context(), e))?;
        let mut out = std::io::BufWriter::new(fh);
        let mut n = 0usize;
        for (header, seq) in records {
            fasta::write_record(&mut out, &header, seq).map_err(|e| SearchError::io(context(), e))?;
            n += 1;
        }
        out.flush().map_err(|e| SearchError::io(context(), e))?;
        Ok(n)
    }

    /// 运行一个程序；非零退出码或无法启动都算失败。返回 stdout。
    fn invoke(&self, program: &Path, args: &[String]) -> Result<String> {
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        log::info!("running {} {}", name, args.join(" "));

        let out = self.launcher.execute(program, args, &self.scratch).map_err(|e| {
            SearchError::ToolExecutionFailed { program: name.clone(), status: None, message: e.to_string() }
        })?;
        log::debug!("{} exited with status {:?}", name, out.status);
        if !out.success {
            let message = if out.stderr.trim().is_empty() { out.stdout.trim() } else { out.stderr.trim() };
            return Err(SearchError::ToolExecutionFailed {
                program: name,
                status: out.status,
                message: message.to_string(),
            });
        }
        Ok(out.stdout)
    }

    /// 把图中所有节点写成 FASTA 并用 makeblastdb 建核酸库。
    pub fn build_database(&self, nodes: &NodeTable) -> Result<()> {
        let makeblastdb = self.locate(MAKEBLASTDB)?;
        if let Some(bad) = nodes.iter().find(|n| n.name.contains('_')) {
            return Err(SearchError::InvalidNodeName { name: bad.name.clone() });
        }
        self.ensure_scratch()?;
        let n = self.write_fasta(DATABASE_FASTA, nodes.iter().map(|n| (n.db_label(), n.seq.as_slice())))?;
        log::info!("wrote {} nodes to {}", n, DATABASE_FASTA);

        let args: Vec<String> = ["-in", DATABASE_FASTA, "-dbtype", "nucl"]
            .iter()
            .map(ToString::to_string)
            .collect();
        self.invoke(&makeblastdb, &args)?;
        Ok(())
    }

    /// 依次定位 blastn 和 tblastn；第一个找不到的程序直接报错。
    pub fn locate_search_programs(&self) -> Result<SearchPrograms> {
        let blastn = self.locate(BLASTN)?;
        let tblastn = self.locate(TBLASTN)?;
        Ok(SearchPrograms { blastn, tblastn })
    }

    /// 核酸查询用 blastn、蛋白查询用 tblastn 搜索，返回拼接后的 stdout。
    ///
    /// `parameters` 是用户给的自由参数串，按空白切分后追加在命令行末尾。
    pub fn run_search(&self, programs: &SearchPrograms, queries: &QueryStore, parameters: &str) -> Result<String> {
        self.ensure_scratch()?;
        let mut output = String::new();
        let passes = [
            (SequenceKind::Nucleotide, NUCL_QUERIES, &programs.blastn),
            (SequenceKind::Protein, PROT_QUERIES, &programs.tblastn),
        ];
        for (kind, file_name, program) in passes {
            let n = self.write_fasta(
                file_name,
                queries.of_kind(kind).map(|q| (q.name().to_string(), q.seq())),
            )?;
            if n == 0 {
                log::debug!("no {} queries, skipping {}", kind, program.display());
                continue;
            }
            let mut args: Vec<String> = ["-query", file_name, "-db", DATABASE_FASTA, "-outfmt", "6"]
                .iter()
                .map(ToString::to_string)
                .collect();
            args.extend(parameters.split_whitespace().map(str::to_string));

            let stdout = self.invoke(program, &args)?;
            output.push_str(&stdout);
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
        }
        Ok(output)
    }

    /// 删除临时目录下的所有普通文件（不递归）。目录不存在时什么也不做。
    pub fn empty_scratch_dir(&self) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.scratch) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(SearchError::io(format!("cannot list '{}'", self.scratch.display()), e))
            }
        };
        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| SearchError::io("cannot read scratch directory entry", e))?;
            let path = entry.path();
            if path.is_file() {
                std::fs::remove_file(&path)
                    .map_err(|e| SearchError::io(format!("cannot remove '{}'", path.display()), e))?;
                removed += 1;
            }
        }
        log::debug!("removed {} files from {}", removed, self.scratch.display());
        Ok(removed)
    }
}
