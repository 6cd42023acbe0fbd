//! 版本控制命令执行
//!
//! 解析器只依赖 [`CommandRunner`] 这一窄接口：执行一条只读命令，
//! 返回去除首尾空白的文本，或返回失败。测试中可替换为假实现。

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 命令执行失败的原因
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),
    #[error("command exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("command produced no output")]
    EmptyOutput,
}

/// 只读命令执行能力
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<String, CommandError>;
}

/// 基于本地 git 可执行文件的默认实现
#[derive(Debug, Clone)]
pub struct GitCommandRunner {
    program: String,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl GitCommandRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            timeout,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

}

impl CommandRunner for GitCommandRunner {
    fn run(&self, args: &[&str]) -> Result<String, CommandError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // 子进程运行期间持续读取管道，避免输出写满缓冲区后阻塞
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let started = Instant::now();
        let status = loop {
            match child.try_wait().map_err(CommandError::Wait)? {
                Some(status) => break status,
                None if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CommandError::Timeout(self.timeout));
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = collect(stdout_reader).map_err(CommandError::Wait)?;

        if !status.success() {
            let stderr = collect(stderr_reader).unwrap_or_default();
            return Err(CommandError::Exit {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&stdout).trim().to_string();
        if text.is_empty() {
            return Err(CommandError::EmptyOutput);
        }
        Ok(text)
    }
}

type PipeReader = Option<JoinHandle<io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> PipeReader {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(reader: PipeReader) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "pipe reader panicked"))),
        None => Ok(Vec::new()),
    }
}
