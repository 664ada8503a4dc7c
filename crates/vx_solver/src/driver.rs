// crates/vx_solver/src/driver.rs

//! 求解器子进程驱动
//!
//! 每个任务顺序执行一次求解。子进程 stdout 由后台读线程阻塞读取，
//! 经有界同步队列交给调用线程：写统一日志、解析进度、逐行检查
//! 取消。stderr 直接追加到同一日志文件。
//!
//! 退出码约定：0 成功；`0xC0000135`（dll-not-found）换备用求解器
//! 重试一次，仍失败则报运行时缺失；其余退出码视为求解失败。
//! 取消时杀掉子进程并在宽限时间内回收。

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use vx_foundation::{CancelToken, VxError};

use crate::error::{SolverError, SolverResult};
use crate::progress::{ProgressParser, SolverProgress};

/// dll-not-found 的 NTSTATUS 码（在 i32 退出码里表现为其负数补码）
pub const STATUS_DLL_NOT_FOUND: u32 = 0xC000_0135;

/// 行队列容量：读线程超前编排线程的上限
const LINE_QUEUE_CAPACITY: usize = 256;

/// 取消轮询间隔
const RECV_POLL: Duration = Duration::from_millis(100);

/// 宽限回收的轮询间隔
const REAP_POLL: Duration = Duration::from_millis(50);

/// 退出码分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// 正常结束
    Success,
    /// 缺少运行时依赖，可换备用求解器重试
    DllNotFound,
    /// 其他失败（被信号终止时码为 -1）
    Failed(i32),
}

/// 从退出码分类（`None` 表示被信号终止）
pub fn classify_code(code: Option<i32>) -> ExitClass {
    match code {
        Some(0) => ExitClass::Success,
        Some(c) if c as u32 == STATUS_DLL_NOT_FOUND => ExitClass::DllNotFound,
        Some(c) => ExitClass::Failed(c),
        None => ExitClass::Failed(-1),
    }
}

fn classify_exit(status: &ExitStatus) -> ExitClass {
    classify_code(status.code())
}

/// 一次求解请求
#[derive(Debug, Clone)]
pub struct SolveRequest {
    /// 准备好的输入文档
    pub input: PathBuf,
    /// 工作目录（任务目录）
    pub work_dir: PathBuf,
    /// 统一日志文件
    pub log_path: PathBuf,
    /// 总模拟时长（进度分母）
    pub total_time: f64,
}

/// 求解器驱动
#[derive(Debug, Clone)]
pub struct SolverDriver {
    primary: PathBuf,
    fallback: Option<PathBuf>,
    grace: Duration,
}

impl SolverDriver {
    /// 创建驱动
    pub fn new(primary: impl Into<PathBuf>, fallback: Option<PathBuf>, grace: Duration) -> Self {
        Self {
            primary: primary.into(),
            fallback,
            grace,
        }
    }

    /// 运行求解器直到结束
    ///
    /// `on_progress` 在每个进度标记行回调一次；通知是发后不理的，
    /// 合并去抖由上层 UI 负责。
    pub fn run(
        &self,
        request: &SolveRequest,
        on_progress: &dyn Fn(SolverProgress),
        cancel: &CancelToken,
    ) -> SolverResult<()> {
        match self.run_once(&self.primary, request, on_progress, cancel)? {
            ExitClass::Success => Ok(()),
            ExitClass::Failed(code) => Err(SolverError::Failed { code }),
            ExitClass::DllNotFound => {
                let Some(fallback) = &self.fallback else {
                    return Err(SolverError::MissingRuntime);
                };
                warn!(
                    "Solver {} missing runtime dll, retrying with {}",
                    self.primary.display(),
                    fallback.display()
                );
                match self.run_once(fallback, request, on_progress, cancel)? {
                    ExitClass::Success => Ok(()),
                    ExitClass::DllNotFound => Err(SolverError::MissingRuntime),
                    ExitClass::Failed(code) => Err(SolverError::Failed { code }),
                }
            }
        }
    }

    /// 启动一次求解尝试并消费其输出
    fn run_once(
        &self,
        exe: &Path,
        request: &SolveRequest,
        on_progress: &dyn Fn(SolverProgress),
        cancel: &CancelToken,
    ) -> SolverResult<ExitClass> {
        cancel.check()?;

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&request.log_path)?;
        writeln!(log, "--- Solver attempt: {} ---", exe.display())?;

        let mut command = Command::new(exe);
        command
            .arg("-i")
            .arg(&request.input)
            .current_dir(&request.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(log.try_clone()?));

        // 求解器自带的动态库在可执行文件旁边
        if let Some(exe_dir) = exe.parent().filter(|d| !d.as_os_str().is_empty()) {
            let mut paths = vec![exe_dir.to_path_buf()];
            if let Some(existing) = std::env::var_os("PATH") {
                paths.extend(std::env::split_paths(&existing));
            }
            if let Ok(joined) = std::env::join_paths(paths) {
                command.env("PATH", joined);
            }
        }

        info!("Spawning solver: {} -i {}", exe.display(), request.input.display());
        let mut child = command.spawn().map_err(|e| SolverError::Spawn {
            exe: exe.to_path_buf(),
            message: e.to_string(),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            VxError::internal("child stdout was not piped")
        })?;

        let (tx, rx) = sync_channel::<String>(LINE_QUEUE_CAPACITY);
        let reader = thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let outcome = self.consume_lines(&rx, &mut log, request, on_progress, cancel);

        // 先保证子进程结束再等读线程：读线程阻塞在子进程 stdout 上，
        // 进程不死它就不退出
        let status = match outcome {
            Ok(()) => {
                drop(rx);
                let _ = reader.join();
                child.wait()?
            }
            Err(e) => {
                self.terminate(&mut child)?;
                drop(rx);
                let _ = reader.join();
                writeln!(log, "--- Solver cancelled ---")?;
                return Err(e);
            }
        };

        let class = classify_exit(&status);
        writeln!(log, "--- Solver exit: {:?} ---", class)?;
        debug!("Solver {} exited: {:?}", exe.display(), class);
        Ok(class)
    }

    /// 逐行消费子进程输出直到 stdout 关闭
    fn consume_lines(
        &self,
        rx: &Receiver<String>,
        log: &mut std::fs::File,
        request: &SolveRequest,
        on_progress: &dyn Fn(SolverProgress),
        cancel: &CancelToken,
    ) -> SolverResult<()> {
        let parser = ProgressParser::new(request.total_time);
        loop {
            cancel.check()?;
            match rx.recv_timeout(RECV_POLL) {
                Ok(line) => {
                    writeln!(log, "{}", line)?;
                    if let Some(progress) = parser.parse(&line) {
                        on_progress(progress);
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    /// 终止子进程并在宽限时间内回收
    fn terminate(&self, child: &mut Child) -> SolverResult<()> {
        let _ = child.kill();
        let deadline = Instant::now() + self.grace;
        loop {
            if child.try_wait()?.is_some() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                child.wait()?;
                return Ok(());
            }
            thread::sleep(REAP_POLL);
        }
    }
}
