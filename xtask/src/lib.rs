use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Directory the profiler sweep writes into by default.
pub const DEFAULT_OUT_DIR: &str = "scalene";

/// Get the workspace root directory
pub fn workspace_root() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // Go up from xtask to workspace root
    path
}

/// Release build of the experiment driver inside the workspace.
pub fn driver_binary() -> PathBuf {
    let name = if cfg!(windows) {
        "fft-convolution.exe"
    } else {
        "fft-convolution"
    };
    workspace_root().join("target").join("release").join(name)
}

pub fn build_command(release: bool) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["build", "--workspace"]);
    if release {
        cmd.arg("--release");
    }
    cmd
}

pub fn test_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["test", "--workspace"]);
    cmd
}

pub fn clippy_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["clippy", "--workspace", "--all-targets"]);
    cmd
}

pub fn fmt_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["fmt", "--all"]);
    cmd
}

pub fn driver_build_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args([
        "build",
        "--release",
        "-p",
        "fftconv-cli",
        "--bin",
        "fft-convolution",
    ]);
    cmd
}

/// Options of one profiler sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub ns: Vec<usize>,
    /// Command template with `{n}`, `{out}` and `{bin}` placeholders.
    pub profiler: String,
    pub out_dir: PathBuf,
}

/// Where the profile for problem size `n` is written.
pub fn profile_path(out_dir: &Path, n: usize) -> PathBuf {
    out_dir.join(format!("scalene_profile_n{}.json", n))
}

/// Profiler invocation for one problem size.
pub fn sweep_command(template: &str, n: usize, out: &Path, bin: &Path) -> Result<Command> {
    let expanded = template
        .replace("{n}", &n.to_string())
        .replace("{out}", &out.to_string_lossy())
        .replace("{bin}", &bin.to_string_lossy());
    let mut parts = expanded.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("profiler template is empty");
    };
    let mut cmd = Command::new(program);
    cmd.args(parts);
    Ok(cmd)
}

/// Profiler invocations for every size in `cfg`, in order.
pub fn sweep_commands(cfg: &SweepConfig) -> Result<Vec<Command>> {
    if cfg.ns.is_empty() {
        bail!("no problem sizes given");
    }
    let bin = driver_binary();
    cfg.ns
        .iter()
        .map(|&n| sweep_command(&cfg.profiler, n, &profile_path(&cfg.out_dir, n), &bin))
        .collect()
}

/// Regenerate both figures from the workspace root.
pub fn figures_commands() -> Vec<Command> {
    let root = workspace_root();
    let mut figure1 = Command::new("cargo");
    figure1
        .args(["run", "-r", "-p", "fftconv-cli", "--bin", "figure1", "--", "--save"])
        .current_dir(&root);
    let mut memory = Command::new("cargo");
    memory
        .args(["run", "-r", "-p", "fftconv-cli", "--bin", "plot-memory-usage"])
        .current_dir(&root);
    vec![figure1, memory]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_cargo_commands() {
        assert!(args(&build_command(true)).contains(&"--release".to_string()));
        assert!(!args(&build_command(false)).contains(&"--release".to_string()));
        assert!(test_command().get_args().any(|a| a == "test"));
        assert!(clippy_command().get_args().any(|a| a == "clippy"));
        assert!(fmt_command().get_args().any(|a| a == "fmt"));
        assert!(args(&driver_build_command()).contains(&"fft-convolution".to_string()));
    }

    #[test]
    fn test_sweep_substitutes_placeholders() {
        let cmd = sweep_command(
            "profiler --json --outfile {out} {bin} {n}",
            300,
            Path::new("scalene/scalene_profile_n300.json"),
            Path::new("/ws/target/release/fft-convolution"),
        )
        .unwrap();
        assert_eq!(cmd.get_program(), "profiler");
        assert_eq!(
            args(&cmd),
            [
                "--json",
                "--outfile",
                "scalene/scalene_profile_n300.json",
                "/ws/target/release/fft-convolution",
                "300"
            ]
        );
    }

    #[test]
    fn test_sweep_rejects_empty_input() {
        assert!(sweep_command("   ", 1, Path::new("o"), Path::new("b")).is_err());
        let cfg = SweepConfig {
            ns: vec![],
            profiler: "p {n}".into(),
            out_dir: DEFAULT_OUT_DIR.into(),
        };
        assert!(sweep_commands(&cfg).is_err());
    }

    #[test]
    fn test_sweep_one_command_per_size() {
        let cfg = SweepConfig {
            ns: vec![100, 200],
            profiler: "p {out}".into(),
            out_dir: PathBuf::from("prof"),
        };
        let cmds = sweep_commands(&cfg).unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(
            args(&cmds[1]),
            [profile_path(Path::new("prof"), 200).to_string_lossy().to_string()]
        );
    }

    #[test]
    fn test_figures_commands() {
        let cmds = figures_commands();
        assert!(args(&cmds[0]).contains(&"figure1".to_string()));
        assert!(args(&cmds[0]).contains(&"--save".to_string()));
        assert!(args(&cmds[1]).contains(&"plot-memory-usage".to_string()));
        assert_eq!(cmds[0].get_current_dir(), Some(workspace_root().as_path()));
    }
}
