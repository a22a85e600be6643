use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;
#[cfg(not(test))]
use xtask::*;

#[derive(Parser)]
#[command(author, version, about = "Development tasks for fftconv")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build {
        #[arg(long)]
        release: bool,
    },
    Test,
    Clippy,
    Fmt,
    /// Profile fft-convolution once per problem size
    Sweep {
        /// Problem sizes, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ns: Vec<usize>,
        /// Profiler command; {n}, {out} and {bin} are substituted
        #[arg(long)]
        profiler: String,
        /// Directory for the JSON profiles
        #[arg(long, default_value = "scalene")]
        out_dir: PathBuf,
    },
    /// Regenerate both PNG figures
    Figures,
}

fn run(mut cmd: Command) -> Result<()> {
    let status = cmd
        .status()
        .with_context(|| format!("spawning {:?}", cmd.get_program()))?;
    if !status.success() {
        bail!("{:?} exited with {}", cmd.get_program(), status);
    }
    Ok(())
}

#[cfg(not(test))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build { release } => run(build_command(release)),
        Commands::Test => run(test_command()),
        Commands::Clippy => run(clippy_command()),
        Commands::Fmt => run(fmt_command()),
        Commands::Sweep {
            ns,
            profiler,
            out_dir,
        } => {
            let cfg = SweepConfig {
                ns,
                profiler,
                out_dir,
            };
            let cmds = sweep_commands(&cfg)?;
            run(driver_build_command())?;
            std::fs::create_dir_all(&cfg.out_dir)
                .with_context(|| format!("creating {}", cfg.out_dir.display()))?;
            for cmd in cmds {
                run(cmd)?;
            }
            Ok(())
        }
        Commands::Figures => {
            for cmd in figures_commands() {
                run(cmd)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sweep_command() {
        let cli = Cli::parse_from([
            "xtask",
            "sweep",
            "--ns",
            "100,200,300",
            "--profiler",
            "p {n}",
        ]);
        match cli.command {
            Commands::Sweep {
                ns,
                profiler,
                out_dir,
            } => {
                assert_eq!(ns, vec![100, 200, 300]);
                assert_eq!(profiler, "p {n}");
                assert_eq!(out_dir, PathBuf::from("scalene"));
            }
            _ => panic!("parsed wrong command"),
        }
    }

    #[test]
    fn sweep_requires_profiler() {
        assert!(Cli::try_parse_from(["xtask", "sweep", "--ns", "10"]).is_err());
    }

    #[test]
    fn run_reports_failure() {
        assert!(run(Command::new("false")).is_err());
    }
}
