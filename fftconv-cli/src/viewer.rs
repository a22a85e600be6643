//! Opening rendered images in the desktop's default viewer.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command;

/// Command that hands `path` to the platform's default opener.
pub fn open_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args([OsStr::new("/C"), OsStr::new("start"), OsStr::new("")])
            .arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Launch the viewer without waiting for it to close.
pub fn show(path: &Path) -> io::Result<()> {
    log::info!("opening {}", path.display());
    open_command(path).spawn().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_targets_the_image() {
        let cmd = open_command(Path::new("/tmp/figure.png"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args.last(), Some(&OsStr::new("/tmp/figure.png")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_uses_xdg_open() {
        let cmd = open_command(Path::new("x.png"));
        assert_eq!(cmd.get_program(), "xdg-open");
    }
}
