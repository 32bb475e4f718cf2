//! Desktop background setting.
//!
//! The cache core never touches this; only the CLI wires a setter in,
//! selected for the current platform at startup.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::errors::PlatformError;

/// Capability to change the desktop background.
pub trait DesktopBackgroundSetter {
    /// Set the desktop background to the image at `path`.
    ///
    /// `path` should be absolute: the desktop environment resolves it
    /// in its own working directory, not ours.
    fn set(&self, path: &Path) -> Result<(), PlatformError>;
}

/// Setter appropriate for the current platform.
pub fn platform_setter() -> Box<dyn DesktopBackgroundSetter> {
    #[cfg(target_os = "linux")]
    {
        Box::new(GnomeSetter)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(MacosSetter)
    }
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsSetter)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Box::new(UnsupportedSetter)
    }
}

fn run(command: &mut Command) -> Result<(), PlatformError> {
    debug!("running {:?}", command);
    let status = command.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(PlatformError::CommandFailed {
            command: command.get_program().to_string_lossy().into_owned(),
            status,
        })
    }
}

/// GNOME desktop, via `gsettings`.
#[cfg(target_os = "linux")]
pub struct GnomeSetter;

#[cfg(target_os = "linux")]
impl DesktopBackgroundSetter for GnomeSetter {
    fn set(&self, path: &Path) -> Result<(), PlatformError> {
        let uri = format!("file://{}", path.display());
        for key in ["picture-uri", "picture-uri-dark"] {
            run(Command::new("gsettings").args([
                "set",
                "org.gnome.desktop.background",
                key,
                &uri,
            ]))?;
        }
        Ok(())
    }
}

/// macOS, via an AppleScript one-liner.
#[cfg(target_os = "macos")]
pub struct MacosSetter;

#[cfg(target_os = "macos")]
impl DesktopBackgroundSetter for MacosSetter {
    fn set(&self, path: &Path) -> Result<(), PlatformError> {
        let script = format!(
            "tell application \"System Events\" to set picture of every desktop to \"{}\"",
            path.display()
        );
        run(Command::new("osascript").args(["-e", &script]))
    }
}

/// Windows, via `SystemParametersInfoW` invoked from PowerShell.
#[cfg(target_os = "windows")]
pub struct WindowsSetter;

#[cfg(target_os = "windows")]
impl DesktopBackgroundSetter for WindowsSetter {
    fn set(&self, path: &Path) -> Result<(), PlatformError> {
        // SPI_SETDESKWALLPAPER = 20, SPIF_UPDATEINIFILE | SPIF_SENDCHANGE = 3
        let script = format!(
            concat!(
                "Add-Type -TypeDefinition 'using System.Runtime.InteropServices; ",
                "public class Wallpaper {{ [DllImport(\"user32.dll\", CharSet = CharSet.Unicode)] ",
                "public static extern int SystemParametersInfoW(int uAction, int uParam, string lpvParam, int fuWinIni); }}'; ",
                "[Wallpaper]::SystemParametersInfoW(20, 0, '{}', 3)"
            ),
            path.display()
        );
        run(Command::new("powershell").args(["-NoProfile", "-Command", &script]))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub struct UnsupportedSetter;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
impl DesktopBackgroundSetter for UnsupportedSetter {
    fn set(&self, _path: &Path) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }
}
